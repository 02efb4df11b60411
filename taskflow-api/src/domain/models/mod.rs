mod ids;
mod project;
mod task;
mod user;

pub use ids::*;
pub use project::*;
pub use task::*;
pub use user::*;
