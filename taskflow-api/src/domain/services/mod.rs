mod identity;
mod projects;
mod tasks;

pub use identity::*;
pub use projects::*;
pub use tasks::*;
