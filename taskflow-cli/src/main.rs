mod api;
mod cli;
mod commands;
mod config;
mod session_store;
mod state;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use config::TaskflowConfig;
use state::SessionState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = TaskflowConfig::load()?;

    let token = session_store::load_token()?;
    let client = api::ApiClient::new(&config.api_url, token)?;

    // View-state mirrors live exactly as long as this invocation's session.
    let mut state = SessionState::new();

    match cli.command {
        Commands::Register { email, name } => commands::register(&client, email, name).await,
        Commands::Login { email } => commands::login(&client, email).await,
        Commands::Logout => commands::logout(&mut state),
        Commands::Whoami => commands::whoami(&client).await,
        Commands::Health => commands::health(&client).await,
        Commands::Project(command) => commands::project(&client, &mut state, command).await,
        Commands::Task(command) => commands::task(&client, &mut state, command).await,
    }
}
