mod cli;
mod config;
mod directory;
mod guard;
mod routes;
mod services;
mod session;
mod state;
mod token;
mod types;
mod validation;

use std::net::SocketAddr;

use clap::Parser;

use crate::cli::{Cli, CliError, Command, SessionArgs, SessionCommand};
use crate::config::AppConfig;
use crate::services::auth::AuthService;
use crate::session::{FileStorage, MemoryStorage, SessionStorage, SessionStore};

#[tokio::main]
async fn main() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Command::Serve => serve(config).await,
        Command::Session(args) => run_session(config, args).await,
    }
}

async fn serve(config: AppConfig) -> Result<(), CliError> {
    let state = state::AppState::from_config(&config);
    let app = routes::app(state, config.assets_dir.as_deref());

    let addr = SocketAddr::new(config.bind_addr, config.port);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!(%addr, "fincairbnb listening");
    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_session(config: AppConfig, args: SessionArgs) -> Result<(), CliError> {
    let auth = AuthService::seeded(config.latency);
    if args.ephemeral {
        return drive(SessionStore::new(MemoryStorage::new(), auth), args.command).await;
    }

    let storage = FileStorage::new(args.storage.unwrap_or(config.storage_path));
    tracing::debug!(path = %storage.path().display(), "session storage");
    drive(SessionStore::new(storage, auth), args.command).await
}

async fn drive<S: SessionStorage>(mut store: SessionStore<S>, command: SessionCommand) -> Result<(), CliError> {
    cli::open(&mut store);
    let output = cli::execute(&mut store, command).await?;
    println!("{output}");
    Ok(())
}
