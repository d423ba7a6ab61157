use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use calculadora::calculator::Calculator;
use calculadora::cli::{Cli, Command, run_history_command};
use calculadora::config::{Config, LogFormat, LoggingConfig};
use calculadora::db::HistoryStore;
use calculadora::history::{self, PgStore};
use calculadora::server::{AppState, CalculatorServer, shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let mut config = Config::from_env().context("Invalid configuration")?;

    init_tracing(&config.logging);

    match cli.command.unwrap_or(Command::Serve {
        host: None,
        port: None,
    }) {
        Command::Serve { host, port } => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            serve(config).await
        }
        Command::Migrate => {
            let database = config
                .database
                .as_ref()
                .context("DATABASE_URL must be set to run migrations")?;
            let store = PgStore::new(database).await?;
            store.run_migrations().await?;
            store.close().await;
            println!("Migrations applied.");
            Ok(())
        }
        Command::History(args) => {
            let store = history::open_store(&config).await?;
            let calculator = Calculator::new(store.clone(), config.history.order);
            let result = run_history_command(args, &calculator).await;
            store.close().await;
            result
        }
    }
}

async fn serve(config: Config) -> anyhow::Result<()> {
    tracing::info!("Initializing history store ({:?})...", config.history.backend);
    let store = history::open_store(&config)
        .await
        .context("Failed to open history store")?;

    let calculator = Arc::new(Calculator::new(store.clone(), config.history.order));

    let mut server = CalculatorServer::new(config.server.addr()?);
    server
        .start(AppState { calculator })
        .await
        .context("Failed to start HTTP server")?;

    shutdown_signal().await;

    server.shutdown().await;
    store.close().await;
    tracing::info!("Shutdown complete");

    Ok(())
}

fn init_tracing(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.init(),
    }
}
