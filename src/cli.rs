//! Command-line entry points: run the server, apply migrations, seed an admin.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::database::{ContentStore, DatabaseManager, MemoryStore, PgStore};
use crate::routes::app;
use crate::services::ServiceError;
use crate::state::AppState;
use crate::types::Role;

#[derive(Parser)]
#[command(name = "bionic-cms")]
#[command(about = "Multilingual content API for a prosthetics catalogue")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Override the listen port")]
        port: Option<u16>,

        #[arg(long, help = "Keep all data in process memory instead of PostgreSQL")]
        memory: bool,

        #[arg(long, help = "Apply pending migrations before serving")]
        migrate: bool,
    },

    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Create an admin account")]
    Seed {
        #[arg(long)]
        email: String,

        #[arg(long)]
        password: String,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;

    match cli.command.unwrap_or(Commands::Serve {
        port: None,
        memory: false,
        migrate: false,
    }) {
        Commands::Serve { port, memory, migrate } => serve(config, port, memory, migrate).await,
        Commands::Migrate => {
            let pool = DatabaseManager::connect_lazy(&config.database)?;
            DatabaseManager::migrate(&pool).await?;
            info!("Migrations applied");
            Ok(())
        }
        Commands::Seed { email, password } => seed(config, email, password).await,
    }
}

async fn serve(mut config: AppConfig, port: Option<u16>, memory: bool, migrate: bool) -> anyhow::Result<()> {
    if let Some(port) = port {
        config.server.port = port;
    }

    let store: Arc<dyn ContentStore> = if memory {
        warn!("Using the in-memory store; data is lost on exit");
        Arc::new(MemoryStore::new())
    } else {
        let pool = DatabaseManager::connect_lazy(&config.database)?;
        info!("Database: {}", DatabaseManager::redacted(&config.database.url));
        if migrate {
            DatabaseManager::migrate(&pool).await?;
        }
        // Startup continues without a database; list reads degrade until it is reachable
        if let Err(e) = DatabaseManager::health_check(&pool).await {
            warn!("Database not reachable at startup: {}", e);
        }
        Arc::new(PgStore::new(pool))
    };

    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .with_context(|| format!("invalid bind address {}", config.bind_address()))?;
    info!("Starting bionic-cms in {:?} mode on http://{}", config.environment, addr);

    let router = app(AppState::new(config, store));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn seed(config: AppConfig, email: String, password: String) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect_lazy(&config.database)?;
    let state = AppState::new(config, Arc::new(PgStore::new(pool)));

    match state.auth.create_user(email, password, None, None, Role::Admin).await {
        Ok(user) => {
            info!("Created admin {} ({})", user.email, user.id);
            Ok(())
        }
        Err(ServiceError::Conflict(message)) => {
            warn!("{}", message);
            Ok(())
        }
        Err(e) => Err(e).context("failed to create admin"),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
