//! pronet operator tool: migrations and demo data.

mod seed;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use pronet_common::{Config, SystemClock};
use pronet_core::CoreServices;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "pronet-admin", version, about = "Database administration for pronet")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Read configuration from this file instead of `config/`.
    #[arg(long, env = "PRONET_CONFIG")]
    config: Option<PathBuf>,

    /// Emit logs as JSON.
    #[arg(long, env = "PRONET_LOG_JSON")]
    json_logs: bool,
}

#[derive(Debug, Clone, Copy, Subcommand)]
enum Command {
    /// Apply pending migrations (the default).
    Migrate,
    /// Apply migrations, then insert demo users, posts and connections.
    Seed,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pronet=info".into());

    if json {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json())
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(filter)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.json_logs);

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    let db = pronet_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    pronet_db::migrate(&db).await?;
    info!("Migrations completed");

    if let Some(Command::Seed) = cli.command {
        let db = Arc::new(db);
        let core = CoreServices::new(Arc::clone(&db), &config, SystemClock::shared());
        let report = seed::run(db.as_ref(), &core).await?;
        info!(
            users = report.users,
            posts = report.posts,
            comments = report.comments,
            likes = report.likes,
            follows = report.follows,
            "Seeded demo data"
        );
    }

    Ok(())
}
