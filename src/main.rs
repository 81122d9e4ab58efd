//! People API CLI - serve the HTTP endpoints and manage the local database

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use people_api::config::{self, ApiConfig};
use people_api::storage::SqliteStore;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "people-api")]
#[command(version)]
#[command(about = "People, interests and links over HTTP")]
#[command(long_about = r#"
Serves CRUD endpoints for people, their interests and the links filed under
each interest, backed by a local SQLite database.

Example usage:
  people-api init --database ./data/people.db
  people-api serve --port 8080
  people-api stats
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<String>,

        /// Address to bind
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Write a config file
    Init {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// Show row counts of the database
    Stats {
        /// Path to the database file
        #[arg(short, long)]
        database: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let file_config = config::load_config(cli.config.as_deref())?.unwrap_or_default();

    match cli.command {
        Commands::Serve { database, host, port } => {
            let settings = file_config.merge(ApiConfig { database, host, port });
            let db_path = settings.database_path();
            let addr = settings.bind_address()?;

            config::ensure_db_dir(&db_path)?;
            let store = SqliteStore::open(&db_path)?;
            tracing::info!("Using database {:?}", db_path);

            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(people_api::server::start_server(addr, store))?;
        }

        Commands::Init { database, port, force } => {
            let path = cli.config.unwrap_or_else(config::default_config_path);
            let settings = ApiConfig {
                database: Some(database.unwrap_or_else(|| {
                    config::default_database_path().to_string_lossy().to_string()
                })),
                host: Some(config::DEFAULT_HOST.to_string()),
                port: Some(port.unwrap_or(config::DEFAULT_PORT)),
            };

            config::write_config(&path, &settings, force)?;
            println!("✅ Wrote config to {}", path.display());
        }

        Commands::Stats { database } => {
            let settings = file_config.merge(ApiConfig { database, ..Default::default() });
            let db_path = settings.database_path();
            let store = SqliteStore::open(&db_path)?;
            let stats = store.stats()?;

            println!("📊 People API Statistics ({:?})", db_path);
            println!("------------------------------------");
            println!("{}", stats);
        }
    }

    Ok(())
}
