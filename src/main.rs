#![allow(clippy::result_large_err)]

use antiques_admin::{
    config::{self, database},
    errors::{Error, Result},
    handlers::{self, HandlerContext, Request, Resource},
};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use sea_orm::DatabaseConnection;
use std::io::Read;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Local runner for the admin panel functions.
#[derive(Debug, Parser)]
#[command(name = "antiques-admin", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run one handler against an event envelope and print the response envelope
    Invoke {
        /// Handler to run
        #[arg(value_enum)]
        resource: Resource,
        /// Event JSON file; read from stdin when omitted
        #[arg(long)]
        event: Option<PathBuf>,
    },
    /// Create the products, categories and news tables
    InitDb,
}

const fn needs_database(resource: Resource) -> bool {
    !matches!(resource, Resource::ImageCompress | Resource::ImageUpload)
}

fn read_event(path: Option<&PathBuf>) -> Result<Request> {
    let raw = match path {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    if raw.trim().is_empty() {
        return Ok(Request::default());
    }
    serde_json::from_str(&raw).map_err(Error::from)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // 2. Load .env file, non-fatal since the platform may set variables directly
    dotenv().ok();

    let cli = Cli::parse();

    // 3. Load the application configuration once for the whole process
    let app_config = config::load_app_configuration()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;
    info!("Successfully processed application configuration.");

    match cli.command {
        Command::InitDb => {
            let db = database::create_connection(&app_config).await?;
            database::create_tables(&db)
                .await
                .inspect(|_| info!("Tables created successfully."))
                .inspect_err(|e| error!("Failed to create tables: {}", e))?;
        }
        Command::Invoke { resource, event } => {
            let request = read_event(event.as_ref())?;
            let db = if needs_database(resource) {
                database::create_connection(&app_config)
                    .await
                    .inspect_err(|e| error!("Failed to connect to database: {}", e))?
            } else {
                DatabaseConnection::Disconnected
            };

            let ctx = HandlerContext::new(db, app_config)?;
            let response = handlers::handle(&ctx, resource, &request).await;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
    }

    Ok(())
}
