pub mod commands;
pub mod utils;

use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::config::AppConfig;
use crate::database::stores::UserDb;
use crate::database::DatabaseManager;
use crate::services::UserService;

#[derive(Parser)]
#[command(name = "gateone-admin")]
#[command(about = "GateOne admin - database and account maintenance")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Create the default admin and user accounts if missing")]
    Seed,

    #[command(about = "Create a user account")]
    Useradd(commands::useradd::UseraddArgs),

    #[command(about = "Sign a bearer token for an existing user")]
    Gentoken(commands::gentoken::GentokenArgs),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let cfg = crate::config::config();

    match cli.command {
        Commands::Migrate => commands::migrate::handle(cfg, output_format).await,
        Commands::Seed => commands::seed::handle(cfg, output_format).await,
        Commands::Useradd(args) => commands::useradd::handle(cfg, args, output_format).await,
        Commands::Gentoken(args) => commands::gentoken::handle(cfg, args, output_format).await,
    }
}

pub(crate) async fn connect(cfg: &AppConfig) -> anyhow::Result<PgPool> {
    let pool = DatabaseManager::connect(&cfg.database)
        .await
        .context("connecting to database")?;
    Ok(pool)
}

/// User service straight over Postgres; the admin tool skips the cache.
pub(crate) fn user_service(cfg: &AppConfig, pool: PgPool) -> UserService {
    UserService::new(Arc::new(UserDb::new(pool)), cfg.security.bcrypt_cost)
}
