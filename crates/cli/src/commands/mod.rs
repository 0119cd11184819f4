//! CLI subcommand implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use secrecy::SecretString;
use thiserror::Error;

use stitchpress_server::store::{self, PgStore};

/// Errors shared by the CLI commands.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Store error: {0}")]
    Store(#[from] stitchpress_server::store::StoreError),

    #[error("Auth error: {0}")]
    Auth(#[from] stitchpress_server::services::AuthError),
}

/// Connect to the database named by `DATABASE_URL`.
pub async fn connect() -> Result<PgStore, CommandError> {
    dotenvy::dotenv().ok();
    let url = std::env::var("DATABASE_URL")
        .map_err(|_| CommandError::MissingEnvVar("DATABASE_URL"))?;
    let pool = store::create_pool(&SecretString::from(url)).await?;
    Ok(PgStore::new(pool))
}
