//! Database migration command.
//!
//! Applies the server crate's migrations. Never run automatically on
//! server startup; deploys run this first.

use super::{CommandError, connect};

pub async fn run() -> Result<(), CommandError> {
    let store = connect().await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations")
        .run(store.pool())
        .await?;

    tracing::info!("Migrations complete");
    Ok(())
}
