//! Database migration command.
//!
//! Applies the migrations in `crates/api/migrations/` to the database named
//! by `CLOUDMART_DATABASE_URL`. The API never migrates on startup.

use super::{CommandError, connect};

/// Run pending migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails or
/// a migration cannot be applied.
pub async fn run() -> Result<(), CommandError> {
    let (_, store) = connect().await?;

    tracing::info!("Running migrations...");
    store.migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
