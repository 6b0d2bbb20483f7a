//! Seed the demo product catalog.

use cloudmart_api::seed::{SeedMode, seed_products};
use tracing::info;

use super::{CommandError, connect};

/// Insert the demo products.
///
/// With `missing_only`, products are added to a non-empty catalog as long as
/// their id is free; otherwise a populated catalog is left untouched.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a write fails.
pub async fn run(missing_only: bool) -> Result<(), CommandError> {
    let (_, store) = connect().await?;

    let mode = if missing_only {
        SeedMode::MissingOnly
    } else {
        SeedMode::IfEmpty
    };
    let report = seed_products(&store, mode).await?;

    info!("Seeding complete!");
    info!("  Products inserted: {}", report.inserted);
    info!("  Products skipped (already exist): {}", report.skipped);
    Ok(())
}
