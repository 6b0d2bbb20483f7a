//! Remove cart lines left behind by an interrupted checkout.

use cloudmart_api::services::OrderService;
use cloudmart_core::UserId;
use tracing::info;

use super::{CommandError, connect};

/// Sweep one user's cart.
///
/// `user` defaults to the configured demo user.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a store call fails.
pub async fn run(user: Option<String>) -> Result<(), CommandError> {
    let (config, store) = connect().await?;
    let user = user.map_or(config.demo_user, UserId::new);

    let removed = OrderService::new(&store)
        .sweep_orphaned_cart_items(&user)
        .await?;

    info!(user_id = %user, removed, "Sweep complete");
    Ok(())
}
