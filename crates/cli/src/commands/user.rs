//! User document management.

use cartline_core::UserId;
use cartline_storefront::db::{DocumentStore, PgDocumentStore};
use cartline_storefront::models::UserDocument;

use super::{CliError, connect};

/// Create a user document with an empty cart, no addresses and no orders.
///
/// # Errors
///
/// Returns an error if the connection fails or a user with `id` exists.
pub async fn create(id: Option<UserId>) -> Result<(), CliError> {
    let store = PgDocumentStore::new(connect().await?);
    let user = UserDocument::new(id.unwrap_or_else(UserId::generate));

    store.insert_user(&user).await?;

    tracing::info!(user_id = %user.id, "User created");
    Ok(())
}
