//! Admin account management.

use rand::Rng;
use rand::distr::Alphanumeric;

use stitchpress_core::UserRole;
use stitchpress_server::services::AuthService;
use stitchpress_server::store::Store;

use super::{CommandError, connect};

/// Create an admin account, or promote an existing account to admin.
///
/// When no password is given one is generated and logged once.
pub async fn create(
    email: &str,
    name: &str,
    password: Option<&str>,
) -> Result<(), CommandError> {
    let store = connect().await?;

    if let Some(existing) = store.user_by_email(email).await? {
        let user = store.set_user_role(existing.id, UserRole::Admin).await?;
        tracing::info!(user_id = %user.id, %email, "Existing account promoted to admin");
        return Ok(());
    }

    let generated;
    let password = match password {
        Some(p) => p,
        None => {
            generated = rand::rng()
                .sample_iter(&Alphanumeric)
                .take(20)
                .map(char::from)
                .collect::<String>();
            tracing::info!(password = %generated, "Generated admin password (store it now)");
            &generated
        }
    };

    let user = AuthService::signup(&store, email, password, name).await?;
    let user = store.set_user_role(user.id, UserRole::Admin).await?;
    tracing::info!(user_id = %user.id, %email, "Admin account created");
    Ok(())
}
