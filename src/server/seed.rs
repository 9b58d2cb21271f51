// Bootstrap admin account

use crate::{
    auth::{hash_password, AuthError},
    log::Logger,
    log_info,
    models::{Role, User},
    store::Store,
};

use super::AdminSeedConfiguration;

/// Creates the bootstrap admin account, unless an account
/// with the same email already exists
///
/// Returns true if the account was created
pub async fn seed_admin(
    store: &dyn Store,
    logger: &Logger,
    config: &AdminSeedConfiguration,
) -> Result<bool, AuthError> {
    if store.find_user_by_email(&config.email).await?.is_some() {
        log_info!(
            logger,
            format!("Admin account {} already exists", config.email)
        );
        return Ok(false);
    }

    let mut admin = User::new(
        &config.username,
        &config.email,
        hash_password(&config.password)?,
        Role::Admin,
    );
    admin.email_verified = true;

    store.insert_user(&admin).await?;

    log_info!(logger, format!("Created admin account {}", config.email));

    Ok(true)
}

// Tests
