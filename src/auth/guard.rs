// Session guard
//
// Each account holds at most one live session marker. Login replaces it,
// logout clears it, and a credential is only honored while the marker
// stamped into it is still the one stored on the account.

use chrono::{DateTime, Utc};

use crate::{
    log::Logger,
    log_info,
    models::User,
    store::Store,
    utils::string_compare_constant_time,
};

use super::{decode_credential, issue_credential, verify_password, AuthConfiguration, AuthError};

/// Number of random bytes of a session marker
pub const SESSION_MARKER_BYTES: usize = 32;

/// Result of a successful login
pub struct LoginOutcome {
    /// Signed credential for the new session
    pub access_token: String,

    /// The logged in user
    pub user: User,
}

/// Generates a new random session marker, hex encoded
pub fn generate_session_marker() -> String {
    hex::encode(rand::random::<[u8; SESSION_MARKER_BYTES]>())
}

/// Logs a user in, replacing any previous session
///
/// # Arguments
///
/// * `store` - The store
/// * `logger` - The logger
/// * `config` - Authentication configuration
/// * `email` - Account email
/// * `password` - Plain text password
/// * `now` - Current time
pub async fn login(
    store: &dyn Store,
    logger: &Logger,
    config: &AuthConfiguration,
    email: &str,
    password: &str,
    now: DateTime<Utc>,
) -> Result<LoginOutcome, AuthError> {
    let candidate = store
        .find_user_by_email(email)
        .await?
        .ok_or(AuthError::InvalidLogin)?;

    if !verify_password(password, &candidate.password_hash) {
        return Err(AuthError::InvalidLogin);
    }

    // Writes only the marker and login time, the account may have
    // changed while the password was being checked
    let marker = generate_session_marker();

    let user = store
        .record_login(&candidate.id, &marker, now)
        .await?
        .ok_or_else(|| AuthError::UnknownUser(candidate.id.clone()))?;

    let access_token = issue_credential(config, &user.id, Some(&marker), now)?;

    log_info!(logger, format!("User logged in: {}", user.username));

    Ok(LoginOutcome { access_token, user })
}

/// Authenticates a presented credential
///
/// Returns the user the credential belongs to
pub async fn authenticate(
    store: &dyn Store,
    config: &AuthConfiguration,
    token: &str,
) -> Result<User, AuthError> {
    let claims = decode_credential(config, token)?;

    let user = store
        .find_user(&claims.sub)
        .await?
        .ok_or_else(|| AuthError::UnknownUser(claims.sub.clone()))?;

    match &claims.session {
        Some(marker) => match &user.active_session {
            Some(active) if string_compare_constant_time(active, marker) => Ok(user),
            _ => Err(AuthError::SessionSuperseded),
        },
        None => {
            if config.allow_unmarked_credentials {
                Ok(user)
            } else {
                Err(AuthError::InvalidCredential)
            }
        }
    }
}

/// Ends the session of a user, invalidating every credential issued so far
pub async fn logout(store: &dyn Store, user_id: &str) -> Result<(), AuthError> {
    if !store.set_active_session(user_id, None).await? {
        return Err(AuthError::UnknownUser(user_id.to_string()));
    }

    Ok(())
}

// Tests

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Duration;

    use super::*;
    use crate::{
        auth::hash_password,
        models::{Role, UserPatch},
        store::MemoryStore,
    };

    fn test_config() -> AuthConfiguration {
        AuthConfiguration {
            jwt_secret: "guard-test-secret".to_string(),
            token_lifetime_minutes: 1440,
            allow_unmarked_credentials: false,
        }
    }

    async fn store_with_user() -> (MemoryStore, User) {
        let store = MemoryStore::new();
        let user = User::new(
            "inspector1",
            "inspector1@example.com",
            hash_password("correct-horse").unwrap(),
            Role::Inspector,
        );

        store.insert_user(&user).await.unwrap();

        (store, user)
    }

    #[test]
    fn test_session_markers_are_random() {
        let a = generate_session_marker();
        let b = generate_session_marker();

        assert_eq!(a.len(), SESSION_MARKER_BYTES * 2);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_login_and_authenticate() {
        let (store, user) = store_with_user().await;
        let config = test_config();
        let logger = Logger::new_disabled();

        let outcome = login(&store, &logger, &config, "inspector1@example.com", "correct-horse", Utc::now())
            .await
            .unwrap();

        assert_eq!(outcome.user.id, user.id);
        assert!(outcome.user.last_login.is_some());

        let authenticated = authenticate(&store, &config, &outcome.access_token)
            .await
            .unwrap();

        assert_eq!(authenticated.id, user.id);
        assert_eq!(authenticated.active_session, outcome.user.active_session);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_login_keeps_concurrent_account_changes() {
        let (store, user) = store_with_user().await;
        let store = Arc::new(store);
        let config = Arc::new(test_config());

        let login_task = {
            let store = store.clone();
            let config = config.clone();

            tokio::spawn(async move {
                login(
                    store.as_ref(),
                    &Logger::new_disabled(),
                    &config,
                    "inspector1@example.com",
                    "correct-horse",
                    Utc::now(),
                )
                .await
            })
        };

        // Demote the account while the password is being checked
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        store
            .patch_user(
                &user.id,
                &UserPatch {
                    role: Some(Role::Viewer),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let outcome = login_task.await.unwrap().unwrap();

        let stored = store.find_user(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Viewer);
        assert_eq!(stored.active_session, outcome.user.active_session);
        assert!(stored.last_login.is_some());
    }

    #[tokio::test]
    async fn test_wrong_password_or_email() {
        let (store, _) = store_with_user().await;
        let config = test_config();
        let logger = Logger::new_disabled();

        assert!(matches!(
            login(&store, &logger, &config, "inspector1@example.com", "wrong", Utc::now()).await,
            Err(AuthError::InvalidLogin)
        ));
        assert!(matches!(
            login(&store, &logger, &config, "nobody@example.com", "correct-horse", Utc::now()).await,
            Err(AuthError::InvalidLogin)
        ));
    }

    #[tokio::test]
    async fn test_newer_login_supersedes_credential() {
        let (store, _) = store_with_user().await;
        let config = test_config();
        let logger = Logger::new_disabled();

        let first = login(&store, &logger, &config, "inspector1@example.com", "correct-horse", Utc::now())
            .await
            .unwrap();

        assert!(authenticate(&store, &config, &first.access_token).await.is_ok());

        let second = login(&store, &logger, &config, "inspector1@example.com", "correct-horse", Utc::now())
            .await
            .unwrap();

        assert!(matches!(
            authenticate(&store, &config, &first.access_token).await,
            Err(AuthError::SessionSuperseded)
        ));
        assert!(authenticate(&store, &config, &second.access_token).await.is_ok());
    }

    #[tokio::test]
    async fn test_logout_invalidates_credential() {
        let (store, user) = store_with_user().await;
        let config = test_config();
        let logger = Logger::new_disabled();

        let outcome = login(&store, &logger, &config, "inspector1@example.com", "correct-horse", Utc::now())
            .await
            .unwrap();

        logout(&store, &user.id).await.unwrap();

        assert!(matches!(
            authenticate(&store, &config, &outcome.access_token).await,
            Err(AuthError::SessionSuperseded)
        ));

        let stored = store.find_user(&user.id).await.unwrap().unwrap();
        assert!(stored.active_session.is_none());
    }

    #[tokio::test]
    async fn test_expired_credential() {
        let (store, user) = store_with_user().await;
        let config = test_config();

        let marker = generate_session_marker();
        store.set_active_session(&user.id, Some(&marker)).await.unwrap();

        let token = issue_credential(
            &config,
            &user.id,
            Some(&marker),
            Utc::now() - Duration::hours(25),
        )
        .unwrap();

        assert!(matches!(
            authenticate(&store, &config, &token).await,
            Err(AuthError::ExpiredCredential)
        ));
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let store = MemoryStore::new();
        let config = test_config();

        let token = issue_credential(&config, "ghost", Some("m"), Utc::now()).unwrap();

        assert!(matches!(
            authenticate(&store, &config, &token).await,
            Err(AuthError::UnknownUser(id)) if id == "ghost"
        ));
    }

    #[tokio::test]
    async fn test_unmarked_credentials_follow_configuration() {
        let (store, user) = store_with_user().await;
        let mut config = test_config();

        let token = issue_credential(&config, &user.id, None, Utc::now()).unwrap();

        assert!(matches!(
            authenticate(&store, &config, &token).await,
            Err(AuthError::InvalidCredential)
        ));

        config.allow_unmarked_credentials = true;

        assert!(authenticate(&store, &config, &token).await.is_ok());
    }
}
