// Authentication configuration

use crate::{
    log::Logger,
    log_error, log_warning,
    utils::{get_env_bool, get_env_string, get_env_u32},
};

/// Default validity window of a credential (24 hours)
pub const DEFAULT_TOKEN_LIFETIME_MINUTES: u32 = 1440;

/// Authentication configuration
#[derive(Clone)]
pub struct AuthConfiguration {
    /// Secret to sign credentials (HS256)
    pub jwt_secret: String,

    /// Validity window of a credential, in minutes
    pub token_lifetime_minutes: u32,

    /// Accept credentials issued without a session marker
    pub allow_unmarked_credentials: bool,
}

impl AuthConfiguration {
    /// Loads authentication configuration
    /// from environment variables
    pub fn load_from_env(logger: &Logger) -> Result<AuthConfiguration, ()> {
        let jwt_secret = get_env_string("JWT_SECRET", "");

        if jwt_secret.is_empty() {
            log_warning!(logger, "JWT_SECRET is empty. Make sure to set a secure JWT secret to prevent security issues.");
        }

        let token_lifetime_minutes =
            get_env_u32("TOKEN_LIFETIME_MINUTES", DEFAULT_TOKEN_LIFETIME_MINUTES);

        if token_lifetime_minutes == 0 {
            log_error!(logger, "TOKEN_LIFETIME_MINUTES must be greater than 0");
            return Err(());
        }

        let allow_unmarked_credentials = get_env_bool("ALLOW_UNMARKED_CREDENTIALS", false);

        if allow_unmarked_credentials {
            log_warning!(logger, "ALLOW_UNMARKED_CREDENTIALS is enabled. Credentials without a session marker bypass single session enforcement.");
        }

        Ok(AuthConfiguration {
            jwt_secret,
            token_lifetime_minutes,
            allow_unmarked_credentials,
        })
    }

    /// Gets the credential lifetime in seconds
    pub fn token_lifetime_seconds(&self) -> i64 {
        self.token_lifetime_minutes as i64 * 60
    }
}
