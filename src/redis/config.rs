// Redis store configuration

use crate::{
    log::Logger,
    log_error,
    utils::{get_env_bool, get_env_string, get_env_u32, is_valid_port},
};

/// Redis configuration
pub struct RedisConfiguration {
    /// Redis host
    pub host: String,

    /// Redis port
    pub port: u32,

    // Password
    pub password: String,

    /// Database index
    pub db: u32,

    /// Prefix for every key written by the store
    pub key_prefix: String,

    /// Use TLS?
    pub tls: bool,
}

impl RedisConfiguration {
    /// Loads redis store configuration
    /// from environment variables
    pub fn load_from_env(logger: &Logger) -> Result<RedisConfiguration, ()> {
        let host = get_env_string("REDIS_HOST", "127.0.0.1");

        let port = get_env_u32("REDIS_PORT", 6379);

        if !is_valid_port(port) {
            log_error!(logger, format!("REDIS_PORT has an invalid value: {}", port));
            return Err(());
        }

        let password = get_env_string("REDIS_PASSWORD", "");
        let db = get_env_u32("REDIS_DB", 0);

        let key_prefix = get_env_string("REDIS_KEY_PREFIX", "ekos");

        if key_prefix.is_empty() || key_prefix.contains(' ') {
            log_error!(
                logger,
                format!("REDIS_KEY_PREFIX has an invalid value: '{}'", key_prefix)
            );
            return Err(());
        }

        let tls = get_env_bool("REDIS_TLS", false);

        Ok(RedisConfiguration {
            host,
            port,
            password,
            db,
            key_prefix,
            tls,
        })
    }

    /// Gets redis URL based on the parameters
    pub fn get_redis_url(&self) -> String {
        // {redis|rediss}://[<username>][:<password>@]<hostname>[:port][/<db>]

        let proto = if self.tls { "rediss" } else { "redis" };

        let password_part = if self.password.is_empty() {
            "".to_string()
        } else {
            format!(":{}@", self.password)
        };

        format!(
            "{}://{}{}:{}/{}",
            proto, password_part, self.host, self.port, self.db
        )
    }
}

// Tests
