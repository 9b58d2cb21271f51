// HTTP server configuration

use crate::{
    log::Logger,
    log_error,
    utils::{get_env_string, get_env_u32, is_valid_port},
};

/// Default HTTP port
pub const DEFAULT_HTTP_PORT: u32 = 8001;

/// Persistence backend
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Redis,
}

impl StoreBackend {
    pub fn parse(value: &str) -> Option<StoreBackend> {
        match value.trim().to_lowercase().as_str() {
            "memory" => Some(StoreBackend::Memory),
            "redis" => Some(StoreBackend::Redis),
            _ => None,
        }
    }
}

/// Bootstrap admin account
#[derive(Clone)]
pub struct AdminSeedConfiguration {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// HTTP server configuration
#[derive(Clone)]
pub struct HttpServerConfiguration {
    /// Port
    pub port: u32,

    /// Bind address
    pub bind_address: String,

    /// Persistence backend
    pub store_backend: StoreBackend,

    /// Root directory of attachment files
    pub upload_dir: String,

    /// Admin account to create at startup
    pub admin: Option<AdminSeedConfiguration>,
}

impl HttpServerConfiguration {
    /// Loads HTTP server configuration
    /// from environment variables
    pub fn load_from_env(logger: &Logger) -> Result<HttpServerConfiguration, ()> {
        let port = get_env_u32("HTTP_PORT", DEFAULT_HTTP_PORT);

        if !is_valid_port(port) {
            log_error!(logger, format!("HTTP_PORT has an invalid value: {}", port));
            return Err(());
        }

        let bind_address = get_env_string("BIND_ADDRESS", "0.0.0.0");

        let backend_str = get_env_string("STORE_BACKEND", "memory");

        let store_backend = match StoreBackend::parse(&backend_str) {
            Some(b) => b,
            None => {
                log_error!(
                    logger,
                    format!(
                        "STORE_BACKEND has an invalid value: '{}'. Valid values: memory, redis",
                        backend_str
                    )
                );
                return Err(());
            }
        };

        let upload_dir = get_env_string("UPLOAD_DIR", "uploads");

        let admin_email = get_env_string("ADMIN_EMAIL", "");
        let admin_username = get_env_string("ADMIN_USERNAME", "");
        let admin_password = get_env_string("ADMIN_PASSWORD", "");

        let admin = if admin_email.is_empty() && admin_username.is_empty() && admin_password.is_empty() {
            None
        } else if admin_email.is_empty() || admin_username.is_empty() || admin_password.is_empty() {
            log_error!(
                logger,
                "ADMIN_EMAIL, ADMIN_USERNAME and ADMIN_PASSWORD must be set together"
            );
            return Err(());
        } else {
            Some(AdminSeedConfiguration {
                email: admin_email,
                username: admin_username,
                password: admin_password,
            })
        };

        Ok(HttpServerConfiguration {
            port,
            bind_address,
            store_backend,
            upload_dir,
            admin,
        })
    }

    /// Gets the address to listen on
    pub fn get_listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

// Tests
