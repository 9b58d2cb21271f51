// Authentication: passwords, credentials and the session guard

mod config;
mod error;
mod guard;
mod password;
mod token;

pub use config::*;
pub use error::*;
pub use guard::*;
pub use password::*;
pub use token::*;
