// Redis store

mod config;
mod keys;
mod store;

pub use config::*;
pub use keys::*;
pub use store::*;
