// HTTP API

mod attachments;
mod auth;
mod calibration;
mod categories;
mod context;
mod dashboard;
mod error;
mod extract;
mod machines;
mod message;
mod operators;
mod projects;
mod reports;
mod router;
mod users;

pub use auth::*;
pub use context::*;
pub use error::*;
pub use extract::*;
pub use message::*;
pub use router::*;
