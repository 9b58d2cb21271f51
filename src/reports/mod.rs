// Equipment inspection reports

mod attachments;
mod error;
mod export;
mod query;
mod service;
mod stats;

pub use attachments::*;
pub use error::*;
pub use export::*;
pub use query::*;
pub use service::*;
pub use stats::*;
