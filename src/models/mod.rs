// Data model

mod attachment;
mod calibration;
mod category;
mod machine;
mod operator;
mod project;
mod report;
mod role;
mod status;
mod user;

pub use attachment::*;
pub use calibration::*;
pub use category::*;
pub use machine::*;
pub use operator::*;
pub use project::*;
pub use report::*;
pub use role::*;
pub use status::*;
pub use user::*;

use uuid::Uuid;

/// Generates a new random entity ID
pub fn new_entity_id() -> String {
    Uuid::new_v4().to_string()
}
