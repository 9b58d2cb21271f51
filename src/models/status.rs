// Active / passive status

use serde::{Deserialize, Serialize};

/// Status of a project or a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    #[default]
    Active,
    Passive,
}

impl Status {
    /// Returns the opposite status
    pub fn toggled(&self) -> Status {
        match self {
            Status::Active => Status::Passive,
            Status::Passive => Status::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Passive => "passive",
        }
    }
}
