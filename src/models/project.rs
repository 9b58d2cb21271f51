// Projects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Status;

/// Project grouping the reports of a site
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub code: Option<String>,
    pub firm_name: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Status,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Project fields sent by the client on create and update
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectFields {
    pub name: String,
    pub code: Option<String>,
    pub firm_name: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default)]
    pub status: Status,
    pub description: Option<String>,
}

impl Project {
    /// Creates a new project from client fields
    pub fn from_fields(fields: ProjectFields) -> Project {
        Project {
            id: super::new_entity_id(),
            name: fields.name,
            code: fields.code,
            firm_name: fields.firm_name,
            location: fields.location,
            start_date: fields.start_date,
            end_date: fields.end_date,
            status: fields.status,
            description: fields.description,
            created_at: Utc::now(),
        }
    }

    /// Replaces every editable field
    pub fn apply_fields(&mut self, fields: ProjectFields) {
        self.name = fields.name;
        self.code = fields.code;
        self.firm_name = fields.firm_name;
        self.location = fields.location;
        self.start_date = fields.start_date;
        self.end_date = fields.end_date;
        self.status = fields.status;
        self.description = fields.description;
    }
}
