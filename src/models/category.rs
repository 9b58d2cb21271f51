// Report categories

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Equipment category, with its subcategories
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Category fields sent by the client on create and update
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryFields {
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
    pub description: Option<String>,
}

impl Category {
    pub fn from_fields(fields: CategoryFields) -> Category {
        Category {
            id: super::new_entity_id(),
            name: fields.name,
            subcategories: fields.subcategories,
            description: fields.description,
            created_at: Utc::now(),
        }
    }
}
