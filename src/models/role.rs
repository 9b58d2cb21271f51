// User roles

use serde::{Deserialize, Serialize};

/// Role of a user account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Inspector,
    #[default]
    Viewer,
}

impl Role {
    /// True if the role can create or modify reports
    pub fn can_edit_reports(&self) -> bool {
        matches!(self, Role::Admin | Role::Inspector)
    }

    /// True if the role can manage users, projects and categories
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

// Tests
