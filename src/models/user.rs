// User accounts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Role;

/// User account record
///
/// `active_session` is the session marker of the only credential
/// currently allowed for this account. It is never serialized
/// with the rest of the document: stores keep it as a separate field
/// so it can be swapped without rewriting the account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub firm_name: Option<String>,
    pub email_verified: bool,
    pub verification_code: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub city: Option<String>,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,

    #[serde(skip)]
    pub active_session: Option<String>,
}

impl User {
    /// Creates a user with the mandatory fields, everything else empty
    pub fn new(username: &str, email: &str, password_hash: String, role: Role) -> User {
        User {
            id: super::new_entity_id(),
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            role,
            firm_name: None,
            email_verified: false,
            verification_code: None,
            first_name: None,
            last_name: None,
            city: None,
            birth_date: None,
            phone: None,
            created_at: Utc::now(),
            last_login: None,
            active_session: None,
        }
    }

    /// Converts to the client-safe view
    pub fn to_info(&self) -> UserInfo {
        UserInfo {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
            role: self.role,
            firm_name: self.firm_name.clone(),
            email_verified: self.email_verified,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            city: self.city.clone(),
            birth_date: self.birth_date.clone(),
            phone: self.phone.clone(),
            created_at: self.created_at,
        }
    }
}

/// Field-level change of an account
///
/// Only present fields are written, so concurrent changes to other
/// fields of the same account are kept. Serializes to the JSON object
/// of the changed fields.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub firm_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,

    /// Some(None) clears the code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<Option<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

fn set_if_present<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

fn set_optional_if_present<T: Clone>(target: &mut Option<T>, value: &Option<T>) {
    if value.is_some() {
        *target = value.clone();
    }
}

impl UserPatch {
    /// True if the patch changes nothing
    pub fn is_empty(&self) -> bool {
        matches!(serde_json::to_value(self), Ok(serde_json::Value::Object(m)) if m.is_empty())
    }

    /// Applies the present fields to an account
    pub fn apply(&self, user: &mut User) {
        set_if_present(&mut user.username, &self.username);
        set_if_present(&mut user.email, &self.email);
        set_if_present(&mut user.password_hash, &self.password_hash);
        set_if_present(&mut user.role, &self.role);
        set_optional_if_present(&mut user.firm_name, &self.firm_name);
        set_if_present(&mut user.email_verified, &self.email_verified);
        set_if_present(&mut user.verification_code, &self.verification_code);
        set_optional_if_present(&mut user.first_name, &self.first_name);
        set_optional_if_present(&mut user.last_name, &self.last_name);
        set_optional_if_present(&mut user.city, &self.city);
        set_optional_if_present(&mut user.birth_date, &self.birth_date);
        set_optional_if_present(&mut user.phone, &self.phone);
        set_optional_if_present(&mut user.last_login, &self.last_login);
    }
}

/// User information safe to send to the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserInfo {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    pub firm_name: Option<String>,
    pub email_verified: bool,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub city: Option<String>,
    pub birth_date: Option<String>,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Tests
