// Persistence layer
//
// Every handler reaches persisted state through the Store trait.
// Ordering guarantees (unique report numbers, atomic counters)
// come from the store, never from in-process locking.

mod error;
mod memory;
mod record;

pub use error::*;
pub use memory::*;
pub use record::*;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::models::{Attachment, Category, Project, Report, User, UserPatch};

/// Persistent store
#[async_trait]
pub trait Store: Send + Sync {
    // Users

    /// Inserts a user. Fails with Conflict if the email or username is taken.
    async fn insert_user(&self, user: &User) -> Result<(), StoreError>;

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Writes the present fields of a patch, atomically
    ///
    /// Fails with Conflict if the patch takes an email or username
    /// used by another account. Returns the updated account,
    /// or None if it does not exist.
    async fn patch_user(&self, id: &str, patch: &UserPatch) -> Result<Option<User>, StoreError>;

    async fn delete_user(&self, id: &str) -> Result<bool, StoreError>;

    /// Overwrites (or clears, with None) the session marker of an account
    ///
    /// Returns false if the user does not exist
    async fn set_active_session(
        &self,
        user_id: &str,
        marker: Option<&str>,
    ) -> Result<bool, StoreError>;

    /// Stores a new session marker and the login time in one atomic write
    ///
    /// Returns the updated account, or None if it does not exist
    async fn record_login(
        &self,
        user_id: &str,
        marker: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError>;

    // Projects

    async fn insert_project(&self, project: &Project) -> Result<(), StoreError>;

    async fn find_project(&self, id: &str) -> Result<Option<Project>, StoreError>;

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError>;

    async fn update_project(&self, project: &Project) -> Result<(), StoreError>;

    async fn delete_project(&self, id: &str) -> Result<bool, StoreError>;

    // Categories

    /// Inserts a category. Fails with Conflict if the name is taken.
    async fn insert_category(&self, category: &Category) -> Result<(), StoreError>;

    async fn find_category(&self, id: &str) -> Result<Option<Category>, StoreError>;

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError>;

    /// Replaces a category. Fails with Conflict if renamed to a taken name.
    async fn update_category(&self, category: &Category) -> Result<(), StoreError>;

    async fn delete_category(&self, id: &str) -> Result<bool, StoreError>;

    // Reports

    /// Inserts a report. Fails with DuplicateIdentifier if the number is taken.
    async fn insert_report(&self, report: &Report) -> Result<(), StoreError>;

    async fn find_report(&self, id: &str) -> Result<Option<Report>, StoreError>;

    /// Lists every report, newest first
    async fn list_reports(&self) -> Result<Vec<Report>, StoreError>;

    /// Replaces a report document. The report number must not change.
    async fn update_report(&self, report: &Report) -> Result<(), StoreError>;

    /// Deletes a report along with its attachment records
    async fn delete_report(&self, id: &str) -> Result<bool, StoreError>;

    /// Number of the most recently created report whose number starts with the prefix
    async fn latest_report_number(&self, prefix: &str) -> Result<Option<String>, StoreError>;

    // Sequence counters

    /// Current value of the counter of a prefix, None if never used
    async fn current_sequence(&self, prefix: &str) -> Result<Option<u64>, StoreError>;

    /// Atomically initializes the counter to `floor` if it does not exist,
    /// then increments it and returns the new value
    async fn increment_sequence(&self, prefix: &str, floor: u64) -> Result<u64, StoreError>;

    // Attachments

    async fn add_attachment(&self, attachment: &Attachment) -> Result<(), StoreError>;

    async fn find_attachment(&self, id: &str) -> Result<Option<Attachment>, StoreError>;

    /// Lists the attachments of a report, oldest first
    async fn list_attachments(&self, report_id: &str) -> Result<Vec<Attachment>, StoreError>;

    async fn delete_attachment(&self, id: &str) -> Result<bool, StoreError>;

    // Records (machines, operators, calibration devices)

    /// Inserts a record document. Fails with Conflict if the
    /// unique field of the kind is taken.
    async fn insert_document(&self, kind: RecordKind, id: &str, doc: &Value) -> Result<(), StoreError>;

    async fn find_document(&self, kind: RecordKind, id: &str) -> Result<Option<Value>, StoreError>;

    async fn list_documents(&self, kind: RecordKind) -> Result<Vec<Value>, StoreError>;

    /// Merges the fields of `patch` into a record document, atomically
    ///
    /// Returns the merged document, or None if it does not exist
    async fn patch_document(
        &self,
        kind: RecordKind,
        id: &str,
        patch: &Value,
    ) -> Result<Option<Value>, StoreError>;

    async fn delete_document(&self, kind: RecordKind, id: &str) -> Result<bool, StoreError>;
}
