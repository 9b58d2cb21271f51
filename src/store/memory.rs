// In-memory store

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{
    models::{Attachment, Category, Project, Report, User, UserPatch},
    sequence::pick_latest_number,
};

use super::{merge_document, RecordKind, Store, StoreError};

/// Store data, guarded by a single lock so that
/// every operation is atomic with respect to the others
#[derive(Default)]
struct MemoryData {
    users: HashMap<String, User>,
    projects: Vec<Project>,
    categories: Vec<Category>,

    /// Reports in insertion order
    reports: Vec<Report>,

    sequences: HashMap<String, u64>,
    attachments: Vec<Attachment>,

    /// Record documents by kind, in insertion order
    records: HashMap<RecordKind, Vec<(String, Value)>>,
}

impl MemoryData {
    /// Checks that no other account uses the email or username
    fn check_unique_user(
        &self,
        id: &str,
        email: Option<&str>,
        username: Option<&str>,
    ) -> Result<(), StoreError> {
        for existing in self.users.values().filter(|u| u.id != id) {
            if let Some(email) = email {
                if existing.email == email {
                    return Err(StoreError::Conflict(format!("email {}", email)));
                }
            }

            if let Some(username) = username {
                if existing.username == username {
                    return Err(StoreError::Conflict(format!("username {}", username)));
                }
            }
        }

        Ok(())
    }

    /// Checks that no other record of the kind uses the unique value of a document
    fn check_unique_record(&self, kind: RecordKind, id: &str, doc: &Value) -> Result<(), StoreError> {
        let value = match kind.unique_value(doc) {
            Some(v) => v,
            None => return Ok(()),
        };

        let taken = self
            .records
            .get(&kind)
            .map(|docs| {
                docs.iter()
                    .any(|(other, d)| other != id && kind.unique_value(d) == Some(value))
            })
            .unwrap_or(false);

        if taken {
            return Err(StoreError::Conflict(format!("{} {}", kind.as_str(), value)));
        }

        Ok(())
    }
}

/// Process-local store, for tests and single process deployments
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;

        data.check_unique_user(&user.id, Some(&user.email), Some(&user.username))?;

        data.users.insert(user.id.clone(), user.clone());

        Ok(())
    }

    async fn find_user(&self, id: &str) -> Result<Option<User>, StoreError> {
        Ok(self.data.lock().await.users.get(id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let data = self.data.lock().await;

        Ok(data.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let data = self.data.lock().await;

        Ok(data.users.values().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let data = self.data.lock().await;
        let mut users: Vec<User> = data.users.values().cloned().collect();

        users.sort_by(|a, b| a.created_at.cmp(&b.created_at));

        Ok(users)
    }

    async fn patch_user(&self, id: &str, patch: &UserPatch) -> Result<Option<User>, StoreError> {
        let mut data = self.data.lock().await;

        data.check_unique_user(id, patch.email.as_deref(), patch.username.as_deref())?;

        Ok(data.users.get_mut(id).map(|user| {
            patch.apply(user);
            user.clone()
        }))
    }

    async fn delete_user(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.data.lock().await.users.remove(id).is_some())
    }

    async fn set_active_session(
        &self,
        user_id: &str,
        marker: Option<&str>,
    ) -> Result<bool, StoreError> {
        let mut data = self.data.lock().await;

        match data.users.get_mut(user_id) {
            Some(user) => {
                user.active_session = marker.map(|m| m.to_string());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn record_login(
        &self,
        user_id: &str,
        marker: &str,
        at: DateTime<Utc>,
    ) -> Result<Option<User>, StoreError> {
        let mut data = self.data.lock().await;

        Ok(data.users.get_mut(user_id).map(|user| {
            user.active_session = Some(marker.to_string());
            user.last_login = Some(at);
            user.clone()
        }))
    }

    async fn insert_project(&self, project: &Project) -> Result<(), StoreError> {
        self.data.lock().await.projects.push(project.clone());
        Ok(())
    }

    async fn find_project(&self, id: &str) -> Result<Option<Project>, StoreError> {
        let data = self.data.lock().await;

        Ok(data.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        Ok(self.data.lock().await.projects.clone())
    }

    async fn update_project(&self, project: &Project) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;

        if let Some(existing) = data.projects.iter_mut().find(|p| p.id == project.id) {
            *existing = project.clone();
        }

        Ok(())
    }

    async fn delete_project(&self, id: &str) -> Result<bool, StoreError> {
        let mut data = self.data.lock().await;
        let before = data.projects.len();

        data.projects.retain(|p| p.id != id);

        Ok(data.projects.len() != before)
    }

    async fn insert_category(&self, category: &Category) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;

        if data.categories.iter().any(|c| c.name == category.name) {
            return Err(StoreError::Conflict(format!("category {}", category.name)));
        }

        data.categories.push(category.clone());

        Ok(())
    }

    async fn find_category(&self, id: &str) -> Result<Option<Category>, StoreError> {
        let data = self.data.lock().await;

        Ok(data.categories.iter().find(|c| c.id == id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.data.lock().await.categories.clone())
    }

    async fn update_category(&self, category: &Category) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;

        if data
            .categories
            .iter()
            .any(|c| c.id != category.id && c.name == category.name)
        {
            return Err(StoreError::Conflict(format!("category {}", category.name)));
        }

        if let Some(existing) = data.categories.iter_mut().find(|c| c.id == category.id) {
            *existing = category.clone();
        }

        Ok(())
    }

    async fn delete_category(&self, id: &str) -> Result<bool, StoreError> {
        let mut data = self.data.lock().await;
        let before = data.categories.len();

        data.categories.retain(|c| c.id != id);

        Ok(data.categories.len() != before)
    }

    async fn insert_report(&self, report: &Report) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;

        if data
            .reports
            .iter()
            .any(|r| r.report_number == report.report_number)
        {
            return Err(StoreError::DuplicateIdentifier(report.report_number.clone()));
        }

        data.reports.push(report.clone());

        Ok(())
    }

    async fn find_report(&self, id: &str) -> Result<Option<Report>, StoreError> {
        let data = self.data.lock().await;

        Ok(data.reports.iter().find(|r| r.id == id).cloned())
    }

    async fn list_reports(&self) -> Result<Vec<Report>, StoreError> {
        let data = self.data.lock().await;
        let mut reports: Vec<Report> = data.reports.iter().rev().cloned().collect();

        // Stable, so equal timestamps keep the newest insertion first
        reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(reports)
    }

    async fn update_report(&self, report: &Report) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;

        if let Some(existing) = data.reports.iter_mut().find(|r| r.id == report.id) {
            *existing = report.clone();
        }

        Ok(())
    }

    async fn delete_report(&self, id: &str) -> Result<bool, StoreError> {
        let mut data = self.data.lock().await;
        let before = data.reports.len();

        data.reports.retain(|r| r.id != id);
        data.attachments.retain(|a| a.report_id != id);

        Ok(data.reports.len() != before)
    }

    async fn latest_report_number(&self, prefix: &str) -> Result<Option<String>, StoreError> {
        let data = self.data.lock().await;

        Ok(pick_latest_number(
            prefix,
            data.reports
                .iter()
                .map(|r| (r.report_number.as_str(), r.created_at.timestamp_millis())),
        ))
    }

    async fn current_sequence(&self, prefix: &str) -> Result<Option<u64>, StoreError> {
        Ok(self.data.lock().await.sequences.get(prefix).copied())
    }

    async fn increment_sequence(&self, prefix: &str, floor: u64) -> Result<u64, StoreError> {
        let mut data = self.data.lock().await;
        let counter = data.sequences.entry(prefix.to_string()).or_insert(floor);

        *counter += 1;

        Ok(*counter)
    }

    async fn add_attachment(&self, attachment: &Attachment) -> Result<(), StoreError> {
        self.data.lock().await.attachments.push(attachment.clone());
        Ok(())
    }

    async fn find_attachment(&self, id: &str) -> Result<Option<Attachment>, StoreError> {
        let data = self.data.lock().await;

        Ok(data.attachments.iter().find(|a| a.id == id).cloned())
    }

    async fn list_attachments(&self, report_id: &str) -> Result<Vec<Attachment>, StoreError> {
        let data = self.data.lock().await;

        Ok(data
            .attachments
            .iter()
            .filter(|a| a.report_id == report_id)
            .cloned()
            .collect())
    }

    async fn delete_attachment(&self, id: &str) -> Result<bool, StoreError> {
        let mut data = self.data.lock().await;
        let before = data.attachments.len();

        data.attachments.retain(|a| a.id != id);

        Ok(data.attachments.len() != before)
    }

    async fn insert_document(&self, kind: RecordKind, id: &str, doc: &Value) -> Result<(), StoreError> {
        let mut data = self.data.lock().await;

        data.check_unique_record(kind, id, doc)?;

        data.records
            .entry(kind)
            .or_default()
            .push((id.to_string(), doc.clone()));

        Ok(())
    }

    async fn find_document(&self, kind: RecordKind, id: &str) -> Result<Option<Value>, StoreError> {
        let data = self.data.lock().await;

        Ok(data
            .records
            .get(&kind)
            .and_then(|docs| docs.iter().find(|(other, _)| other == id))
            .map(|(_, doc)| doc.clone()))
    }

    async fn list_documents(&self, kind: RecordKind) -> Result<Vec<Value>, StoreError> {
        let data = self.data.lock().await;

        Ok(data
            .records
            .get(&kind)
            .map(|docs| docs.iter().map(|(_, doc)| doc.clone()).collect())
            .unwrap_or_default())
    }

    async fn patch_document(
        &self,
        kind: RecordKind,
        id: &str,
        patch: &Value,
    ) -> Result<Option<Value>, StoreError> {
        let mut data = self.data.lock().await;

        data.check_unique_record(kind, id, patch)?;

        Ok(data
            .records
            .get_mut(&kind)
            .and_then(|docs| docs.iter_mut().find(|(other, _)| other == id))
            .map(|(_, doc)| {
                merge_document(doc, patch);
                doc.clone()
            }))
    }

    async fn delete_document(&self, kind: RecordKind, id: &str) -> Result<bool, StoreError> {
        let mut data = self.data.lock().await;

        match data.records.get_mut(&kind) {
            Some(docs) => {
                let before = docs.len();
                docs.retain(|(other, _)| other != id);
                Ok(docs.len() != before)
            }
            None => Ok(false),
        }
    }
}

// Tests
