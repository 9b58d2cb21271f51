// Records
//
// Plain CRUD resources are kept as JSON documents grouped by kind.
// A kind may declare one field whose value is unique among its records.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use super::{Store, StoreError};

/// Kind of record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Machine,
    Operator,
    CalibrationDevice,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Machine => "machine",
            RecordKind::Operator => "operator",
            RecordKind::CalibrationDevice => "calibration_device",
        }
    }

    /// Field that must be unique among the records of this kind
    pub fn unique_field(&self) -> Option<&'static str> {
        match self {
            RecordKind::Machine => Some("plate_or_serial"),
            RecordKind::Operator => Some("certificate_number"),
            RecordKind::CalibrationDevice => None,
        }
    }

    /// Value of the unique field in a document (or patch)
    pub fn unique_value<'a>(&self, doc: &'a Value) -> Option<&'a str> {
        self.unique_field()
            .and_then(|field| doc.get(field))
            .and_then(|v| v.as_str())
    }
}

/// Document stored as a record
pub trait Record: Serialize + DeserializeOwned + Send + Sync {
    const KIND: RecordKind;

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;
}

/// Merges the top level fields of a patch object into a document
pub fn merge_document(doc: &mut Value, patch: &Value) {
    if let (Some(target), Some(fields)) = (doc.as_object_mut(), patch.as_object()) {
        for (k, v) in fields {
            target.insert(k.clone(), v.clone());
        }
    }
}

pub async fn insert_record<T: Record>(store: &dyn Store, record: &T) -> Result<(), StoreError> {
    let doc = serde_json::to_value(record)?;
    store.insert_document(T::KIND, record.id(), &doc).await
}

pub async fn find_record<T: Record>(store: &dyn Store, id: &str) -> Result<Option<T>, StoreError> {
    match store.find_document(T::KIND, id).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

/// Lists the records of a kind, oldest first
pub async fn list_records<T: Record>(store: &dyn Store) -> Result<Vec<T>, StoreError> {
    let mut records = store
        .list_documents(T::KIND)
        .await?
        .into_iter()
        .map(serde_json::from_value)
        .collect::<Result<Vec<T>, _>>()?;

    records.sort_by_key(|r| r.created_at());

    Ok(records)
}

/// Writes the present fields of a patch to a record
///
/// The patch must serialize to an object holding only the changed fields
pub async fn patch_record<T: Record, P: Serialize>(
    store: &dyn Store,
    id: &str,
    patch: &P,
) -> Result<Option<T>, StoreError> {
    let patch = serde_json::to_value(patch)?;

    match store.patch_document(T::KIND, id, &patch).await? {
        Some(doc) => Ok(Some(serde_json::from_value(doc)?)),
        None => Ok(None),
    }
}

pub async fn delete_record<T: Record>(store: &dyn Store, id: &str) -> Result<bool, StoreError> {
    store.delete_document(T::KIND, id).await
}

// Tests
