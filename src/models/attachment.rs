// Files attached to reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File attached to a report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub id: String,
    pub report_id: String,

    /// Name of the file as uploaded
    pub file_name: String,

    /// Location of the file on disk
    pub path: String,

    pub uploaded_at: DateTime<Utc>,
}

impl Attachment {
    pub fn new(report_id: &str, file_name: &str, path: &str) -> Attachment {
        Attachment {
            id: super::new_entity_id(),
            report_id: report_id.to_string(),
            file_name: file_name.to_string(),
            path: path.to_string(),
            uploaded_at: Utc::now(),
        }
    }
}
