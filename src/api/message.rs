// Simple response bodies

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: &str) -> MessageResponse {
        MessageResponse {
            message: message.to_string(),
        }
    }
}

/// Response of bulk deletions
#[derive(Debug, Serialize)]
pub struct BulkDeleteResponse {
    pub message: String,
    pub deleted_count: usize,
}

impl BulkDeleteResponse {
    pub fn new(what: &str, deleted_count: usize) -> BulkDeleteResponse {
        BulkDeleteResponse {
            message: format!("{} {} deleted", deleted_count, what),
            deleted_count,
        }
    }
}
