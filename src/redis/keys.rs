// Redis key layout

use crate::store::RecordKind;

/// Builds the keys used by the Redis store, all under a common prefix
#[derive(Clone)]
pub struct RedisKeys {
    prefix: String,
}

impl RedisKeys {
    pub fn new(prefix: &str) -> RedisKeys {
        RedisKeys {
            prefix: prefix.to_string(),
        }
    }

    /// Pattern matching every key of the store
    #[cfg(test)]
    pub fn all(&self) -> String {
        format!("{}:*", self.prefix)
    }

    /// Hash with the fields "doc" (account JSON) and "session" (marker)
    pub fn user(&self, id: &str) -> String {
        format!("{}:user:{}", self.prefix, id)
    }

    /// Set of user IDs
    pub fn users(&self) -> String {
        format!("{}:users", self.prefix)
    }

    /// Hash email -> user ID
    pub fn user_emails(&self) -> String {
        format!("{}:user_emails", self.prefix)
    }

    /// Hash username -> user ID
    pub fn user_names(&self) -> String {
        format!("{}:user_names", self.prefix)
    }

    /// Hash project ID -> JSON
    pub fn projects(&self) -> String {
        format!("{}:projects", self.prefix)
    }

    /// Hash category ID -> JSON
    pub fn categories(&self) -> String {
        format!("{}:categories", self.prefix)
    }

    /// Hash category name -> category ID
    pub fn category_names(&self) -> String {
        format!("{}:category_names", self.prefix)
    }

    /// String, report JSON
    pub fn report(&self, id: &str) -> String {
        format!("{}:report:{}", self.prefix, id)
    }

    /// Sorted set of report IDs, scored by creation time (ms)
    pub fn reports(&self) -> String {
        format!("{}:reports", self.prefix)
    }

    /// Hash report number -> report ID
    pub fn report_numbers(&self) -> String {
        format!("{}:report_numbers", self.prefix)
    }

    /// Sorted set of the report numbers with a prefix, scored by creation time (ms)
    pub fn report_prefix(&self, number_prefix: &str) -> String {
        format!("{}:report_prefix:{}", self.prefix, number_prefix)
    }

    /// Integer counter of a report number prefix
    pub fn sequence(&self, number_prefix: &str) -> String {
        format!("{}:sequence:{}", self.prefix, number_prefix)
    }

    /// String, attachment JSON
    pub fn attachment(&self, id: &str) -> String {
        format!("{}:attachment:{}", self.prefix, id)
    }

    /// Set of the attachment IDs of a report
    pub fn attachments(&self, report_id: &str) -> String {
        format!("{}:attachments:{}", self.prefix, report_id)
    }

    /// Hash record ID -> JSON, per kind
    pub fn records(&self, kind: RecordKind) -> String {
        format!("{}:records:{}", self.prefix, kind.as_str())
    }

    /// Hash unique value -> record ID, per kind
    pub fn record_index(&self, kind: RecordKind) -> String {
        format!("{}:record_index:{}", self.prefix, kind.as_str())
    }
}

// Tests
