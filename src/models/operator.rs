// Certified machine operators

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Record, RecordKind};

/// Validity of an operator certificate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CertificateStatus {
    #[default]
    Valid,
    Expired,
}

/// Operator certified to use a kind of machine
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Operator {
    pub id: String,
    pub project_id: String,
    pub project_name: String,
    pub full_name: String,
    pub phone: String,
    pub machine_type: Option<String>,

    /// Unique among operators
    pub certificate_number: String,

    pub certificate_type: Option<String>,
    pub valid_until: String,
    #[serde(default)]
    pub status: CertificateStatus,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields sent by the client to create an operator
#[derive(Debug, Clone, Deserialize)]
pub struct NewOperator {
    pub project_id: String,
    pub full_name: String,
    pub phone: String,
    pub machine_type: Option<String>,
    pub certificate_number: String,
    pub certificate_type: Option<String>,
    pub valid_until: String,
    #[serde(default)]
    pub status: CertificateStatus,
    pub description: Option<String>,
}

/// Partial operator update, only present fields are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatorUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CertificateStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Operator {
    pub fn from_fields(fields: NewOperator, project_name: &str, now: DateTime<Utc>) -> Operator {
        Operator {
            id: super::new_entity_id(),
            project_id: fields.project_id,
            project_name: project_name.to_string(),
            full_name: fields.full_name,
            phone: fields.phone,
            machine_type: fields.machine_type,
            certificate_number: fields.certificate_number.trim().to_string(),
            certificate_type: fields.certificate_type,
            valid_until: fields.valid_until,
            status: fields.status,
            description: fields.description,
            created_at: now,
            updated_at: None,
        }
    }
}

impl Record for Operator {
    const KIND: RecordKind = RecordKind::Operator;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_certificate_status_serialization() {
        assert_eq!(
            serde_json::to_string(&CertificateStatus::Expired).unwrap(),
            "\"expired\""
        );

        let fields: NewOperator = serde_json::from_str(
            r#"{
                "project_id": "p1",
                "full_name": "Ali Veli",
                "phone": "555",
                "certificate_number": " OP-1 ",
                "valid_until": "2026-01-01"
            }"#,
        )
        .unwrap();
        assert_eq!(fields.status, CertificateStatus::Valid);

        let operator = Operator::from_fields(fields, "Depot", Utc::now());
        assert_eq!(operator.certificate_number, "OP-1");
        assert_eq!(operator.project_name, "Depot");
    }
}
