// Work machines on project sites

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Record, RecordKind};

use super::Status;

/// Machine working on a project site
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Machine {
    pub id: String,
    pub project_id: String,
    pub project_name: String,

    /// Car, tractor, excavator...
    pub machine_type: String,

    pub firm: String,

    /// Plate or serial number, unique among machines
    pub plate_or_serial: String,

    pub chassis_engine_no: Option<String>,
    pub manufacture_year: Option<String>,
    pub service_date: Option<String>,
    pub insurance_date: Option<String>,
    pub periodic_inspection_date: Option<String>,
    pub license_inspection_date: Option<String>,
    pub operator_name: Option<String>,
    pub operator_certificate_date: Option<String>,
    pub certifying_body: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Status,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Fields sent by the client to create a machine
#[derive(Debug, Clone, Deserialize)]
pub struct NewMachine {
    pub project_id: String,
    pub machine_type: String,
    pub firm: String,
    pub plate_or_serial: String,
    pub chassis_engine_no: Option<String>,
    pub manufacture_year: Option<String>,
    pub service_date: Option<String>,
    pub insurance_date: Option<String>,
    pub periodic_inspection_date: Option<String>,
    pub license_inspection_date: Option<String>,
    pub operator_name: Option<String>,
    pub operator_certificate_date: Option<String>,
    pub certifying_body: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub status: Status,
    pub description: Option<String>,
}

/// Partial machine update, only present fields are written
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MachineUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub firm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate_or_serial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chassis_engine_no: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacture_year: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insurance_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub periodic_inspection_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_inspection_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operator_certificate_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certifying_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Machine {
    /// Creates a new machine of a project
    pub fn from_fields(fields: NewMachine, project_name: &str, now: DateTime<Utc>) -> Machine {
        Machine {
            id: super::new_entity_id(),
            project_id: fields.project_id,
            project_name: project_name.to_string(),
            machine_type: fields.machine_type,
            firm: fields.firm,
            plate_or_serial: fields.plate_or_serial.trim().to_string(),
            chassis_engine_no: fields.chassis_engine_no,
            manufacture_year: fields.manufacture_year,
            service_date: fields.service_date,
            insurance_date: fields.insurance_date,
            periodic_inspection_date: fields.periodic_inspection_date,
            license_inspection_date: fields.license_inspection_date,
            operator_name: fields.operator_name,
            operator_certificate_date: fields.operator_certificate_date,
            certifying_body: fields.certifying_body,
            phone: fields.phone,
            status: fields.status,
            description: fields.description,
            created_at: now,
            updated_at: None,
        }
    }
}

impl Record for Machine {
    const KIND: RecordKind = RecordKind::Machine;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

// Tests
