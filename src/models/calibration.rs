// Calibration devices

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{Record, RecordKind};

/// Measuring device used during inspections, with its calibration date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalibrationDevice {
    pub id: String,
    pub device_name: String,
    pub serial_number: String,
    pub calibration_date: String,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub created_by_username: Option<String>,
}

/// Calibration device fields sent by the client on create and update
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibrationDeviceFields {
    pub device_name: String,
    pub serial_number: String,
    pub calibration_date: String,
}

impl Record for CalibrationDevice {
    const KIND: RecordKind = RecordKind::CalibrationDevice;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
