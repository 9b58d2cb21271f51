// Equipment inspection reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Status;

/// Equipment inspection report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub id: String,

    /// Report identifier, PK{YYYY}-{CITY}{NNN}
    pub report_number: String,

    pub project_id: String,
    pub project_name: String,
    pub city: String,
    pub city_code: String,
    pub equipment_name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub firm: String,
    pub location: Option<String>,
    pub brand_model: Option<String>,
    pub serial_number: Option<String>,

    /// Inspection period (3, 6 or 12 months)
    pub period: Option<String>,

    pub valid_until: Option<String>,
    pub description: Option<String>,

    /// Inspection verdict
    pub compliance: Option<String>,

    #[serde(default)]
    pub status: Status,

    pub created_by: String,
    pub created_by_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields sent by the client to create a report
#[derive(Debug, Clone, Deserialize)]
pub struct NewReport {
    pub project_id: String,
    pub city: String,
    pub equipment_name: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub firm: String,
    pub location: Option<String>,
    pub brand_model: Option<String>,
    pub serial_number: Option<String>,
    pub period: Option<String>,
    pub valid_until: Option<String>,
    pub description: Option<String>,
    pub compliance: Option<String>,
}

/// Partial report update, only present fields are applied
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportUpdate {
    pub project_id: Option<String>,
    pub city: Option<String>,
    pub equipment_name: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub firm: Option<String>,
    pub location: Option<String>,
    pub brand_model: Option<String>,
    pub serial_number: Option<String>,
    pub period: Option<String>,
    pub valid_until: Option<String>,
    pub description: Option<String>,
    pub compliance: Option<String>,
}

fn replace_if_present(target: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *target = v;
    }
}

fn replace_optional_if_present(target: &mut Option<String>, value: Option<String>) {
    if value.is_some() {
        *target = value;
    }
}

impl Report {
    /// Applies a partial update
    ///
    /// The report number and the creator never change
    pub fn apply_update(&mut self, update: ReportUpdate, now: DateTime<Utc>) {
        replace_if_present(&mut self.project_id, update.project_id);
        replace_if_present(&mut self.city, update.city);
        replace_if_present(&mut self.equipment_name, update.equipment_name);
        replace_if_present(&mut self.category, update.category);
        replace_if_present(&mut self.firm, update.firm);
        replace_optional_if_present(&mut self.subcategory, update.subcategory);
        replace_optional_if_present(&mut self.location, update.location);
        replace_optional_if_present(&mut self.brand_model, update.brand_model);
        replace_optional_if_present(&mut self.serial_number, update.serial_number);
        replace_optional_if_present(&mut self.period, update.period);
        replace_optional_if_present(&mut self.valid_until, update.valid_until);
        replace_optional_if_present(&mut self.description, update.description);
        replace_optional_if_present(&mut self.compliance, update.compliance);

        self.updated_at = now;
    }
}

// Tests

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_report() -> Report {
        let created = Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).unwrap();

        Report {
            id: "r1".to_string(),
            report_number: "PK2025-ANK001".to_string(),
            project_id: "p1".to_string(),
            project_name: "Depot".to_string(),
            city: "Ankara".to_string(),
            city_code: "ANK".to_string(),
            equipment_name: "Forklift".to_string(),
            category: "Lifting".to_string(),
            subcategory: None,
            firm: "Acme".to_string(),
            location: Some("Hall A".to_string()),
            brand_model: None,
            serial_number: None,
            period: Some("12".to_string()),
            valid_until: None,
            description: None,
            compliance: None,
            status: Status::Active,
            created_by: "u1".to_string(),
            created_by_username: "inspector1".to_string(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_apply_update_keeps_number_and_absent_fields() {
        let mut report = sample_report();
        let now = Utc.with_ymd_and_hms(2025, 4, 1, 9, 0, 0).unwrap();

        report.apply_update(
            ReportUpdate {
                equipment_name: Some("Forklift 2t".to_string()),
                compliance: Some("Compliant".to_string()),
                ..Default::default()
            },
            now,
        );

        assert_eq!(report.report_number, "PK2025-ANK001");
        assert_eq!(report.equipment_name, "Forklift 2t");
        assert_eq!(report.compliance.as_deref(), Some("Compliant"));
        assert_eq!(report.location.as_deref(), Some("Hall A"));
        assert_eq!(report.updated_at, now);
        assert_ne!(report.created_at, now);
    }
}
