// Report listing filters

use serde::Deserialize;

use crate::models::{Report, Role, User};

/// Default page size of report listings
pub const DEFAULT_REPORT_LIMIT: usize = 500;

/// Filters of a report listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    pub project_id: Option<String>,
    pub firm: Option<String>,
    pub category: Option<String>,
    pub period: Option<String>,
    pub compliance: Option<String>,

    /// Case insensitive text matched against number, equipment name and firm
    pub search: Option<String>,

    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

/// Firm a user is restricted to, if any
pub fn firm_scope(user: &User) -> Option<&str> {
    match (user.role, user.firm_name.as_deref()) {
        (Role::Viewer, Some(firm)) if !firm.is_empty() => Some(firm),
        _ => None,
    }
}

/// Checks if a user is allowed to see a report
pub fn is_report_visible(user: &User, report: &Report) -> bool {
    match firm_scope(user) {
        Some(firm) => report.firm == firm,
        None => true,
    }
}

fn matches_field(filter: &Option<String>, value: &str) -> bool {
    match filter.as_deref() {
        Some(f) if !f.is_empty() => f == value,
        _ => true,
    }
}

fn matches_optional_field(filter: &Option<String>, value: &Option<String>) -> bool {
    match filter.as_deref() {
        Some(f) if !f.is_empty() => value.as_deref() == Some(f),
        _ => true,
    }
}

impl ReportQuery {
    /// Checks a report against every filter except paging
    pub fn matches(&self, report: &Report) -> bool {
        if !matches_field(&self.project_id, &report.project_id)
            || !matches_field(&self.firm, &report.firm)
            || !matches_field(&self.category, &report.category)
            || !matches_optional_field(&self.period, &report.period)
            || !matches_optional_field(&self.compliance, &report.compliance)
        {
            return false;
        }

        match self.search.as_deref() {
            Some(s) if !s.is_empty() => {
                let needle = s.to_lowercase();

                report.report_number.to_lowercase().contains(&needle)
                    || report.equipment_name.to_lowercase().contains(&needle)
                    || report.firm.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }

    /// Filters a newest first list of reports for a user,
    /// then applies paging
    pub fn apply(&self, user: &User, reports: Vec<Report>) -> Vec<Report> {
        let scope = firm_scope(user).map(|f| f.to_string());

        reports
            .into_iter()
            .filter(|r| match &scope {
                Some(firm) => &r.firm == firm,
                None => true,
            })
            .filter(|r| self.matches(r))
            .skip(self.skip.unwrap_or(0))
            .take(self.limit.unwrap_or(DEFAULT_REPORT_LIMIT))
            .collect()
    }
}
