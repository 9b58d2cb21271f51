// Dashboard statistics

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

use crate::{
    models::{Report, User},
    store::Store,
};

use super::{is_report_visible, ReportError};

/// Verdict of a compliant report
pub const COMPLIANT_VERDICT: &str = "Uygun";

/// Verdict of a non compliant report
pub const NOT_COMPLIANT_VERDICT: &str = "Uygun Değil";

/// Number of categories in the distribution
pub const TOP_CATEGORIES: usize = 6;

const VALID_UNTIL_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DashboardStats {
    pub total_reports: usize,

    /// Reports created since the start of the current month
    pub monthly_reports: usize,

    pub compliant_count: usize,
    pub not_compliant_count: usize,

    /// Reports whose validity ends within the next 30 days
    pub expiring_30_days: usize,

    /// Reports whose validity ends within the next 7 days
    pub expiring_7_days: usize,

    /// Most used categories, biggest first
    pub categories: Vec<CategoryCount>,
}

/// Parses a validity date, unreadable dates are ignored
pub fn parse_valid_until(value: &str) -> Option<NaiveDate> {
    let value = value.trim();

    if let Ok(d) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(d);
    }

    VALID_UNTIL_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(value, f).ok())
        .map(|dt| dt.date())
}

fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(now.year(), now.month(), 1, 0, 0, 0)
        .single()
        .unwrap_or(now)
}

/// Computes the statistics of the reports a user can see
pub fn compute_stats(user: &User, reports: &[Report], now: DateTime<Utc>) -> DashboardStats {
    let visible: Vec<&Report> = reports
        .iter()
        .filter(|r| is_report_visible(user, r))
        .collect();

    let month_start = start_of_month(now);
    let today = now.date_naive();
    let in_7_days = (now + Duration::days(7)).date_naive();
    let in_30_days = (now + Duration::days(30)).date_naive();

    let count_verdict = |verdict: &str| {
        visible
            .iter()
            .filter(|r| r.compliance.as_deref() == Some(verdict))
            .count()
    };

    let valid_until: Vec<NaiveDate> = visible
        .iter()
        .filter_map(|r| r.valid_until.as_deref())
        .filter_map(parse_valid_until)
        .filter(|d| *d >= today)
        .collect();

    let mut per_category: HashMap<&str, usize> = HashMap::new();

    for report in visible.iter() {
        *per_category.entry(report.category.as_str()).or_default() += 1;
    }

    let mut categories: Vec<CategoryCount> = per_category
        .into_iter()
        .map(|(category, count)| CategoryCount {
            category: category.to_string(),
            count,
        })
        .collect();

    categories.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.category.cmp(&b.category)));
    categories.truncate(TOP_CATEGORIES);

    DashboardStats {
        total_reports: visible.len(),
        monthly_reports: visible.iter().filter(|r| r.created_at >= month_start).count(),
        compliant_count: count_verdict(COMPLIANT_VERDICT),
        not_compliant_count: count_verdict(NOT_COMPLIANT_VERDICT),
        expiring_30_days: valid_until.iter().filter(|d| **d <= in_30_days).count(),
        expiring_7_days: valid_until.iter().filter(|d| **d <= in_7_days).count(),
        categories,
    }
}

/// Loads the reports and computes the dashboard statistics
pub async fn dashboard_stats(
    store: &dyn Store,
    user: &User,
    now: DateTime<Utc>,
) -> Result<DashboardStats, ReportError> {
    let reports = store.list_reports().await?;

    Ok(compute_stats(user, &reports, now))
}

// Tests
