// Report number generator
//
// Report numbers look like PK2025-ANK001: the UTC year, the city code
// and a counter scoped to that (year, city) pair, zero padded to 3 digits.
//
// The counter lives in the store and is advanced atomically, so
// concurrent creations for the same city never compute the same number.
// A fresh counter is seeded from the latest existing report with the
// same prefix, so numbering carries on over data created before the
// counter existed.

use chrono::{DateTime, Datelike, Utc};

use crate::store::Store;

use super::{find_city_code, SequenceError};

/// Width of the zero padded counter
pub const SEQUENCE_DIGITS: usize = 3;

/// Length of city codes
pub const CITY_CODE_LEN: usize = 3;

/// Resolves the code of a city
pub fn city_code(city: &str) -> Result<&'static str, SequenceError> {
    find_city_code(city).ok_or_else(|| SequenceError::UnknownCity(city.to_string()))
}

/// Builds the prefix scoping a sequence, PK{year}-{code}
pub fn report_prefix(year: i32, code: &str) -> String {
    format!("PK{}-{}", year, code)
}

/// Prefix of a full report number, PK{year}-{code}
pub fn number_prefix(number: &str) -> &str {
    number
        .find('-')
        .and_then(|dash| number.get(..dash + 1 + CITY_CODE_LEN))
        .unwrap_or(number)
}

/// Formats a full report number
pub fn format_report_number(prefix: &str, sequence: u64) -> String {
    format!("{}{:0width$}", prefix, sequence, width = SEQUENCE_DIGITS)
}

/// Extracts the counter value of a report number
///
/// # Arguments
///
/// * `number` - The full report number
/// * `prefix` - The prefix the number starts with
pub fn parse_sequence(number: &str, prefix: &str) -> Result<u64, SequenceError> {
    let suffix = number
        .strip_prefix(prefix)
        .ok_or_else(|| SequenceError::MalformedIdentifier(number.to_string()))?;

    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return Err(SequenceError::MalformedIdentifier(number.to_string()));
    }

    suffix
        .parse()
        .map_err(|_| SequenceError::MalformedIdentifier(number.to_string()))
}

/// Picks the number of the most recently created report with a prefix
///
/// Candidates are (report number, creation time in ms). When creation
/// times tie, the highest counter value wins. Numbers without the
/// prefix are ignored.
pub fn pick_latest_number<'a, I>(prefix: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = (&'a str, i64)>,
{
    candidates
        .into_iter()
        .filter(|(number, _)| number.starts_with(prefix))
        .max_by_key(|(number, created)| (*created, parse_sequence(number, prefix).ok()))
        .map(|(number, _)| number.to_string())
}

/// Generates the next report number for a city
///
/// # Arguments
///
/// * `store` - The store holding reports and counters
/// * `city` - Name of the city, as in the city table
/// * `now` - Current time, the UTC year scopes the sequence
pub async fn next_report_number(
    store: &dyn Store,
    city: &str,
    now: DateTime<Utc>,
) -> Result<String, SequenceError> {
    let code = city_code(city)?;
    let prefix = report_prefix(now.year(), code);

    let floor = match store.current_sequence(&prefix).await? {
        Some(_) => 0,
        None => match store.latest_report_number(&prefix).await? {
            Some(latest) => parse_sequence(&latest, &prefix)?,
            None => 0,
        },
    };

    let sequence = store.increment_sequence(&prefix, floor).await?;

    Ok(format_report_number(&prefix, sequence))
}

// Tests
