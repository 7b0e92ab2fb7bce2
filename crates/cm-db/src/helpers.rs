//! Column decoding shared by the repositories.
//!
//! Timestamps arrive either from `datetime('now')` defaults or from
//! `to_rfc3339()` writes, so both shapes are accepted.

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::DatabaseError;

/// Timestamp column: RFC 3339 or `YYYY-MM-DD HH:MM:SS`, read as UTC.
///
/// # Errors
///
/// `DatabaseError::Query` when neither shape matches.
pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, DatabaseError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| DatabaseError::Query(format!("bad timestamp '{s}': {e}")))
}

/// Parse a `YYYY-MM-DD` TEXT column.
///
/// # Errors
///
/// Returns `DatabaseError::Query` for anything that is not an ISO date.
pub fn parse_date(s: &str) -> Result<NaiveDate, DatabaseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| DatabaseError::Query(format!("bad date '{s}': {e}")))
}

/// Decode a stored snake_case key into a cm-core enum.
///
/// # Errors
///
/// `DatabaseError::Query` for a key no variant uses.
pub fn parse_enum<T: serde::de::DeserializeOwned>(s: &str) -> Result<T, DatabaseError> {
    serde_json::from_value(serde_json::Value::String(s.to_string()))
        .map_err(|e| DatabaseError::Query(format!("unknown stored key '{s}': {e}")))
}

/// Parse an optional TEXT column into an enum.
///
/// # Errors
///
/// Returns `DatabaseError::Query` if a present value matches no variant.
pub fn parse_opt_enum<T: serde::de::DeserializeOwned>(
    s: Option<&str>,
) -> Result<Option<T>, DatabaseError> {
    s.map(parse_enum).transpose()
}

/// Nullable TEXT column; an empty string reads as `None` too.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_string(row: &libsql::Row, idx: i32) -> Result<Option<String>, DatabaseError> {
    match row.get::<Option<String>>(idx)? {
        Some(s) if s.is_empty() => Ok(None),
        other => Ok(other),
    }
}

/// Read a nullable REAL column.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_opt_f64(row: &libsql::Row, idx: i32) -> Result<Option<f64>, DatabaseError> {
    Ok(row.get::<Option<f64>>(idx)?)
}

/// Read a 0/1 INTEGER column as `bool`.
///
/// # Errors
///
/// Returns `DatabaseError` if the column read fails.
pub fn get_bool(row: &libsql::Row, idx: i32) -> Result<bool, DatabaseError> {
    Ok(row.get::<i64>(idx)? != 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cm_core::enums::TransactionType;

    #[test]
    fn parses_both_datetime_formats() {
        let a = parse_datetime("2026-02-09T14:30:00+00:00").unwrap();
        let b = parse_datetime("2026-02-09 14:30:00").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_bad_date() {
        assert!(parse_date("09/02/2026").is_err());
        assert_eq!(
            parse_date("2026-02-09").unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 9).unwrap()
        );
    }

    #[test]
    fn parses_snake_case_enum() {
        let t: TransactionType = parse_enum("purchased").unwrap();
        assert_eq!(t, TransactionType::Purchased);
        assert!(parse_enum::<TransactionType>("bought").is_err());
    }
}
