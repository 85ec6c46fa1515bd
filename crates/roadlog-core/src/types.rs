//! Custom types for common data structures and validation

use chrono::{DateTime as ChronoDateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::ops::Deref;
use utoipa::ToSchema;

/// Standard UTC DateTime type used across all Roadlog crates
///
/// This is the canonical datetime type for:
/// - API responses (serializes as ISO 8601)
/// - Database TIMESTAMPTZ columns such as `analytics_events.created_at`
///
/// # OpenAPI Schema
/// When using with utoipa, add the schema attribute:
/// ```rust,ignore
/// #[schema(value_type = String, format = DateTime)]
/// pub field: UtcDateTime,
/// ```
pub type UtcDateTime = ChronoDateTime<Utc>;

/// Parse an ISO 8601 timestamp as stored by the hosted backend.
///
/// Accepts RFC 3339 (`Z` or an explicit offset) and naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]`, which is taken as UTC.
pub fn parse_timestamp(value: &str) -> Option<UtcDateTime> {
    let value = value.trim();

    if let Ok(dt) = ChronoDateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| ChronoDateTime::<Utc>::from_naive_utc_and_offset(naive, Utc))
}

/// Wrapper type for DateTime<Utc> that parses ISO 8601 query parameters
/// Accepts:
/// - `2024-01-15T14:30:00` (naive datetime, assumes UTC)
/// - `2024-01-15T14:30:00Z` (UTC)
/// - `2024-01-15T14:30:00+00:00` (with timezone offset)
///
/// All formats are converted to DateTime<Utc>.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ToSchema)]
#[schema(value_type = String, example = "2024-01-15T14:30:00Z")]
pub struct DateTime(pub ChronoDateTime<Utc>);

impl<'de> Deserialize<'de> for DateTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = Deserialize::deserialize(deserializer)?;

        parse_timestamp(&s).map(DateTime).ok_or_else(|| {
            serde::de::Error::custom("Invalid datetime format. Use ISO 8601: YYYY-MM-DDTHH:MM:SSZ")
        })
    }
}

impl Serialize for DateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_rfc3339())
    }
}

impl Deref for DateTime {
    type Target = ChronoDateTime<Utc>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<ChronoDateTime<Utc>> for DateTime {
    fn from(dt: ChronoDateTime<Utc>) -> Self {
        DateTime(dt)
    }
}

impl From<DateTime> for ChronoDateTime<Utc> {
    fn from(dt: DateTime) -> Self {
        dt.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_timestamp_rfc3339_utc() {
        let dt = parse_timestamp("2024-01-15T14:30:00Z").unwrap();
        assert_eq!(dt.year(), 2024);
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_timestamp_converts_offset_to_utc() {
        // 16:30 at +02:00 is 14:30 UTC
        let dt = parse_timestamp("2024-01-15T16:30:00+02:00").unwrap();
        assert_eq!(dt.hour(), 14);
    }

    #[test]
    fn test_parse_timestamp_fractional_seconds() {
        let dt = parse_timestamp("2024-01-15T14:30:00.123456+00:00").unwrap();
        assert_eq!(dt.nanosecond(), 123_456_000);

        let naive = parse_timestamp("2024-01-15T14:30:00.5").unwrap();
        assert_eq!(naive.nanosecond(), 500_000_000);
    }

    #[test]
    fn test_parse_timestamp_naive_assumes_utc() {
        let dt = parse_timestamp("2024-01-15T14:30:00").unwrap();
        assert_eq!(dt.to_rfc3339(), "2024-01-15T14:30:00+00:00");
    }

    #[test]
    fn test_parse_timestamp_rejects_garbage() {
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_datetime_in_struct() {
        #[derive(Deserialize, Serialize)]
        struct Query {
            since: Option<DateTime>,
        }

        let query: Query = serde_json::from_str(r#"{"since":"2024-01-15T14:30:00"}"#).unwrap();
        assert!(query.since.is_some());

        let serialized = serde_json::to_string(&query).unwrap();
        assert_eq!(serialized, r#"{"since":"2024-01-15T14:30:00+00:00"}"#);
    }

    #[test]
    fn test_datetime_deserialize_invalid() {
        let result: Result<DateTime, _> = serde_json::from_str(r#""invalid-date""#);
        assert!(result.is_err());
    }
}
