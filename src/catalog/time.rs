use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};

use super::ValueError;
use crate::registry::TypeInfo;
use crate::value::Value;

pub fn parse_duration(raw: &str) -> Result<Duration, ValueError> {
    humantime::parse_duration(raw).map_err(|source| ValueError::Duration {
        raw: raw.to_string(),
        source,
    })
}

/// RFC 3339 first, then whole Unix seconds.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, ValueError> {
    if let Ok(t) = DateTime::parse_from_rfc3339(raw) {
        return Ok(t.with_timezone(&Utc));
    }
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .ok_or_else(|| ValueError::Timestamp(raw.to_string()))
}

impl Value for Duration {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<Duration>("Duration")
    }

    fn is_zero(&self) -> bool {
        Duration::is_zero(self)
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::String(humantime::format_duration(*self).to_string())
    }
}

impl Value for DateTime<Utc> {
    fn type_info() -> TypeInfo {
        TypeInfo::opaque::<DateTime<Utc>>("DateTime<Utc>")
    }

    /// The Unix epoch plays the role of the unset timestamp.
    fn is_zero(&self) -> bool {
        *self == DateTime::<Utc>::default()
    }

    fn snapshot(&self) -> serde_json::Value {
        serde_json::Value::String(self.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Registry;

    #[test]
    fn durations() {
        assert_eq!(parse_duration("5m30s").unwrap(), Duration::from_secs(330));
        assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
        assert!(parse_duration("invalid").is_err());
    }

    #[test]
    fn rfc3339_timestamp() {
        let t = parse_timestamp("2023-12-25T15:04:05Z").unwrap();
        assert_eq!(t.timestamp(), 1_703_516_645);
    }

    #[test]
    fn rfc3339_offset_is_normalized_to_utc() {
        let t = parse_timestamp("2023-12-25T17:04:05+02:00").unwrap();
        assert_eq!(t.timestamp(), 1_703_516_645);
    }

    #[test]
    fn unix_seconds_fallback() {
        let t = parse_timestamp("1703516645").unwrap();
        assert_eq!(t.to_rfc3339_opts(SecondsFormat::Secs, true), "2023-12-25T15:04:05Z");
    }

    #[test]
    fn invalid_timestamp_names_both_forms() {
        let err = parse_timestamp("invalid-time").unwrap_err();
        assert!(err.to_string().contains("RFC 3339 or Unix seconds"));
    }

    #[test]
    fn duration_list_through_registry() {
        let registry = Registry::new();
        let mut list: Vec<Duration> = Vec::new();
        list.assign("1s, 2m ,3h", &registry).unwrap();
        assert_eq!(
            list,
            vec![
                Duration::from_secs(1),
                Duration::from_secs(120),
                Duration::from_secs(10_800)
            ]
        );
    }

    #[test]
    fn optional_timestamp_through_registry() {
        let registry = Registry::new();
        let t: Option<DateTime<Utc>> = registry.dispatch("0").unwrap();
        assert!(t.unwrap().is_zero());
    }

    #[test]
    fn snapshots_are_readable() {
        assert_eq!(Duration::from_secs(90).snapshot(), "1m 30s");
        let t = parse_timestamp("2023-12-25T15:04:05Z").unwrap();
        assert_eq!(t.snapshot(), "2023-12-25T15:04:05Z");
    }
}
