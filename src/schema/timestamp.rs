//! Timestamp and date helpers for serde.
//!
//! Upstream returns bare dates and full timestamps for the same logical field.
//! Date-only strings (`YYYY-MM-DD`) are widened to midnight before parsing.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serializer};

/// Output format for timestamps. The fractional part is only printed when non-zero.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Append `T00:00:00` to a date-only string; anything else is returned as is.
pub fn widen(raw: &str) -> Cow<'_, str> {
    if raw.len() == 10 && raw.matches('-').count() == 2 {
        Cow::Owned(format!("{raw}T00:00:00"))
    } else {
        Cow::Borrowed(raw)
    }
}

pub fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, String> {
    let widened = widen(raw.trim());
    widened
        .parse::<NaiveDateTime>()
        .or_else(|_| DateTime::parse_from_rfc3339(&widened).map(|dt| dt.naive_utc()))
        .map_err(|e| format!("invalid timestamp {raw:?}: {e}"))
}

/// Accepts a bare date or a timestamp; a timestamp is truncated to its date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| parse_timestamp(raw).map(|ts| ts.date()))
        .map_err(|e| format!("invalid date {raw:?}: {e}"))
}

pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(serde::de::Error::custom)
}

/// `Option<NaiveDateTime>` fields. Use with `#[serde(default, with = "timestamp::option")]`.
pub mod option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => super::serialize(ts, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse_timestamp(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// `Option<NaiveDate>` fields that may arrive as timestamps.
pub mod date_option {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.collect_str(&date.format(DATE_FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse_date(&raw).map_err(serde::de::Error::custom))
            .transpose()
    }
}

/// `Option<Vec<NaiveDate>>` fields.
pub mod date_list_option {
    use super::*;
    use serde::ser::SerializeSeq;

    pub fn serialize<S: Serializer>(
        value: &Option<Vec<NaiveDate>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dates) => {
                let mut seq = serializer.serialize_seq(Some(dates.len()))?;
                for date in dates {
                    seq.serialize_element(&date.format(DATE_FORMAT).to_string())?;
                }
                seq.end()
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<NaiveDate>>, D::Error> {
        Option::<Vec<String>>::deserialize(deserializer)?
            .map(|raw| {
                raw.iter()
                    .map(|d| parse_date(d).map_err(serde::de::Error::custom))
                    .collect()
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_only_is_widened() {
        assert_eq!(widen("2024-03-05"), "2024-03-05T00:00:00");
        assert_eq!(
            parse_timestamp("2024-03-05").unwrap(),
            parse_timestamp("2024-03-05T00:00:00").unwrap()
        );
    }

    #[test]
    fn test_full_timestamp_is_untouched() {
        assert_eq!(widen("2024-03-05T14:30:00"), "2024-03-05T14:30:00");
        let ts = parse_timestamp("2024-03-05T14:30:00").unwrap();
        assert_eq!(ts.format(TIMESTAMP_FORMAT).to_string(), "2024-03-05T14:30:00");
    }

    #[test]
    fn test_fractional_and_offset_timestamps() {
        let ts = parse_timestamp("2024-03-05T14:30:00.250").unwrap();
        assert_eq!(ts.format(TIMESTAMP_FORMAT).to_string(), "2024-03-05T14:30:00.250");

        let utc = parse_timestamp("2024-03-05T14:30:00+01:00").unwrap();
        assert_eq!(utc.format(TIMESTAMP_FORMAT).to_string(), "2024-03-05T13:30:00");
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_date("05/03/2024").is_err());
    }

    #[test]
    fn test_date_accepts_midnight_timestamp() {
        let date = parse_date("2023-11-02T00:00:00").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2023, 11, 2).unwrap());
    }
}
