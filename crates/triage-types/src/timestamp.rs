//! Lenient timestamp values.
//!
//! Dates arrive from the backend as strings in a handful of shapes, and some
//! of them are simply wrong. A [`Timestamp`] keeps the raw text it was built
//! from together with the parsed instant, if any. Deserialising never fails
//! on a malformed date: the value is kept as *invalid*, sorts as absent and
//! displays as `"Invalid Date"`.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use std::fmt;

/// Placeholder shown wherever an unparseable date would be displayed.
pub const INVALID_DATE: &str = "Invalid Date";

/// A date value that may or may not have parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timestamp {
    raw: String,
    parsed: Option<DateTime<Utc>>,
}

impl Timestamp {
    /// Parses `raw` leniently.
    ///
    /// Accepted shapes, in order:
    /// - RFC 3339 (`2024-03-01T09:30:00Z`, `2024-03-01T09:30:00.000+01:00`)
    /// - naive date-time (`2024-03-01T09:30:00`, `2024-03-01 09:30:00.250`), taken as UTC
    /// - bare date (`2024-03-01`), taken as midnight UTC
    /// - integer epoch milliseconds (`1709285400000`)
    ///
    /// Anything else produces an invalid timestamp rather than an error.
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = parse_instant(raw.trim());
        Self { raw, parsed }
    }

    pub fn from_datetime(instant: DateTime<Utc>) -> Self {
        Self {
            raw: instant.to_rfc3339_opts(SecondsFormat::Millis, true),
            parsed: Some(instant),
        }
    }

    pub fn from_millis(millis: i64) -> Self {
        Self {
            raw: millis.to_string(),
            parsed: DateTime::<Utc>::from_timestamp_millis(millis),
        }
    }

    fn invalid(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            parsed: None,
        }
    }

    /// The parsed instant, or `None` if the raw text was not a date.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        self.parsed
    }

    pub fn is_valid(&self) -> bool {
        self.parsed.is_some()
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Short `M/D/YYYY` rendering, or [`INVALID_DATE`].
    pub fn format_date(&self) -> String {
        match self.parsed {
            Some(instant) => instant.format("%-m/%-d/%Y").to_string(),
            None => INVALID_DATE.to_string(),
        }
    }
}

/// Display helper for optional dates: empty when absent.
pub fn format_optional_date(value: Option<&Timestamp>) -> String {
    value.map(Timestamp::format_date).unwrap_or_default()
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, pattern) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.parsed {
            Some(instant) => write!(f, "{}", instant.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => f.write_str(INVALID_DATE),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::from_datetime(instant)
    }
}

impl serde::Serialize for Timestamp {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> serde::Deserialize<'de> for Timestamp {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::{IgnoredAny, Visitor};

        struct TimestampVisitor;

        impl<'de> Visitor<'de> for TimestampVisitor {
            type Value = Timestamp;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a date string or epoch milliseconds")
            }

            fn visit_str<E: serde::de::Error>(self, v: &str) -> Result<Timestamp, E> {
                Ok(Timestamp::parse(v))
            }

            fn visit_string<E: serde::de::Error>(self, v: String) -> Result<Timestamp, E> {
                Ok(Timestamp::parse(v))
            }

            fn visit_i64<E: serde::de::Error>(self, v: i64) -> Result<Timestamp, E> {
                Ok(Timestamp::from_millis(v))
            }

            fn visit_u64<E: serde::de::Error>(self, v: u64) -> Result<Timestamp, E> {
                match i64::try_from(v) {
                    Ok(millis) => Ok(Timestamp::from_millis(millis)),
                    Err(_) => Ok(Timestamp::invalid(v.to_string())),
                }
            }

            fn visit_f64<E: serde::de::Error>(self, v: f64) -> Result<Timestamp, E> {
                if v.is_finite() {
                    Ok(Timestamp::from_millis(v.trunc() as i64))
                } else {
                    Ok(Timestamp::invalid(v.to_string()))
                }
            }

            fn visit_bool<E: serde::de::Error>(self, v: bool) -> Result<Timestamp, E> {
                Ok(Timestamp::invalid(v.to_string()))
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Timestamp, E> {
                Ok(Timestamp::invalid("null"))
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(self, seq: A) -> Result<Timestamp, A::Error> {
                IgnoredAny.visit_seq(seq)?;
                Ok(Timestamp::invalid("[array]"))
            }

            fn visit_map<A: serde::de::MapAccess<'de>>(self, map: A) -> Result<Timestamp, A::Error> {
                IgnoredAny.visit_map(map)?;
                Ok(Timestamp::invalid("[object]"))
            }
        }

        deserializer.deserialize_any(TimestampVisitor)
    }
}
