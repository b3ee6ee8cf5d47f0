//! Serde adapters for the loosely formatted values the backend exchanges.

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serializer, de};

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];

/// Parses a local timestamp with or without seconds.
pub fn parse_local_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Parses a wall-clock time with or without seconds.
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(value, format).ok())
}

/// `NaiveDateTime` as `YYYY-MM-DDTHH:MM:SS`, accepting minute precision on input.
pub mod local_datetime {
    use super::{Deserialize, Deserializer, NaiveDateTime, Serializer, de, parse_local_datetime};

    /// Writes seconds precision.
    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format("%Y-%m-%dT%H:%M:%S"))
    }

    /// Accepts minute or second precision.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_local_datetime(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid local datetime '{raw}'")))
    }
}

/// `NaiveTime` as `HH:MM`, accepting seconds on input.
pub mod clock_time {
    use super::{Deserialize, Deserializer, NaiveTime, Serializer, de, parse_clock_time};

    /// Writes `HH:MM`.
    pub fn serialize<S>(value: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format("%H:%M"))
    }

    /// Accepts `HH:MM` or `HH:MM:SS`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_clock_time(&raw).ok_or_else(|| de::Error::custom(format!("invalid time '{raw}'")))
    }
}

/// A list that the backend may send either as a JSON array or as a
/// comma-separated string (amenities are stored joined server-side).
pub mod comma_list {
    use super::{Deserialize, Deserializer};
    use serde::Serializer;
    use serde::ser::SerializeSeq;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        List(Vec<String>),
        Joined(String),
        #[allow(dead_code)]
        Missing(Option<()>),
    }

    /// Always writes a JSON array.
    pub fn serialize<S>(value: &[String], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(value.len()))?;
        for item in value {
            seq.serialize_element(item)?;
        }
        seq.end()
    }

    /// Accepts an array, a comma-joined string, or nothing. Blank items are dropped.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = match Raw::deserialize(deserializer)? {
            Raw::List(items) => items,
            Raw::Joined(joined) => joined.split(',').map(str::to_string).collect(),
            Raw::Missing(_) => Vec::new(),
        };
        Ok(items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect())
    }
}
