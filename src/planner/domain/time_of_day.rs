//! Time-of-day parsing shared by serde and form input.

use super::PlannerDomainError;
use chrono::NaiveTime;

/// Parses `HH:MM` or `HH:MM:SS` into a time of day.
///
/// # Errors
///
/// Returns [`PlannerDomainError::InvalidTimeOfDay`] for any other shape.
pub fn parse_time_of_day(value: &str) -> Result<NaiveTime, PlannerDomainError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| PlannerDomainError::InvalidTimeOfDay(value.to_owned()))
}

/// Serde adapter for nullable time-of-day columns.
pub(crate) mod optional {
    use chrono::{NaiveTime, Timelike};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub(crate) fn serialize<S: Serializer>(
        value: &Option<NaiveTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) if time.second() == 0 => {
                serializer.serialize_str(&time.format("%H:%M").to_string())
            }
            Some(time) => serializer.serialize_str(&time.format("%H:%M:%S").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        raw.filter(|value| !value.trim().is_empty())
            .map(|value| super::parse_time_of_day(&value).map_err(D::Error::custom))
            .transpose()
    }
}
