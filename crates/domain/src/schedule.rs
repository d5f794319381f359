use crate::{
    recurrence::RecurrencePattern,
    shared::entity::{Entity, ID},
};
use serde::{de::Visitor, Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

/// A wall clock dose time with minute granularity, restricted to
/// 5 minute increments at input
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay {
    hours: u32,
    minutes: u32,
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidTimeOfDayError {
    #[error("Time: {0} is malformed, expected format is HH:MM")]
    Malformed(String),
    #[error("Time: {0}:{1} is out of range")]
    OutOfRange(u32, u32),
    #[error("Time minutes: {0} must be a multiple of 5")]
    NotFiveMinuteAligned(u32),
}

impl TimeOfDay {
    pub fn new(hours: u32, minutes: u32) -> Result<Self, InvalidTimeOfDayError> {
        if hours > 23 || minutes > 59 {
            return Err(InvalidTimeOfDayError::OutOfRange(hours, minutes));
        }
        if minutes % 5 != 0 {
            return Err(InvalidTimeOfDayError::NotFiveMinuteAligned(minutes));
        }
        Ok(Self { hours, minutes })
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }

    /// Millis after midnight on the owning civil date
    pub fn millis_after_midnight(&self) -> i64 {
        (self.hours as i64 * 60 + self.minutes as i64) * 60 * 1000
    }
}

impl FromStr for TimeOfDay {
    type Err = InvalidTimeOfDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidTimeOfDayError::Malformed(s.to_string());
        let parts = s.split(':').collect::<Vec<_>>();
        if parts.len() != 2 {
            return Err(malformed());
        }
        let hours = parts[0].parse::<u32>().map_err(|_| malformed())?;
        let minutes = parts[1].parse::<u32>().map_err(|_| malformed())?;
        Self::new(hours, minutes)
    }
}

impl Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct TimeOfDayVisitor;

        impl<'de> Visitor<'de> for TimeOfDayVisitor {
            type Value = TimeOfDay;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A time string on the format HH:MM")
            }

            fn visit_str<E>(self, value: &str) -> Result<TimeOfDay, E>
            where
                E: serde::de::Error,
            {
                value
                    .parse::<TimeOfDay>()
                    .map_err(|e| E::custom(format!("{}", e)))
            }
        }

        deserializer.deserialize_str(TimeOfDayVisitor)
    }
}

/// One recurring dose time slot for a `Medicine`. On medicine edits the
/// previous schedules are soft deleted and replaced by entirely new rows,
/// so instance generation always runs against fresh schedule ids.
#[derive(Debug, Clone)]
pub struct DoseSchedule {
    pub id: ID,
    pub medicine_id: ID,
    pub user_id: ID,
    pub time: TimeOfDay,
    pub recurrence: RecurrencePattern,
    pub notify_enabled: bool,
    pub deleted_at: Option<i64>,
}

impl DoseSchedule {
    pub fn new(
        medicine_id: ID,
        user_id: ID,
        time: TimeOfDay,
        recurrence: RecurrencePattern,
        notify_enabled: bool,
    ) -> Self {
        Self {
            id: Default::default(),
            medicine_id,
            user_id,
            time,
            recurrence,
            notify_enabled,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

impl Entity for DoseSchedule {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_parses_valid_times() {
        assert_eq!("08:00".parse::<TimeOfDay>(), TimeOfDay::new(8, 0));
        assert_eq!("23:55".parse::<TimeOfDay>(), TimeOfDay::new(23, 55));
        assert_eq!("0:05".parse::<TimeOfDay>(), TimeOfDay::new(0, 5));
    }

    #[test]
    fn it_rejects_malformed_times() {
        assert!("8".parse::<TimeOfDay>().is_err());
        assert!("08:00:00".parse::<TimeOfDay>().is_err());
        assert!("ab:cd".parse::<TimeOfDay>().is_err());
        assert_eq!(
            "24:00".parse::<TimeOfDay>(),
            Err(InvalidTimeOfDayError::OutOfRange(24, 0))
        );
        assert_eq!(
            "08:03".parse::<TimeOfDay>(),
            Err(InvalidTimeOfDayError::NotFiveMinuteAligned(3))
        );
    }

    #[test]
    fn it_formats_times_zero_padded() {
        assert_eq!(TimeOfDay::new(8, 5).unwrap().to_string(), "08:05");
        assert_eq!(TimeOfDay::new(22, 30).unwrap().to_string(), "22:30");
    }

    #[test]
    fn it_orders_times_within_the_day() {
        assert!(TimeOfDay::new(8, 0).unwrap() < TimeOfDay::new(8, 30).unwrap());
        assert!(TimeOfDay::new(9, 0).unwrap() > TimeOfDay::new(8, 55).unwrap());
    }

    #[test]
    fn it_computes_millis_after_midnight() {
        assert_eq!(TimeOfDay::new(0, 0).unwrap().millis_after_midnight(), 0);
        assert_eq!(
            TimeOfDay::new(9, 30).unwrap().millis_after_midnight(),
            (9 * 60 + 30) * 60 * 1000
        );
    }
}
