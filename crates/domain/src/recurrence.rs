use crate::day::Day;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How often doses of a `DoseSchedule` recur. Weekdays are numbered
/// 0=Sunday .. 6=Saturday, month days 1..=31. A month day that does not
/// exist in a given month (e.g. 30 in February) is simply never due that
/// month.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum RecurrenceRule {
    Daily,
    Weekly {
        #[serde(rename = "daysOfWeek")]
        days_of_week: Vec<u32>,
    },
    Monthly {
        #[serde(rename = "daysOfMonth")]
        days_of_month: Vec<u32>,
    },
}

#[derive(Error, Debug, PartialEq)]
pub enum InvalidRecurrenceError {
    #[error("A weekly recurrence requires at least one weekday")]
    EmptyWeekdaySet,
    #[error("A monthly recurrence requires at least one day of month")]
    EmptyMonthDaySet,
    #[error("Invalid weekday: {0}, expected a number in 0..=6")]
    InvalidWeekday(u32),
    #[error("Invalid day of month: {0}, expected a number in 1..=31")]
    InvalidMonthDay(u32),
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct RecurrencePattern {
    #[serde(flatten)]
    pub rule: RecurrenceRule,
    pub timezone: Tz,
}

impl RecurrencePattern {
    pub fn validate(&self) -> Result<(), InvalidRecurrenceError> {
        match &self.rule {
            RecurrenceRule::Daily => Ok(()),
            RecurrenceRule::Weekly { days_of_week } => {
                if days_of_week.is_empty() {
                    return Err(InvalidRecurrenceError::EmptyWeekdaySet);
                }
                match days_of_week.iter().find(|d| **d > 6) {
                    Some(d) => Err(InvalidRecurrenceError::InvalidWeekday(*d)),
                    None => Ok(()),
                }
            }
            RecurrenceRule::Monthly { days_of_month } => {
                if days_of_month.is_empty() {
                    return Err(InvalidRecurrenceError::EmptyMonthDaySet);
                }
                match days_of_month.iter().find(|d| !(1..=31).contains(*d)) {
                    Some(d) => Err(InvalidRecurrenceError::InvalidMonthDay(*d)),
                    None => Ok(()),
                }
            }
        }
    }

    /// Whether the given civil date is a due date for this pattern.
    /// Pure, callable for arbitrary past and future dates.
    pub fn is_due(&self, day: &Day) -> bool {
        match &self.rule {
            RecurrenceRule::Daily => true,
            RecurrenceRule::Weekly { days_of_week } => {
                let weekday = day.weekday().num_days_from_sunday();
                days_of_week.contains(&weekday)
            }
            RecurrenceRule::Monthly { days_of_month } => days_of_month.contains(&day.day),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono_tz::UTC;

    fn pattern(rule: RecurrenceRule) -> RecurrencePattern {
        RecurrencePattern { rule, timezone: UTC }
    }

    #[test]
    fn daily_is_always_due() {
        let pattern = pattern(RecurrenceRule::Daily);
        let mut day = Day::new(2025, 1, 1);
        for _ in 0..60 {
            assert!(pattern.is_due(&day));
            day.inc();
        }
    }

    #[test]
    fn weekly_is_due_on_configured_weekdays() {
        // Monday and Wednesday
        let pattern = pattern(RecurrenceRule::Weekly {
            days_of_week: vec![1, 3],
        });

        let mut day = Day::new(2025, 1, 1);
        for _ in 0..60 {
            let weekday = day.weekday().num_days_from_sunday();
            assert_eq!(pattern.is_due(&day), weekday == 1 || weekday == 3);
            day.inc();
        }
    }

    #[test]
    fn monthly_skips_months_without_the_configured_day() {
        let pattern = pattern(RecurrenceRule::Monthly {
            days_of_month: vec![30],
        });

        assert!(pattern.is_due(&Day::new(2025, 1, 30)));
        assert!(!pattern.is_due(&Day::new(2025, 1, 29)));
        // February 2025 has no day 30, so no due date that month at all
        let mut day = Day::new(2025, 2, 1);
        for _ in 0..28 {
            assert!(!pattern.is_due(&day));
            day.inc();
        }
    }

    #[test]
    fn it_validates_day_sets() {
        assert!(pattern(RecurrenceRule::Daily).validate().is_ok());
        assert_eq!(
            pattern(RecurrenceRule::Weekly {
                days_of_week: vec![]
            })
            .validate(),
            Err(InvalidRecurrenceError::EmptyWeekdaySet)
        );
        assert_eq!(
            pattern(RecurrenceRule::Weekly {
                days_of_week: vec![0, 7]
            })
            .validate(),
            Err(InvalidRecurrenceError::InvalidWeekday(7))
        );
        assert_eq!(
            pattern(RecurrenceRule::Monthly {
                days_of_month: vec![]
            })
            .validate(),
            Err(InvalidRecurrenceError::EmptyMonthDaySet)
        );
        assert_eq!(
            pattern(RecurrenceRule::Monthly {
                days_of_month: vec![1, 32]
            })
            .validate(),
            Err(InvalidRecurrenceError::InvalidMonthDay(32))
        );
    }

    #[test]
    fn it_deserializes_tagged_patterns() {
        let weekly: RecurrencePattern = serde_json::from_str(
            r#"{"type":"WEEKLY","daysOfWeek":[1,3],"timezone":"Europe/Oslo"}"#,
        )
        .unwrap();
        assert_eq!(
            weekly.rule,
            RecurrenceRule::Weekly {
                days_of_week: vec![1, 3]
            }
        );
        assert_eq!(weekly.timezone, chrono_tz::Europe::Oslo);

        let daily: RecurrencePattern =
            serde_json::from_str(r#"{"type":"DAILY","timezone":"UTC"}"#).unwrap();
        assert_eq!(daily.rule, RecurrenceRule::Daily);

        assert!(serde_json::from_str::<RecurrencePattern>(
            r#"{"type":"HOURLY","timezone":"UTC"}"#
        )
        .is_err());
    }
}
