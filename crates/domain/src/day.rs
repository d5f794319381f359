use chrono::{prelude::*, LocalResult};
use chrono_tz::Tz;
use serde::{de::Visitor, Deserialize, Serialize};
use std::{fmt::Display, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvalidDateError {
    #[error("Date: {0} is malformed, expected format is YYYY-MM-DD")]
    Malformed(String),
}

pub fn is_leap_year(year: i32) -> bool {
    year % 400 == 0 || (year % 100 != 0 && year % 4 == 0)
}

// month: January -> 1
pub fn get_month_length(year: i32, month: u32) -> u32 {
    match month {
        1 => 31,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        3 => 31,
        4 => 30,
        5 => 31,
        6 => 30,
        7 => 31,
        8 => 31,
        9 => 30,
        10 => 31,
        11 => 30,
        12 => 31,
        _ => panic!("Invalid month"),
    }
}

/// A civil calendar date without any timezone attached to it.
/// Which instant it corresponds to is decided by the timezone
/// of the `DoseSchedule` it is evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Day {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl Day {
    pub fn new(year: i32, month: u32, day: u32) -> Self {
        Self { year, month, day }
    }

    /// The civil date of the given utc timestamp in millis, observed
    /// from the given timezone
    pub fn from_timestamp(timestamp_millis: i64, tz: &Tz) -> Self {
        let datetime = tz.timestamp_millis_opt(timestamp_millis).unwrap();
        Self {
            year: datetime.year(),
            month: datetime.month(),
            day: datetime.day(),
        }
    }

    pub fn inc(&mut self) {
        if self.day == get_month_length(self.year, self.month) {
            self.day = 1;
            if self.month == 12 {
                self.month = 1;
                self.year += 1;
            } else {
                self.month += 1;
            }
        } else {
            self.day += 1;
        }
    }

    pub fn add_days(&self, days: u32) -> Self {
        let mut day = *self;
        for _ in 0..days {
            day.inc();
        }
        day
    }

    pub fn weekday(&self) -> Weekday {
        self.naive().weekday()
    }

    pub fn naive(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).expect("Day holds a valid date")
    }

    pub fn year_month(&self) -> YearMonth {
        YearMonth {
            year: self.year,
            month: self.month,
        }
    }

    /// The utc timestamp in millis of this civil date at the given wall
    /// clock offset (millis after midnight) in the given timezone.
    /// Around DST transitions a skipped wall clock time resolves to one
    /// hour later and an ambiguous one to its earliest occurrence.
    pub fn timestamp_at(&self, millis_after_midnight: i64, tz: &Tz) -> i64 {
        let hours = (millis_after_midnight / (1000 * 60 * 60)) as u32;
        let minutes = ((millis_after_midnight / (1000 * 60)) % 60) as u32;
        match tz.with_ymd_and_hms(self.year, self.month, self.day, hours, minutes, 0) {
            LocalResult::Single(datetime) => datetime.timestamp_millis(),
            LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
            LocalResult::None => {
                // Wall clock time skipped by a DST transition
                match tz.with_ymd_and_hms(self.year, self.month, self.day, hours + 1, minutes, 0) {
                    LocalResult::Single(datetime) => datetime.timestamp_millis(),
                    LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
                    LocalResult::None => self
                        .naive()
                        .and_hms_opt(hours, minutes, 0)
                        .expect("valid wall clock time")
                        .and_utc()
                        .timestamp_millis(),
                }
            }
        }
    }
}

impl FromStr for Day {
    type Err = InvalidDateError;

    fn from_str(datestr: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidDateError::Malformed(datestr.to_string());
        let parts = datestr.split('-').collect::<Vec<_>>();
        if parts.len() != 3 {
            return Err(malformed());
        }
        let year = parts[0].parse::<i32>().map_err(|_| malformed())?;
        let month = parts[1].parse::<u32>().map_err(|_| malformed())?;
        let day = parts[2].parse::<u32>().map_err(|_| malformed())?;
        if !(1970..=2100).contains(&year) || !(1..=12).contains(&month) {
            return Err(malformed());
        }
        if day < 1 || day > get_month_length(year, month) {
            return Err(malformed());
        }
        Ok(Self { year, month, day })
    }
}

impl Display for Day {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl Serialize for Day {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Day {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct DayVisitor;

        impl<'de> Visitor<'de> for DayVisitor {
            type Value = Day;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                formatter.write_str("A date string on the format YYYY-MM-DD")
            }

            fn visit_str<E>(self, value: &str) -> Result<Day, E>
            where
                E: serde::de::Error,
            {
                value
                    .parse::<Day>()
                    .map_err(|_| E::custom(format!("Malformed date: {}", value)))
            }
        }

        deserializer.deserialize_str(DayVisitor)
    }
}

/// A calendar month, the period the month indicator cache is keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn first_day(&self) -> Day {
        Day {
            year: self.year,
            month: self.month,
            day: 1,
        }
    }

    pub fn last_day(&self) -> Day {
        Day {
            year: self.year,
            month: self.month,
            day: get_month_length(self.year, self.month),
        }
    }

    pub fn contains(&self, day: &Day) -> bool {
        day.year == self.year && day.month == self.month
    }
}

impl FromStr for YearMonth {
    type Err = InvalidDateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || InvalidDateError::Malformed(s.to_string());
        let parts = s.split('-').collect::<Vec<_>>();
        if parts.len() != 2 {
            return Err(malformed());
        }
        let year = parts[0].parse::<i32>().map_err(|_| malformed())?;
        let month = parts[1].parse::<u32>().map_err(|_| malformed())?;
        if !(1970..=2100).contains(&year) || !(1..=12).contains(&month) {
            return Err(malformed());
        }
        Ok(Self { year, month })
    }
}

impl Display for YearMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn day_sanity_tests() {
        let mut day = Day::new(2025, 1, 1);
        day.inc();
        assert_eq!(day, Day::new(2025, 1, 2));
        let mut day = Day::new(2025, 1, 31);
        day.inc();
        assert_eq!(day, Day::new(2025, 2, 1));
        let mut day = Day::new(2024, 12, 31);
        day.inc();
        assert_eq!(day, Day::new(2025, 1, 1));
        for _ in 0..365 {
            day.inc();
        }
        assert_eq!(day, Day::new(2026, 1, 1));
    }

    #[test]
    fn it_accepts_valid_dates() {
        let valid_dates = vec![
            "2018-1-1",
            "2025-12-31",
            "2020-1-12",
            "2020-2-29",
            "2020-02-2",
            "2020-02-02",
            "2020-2-09",
        ];

        for date in &valid_dates {
            assert!(date.parse::<Day>().is_ok());
        }
    }

    #[test]
    fn it_rejects_invalid_dates() {
        let invalid_dates = vec![
            "2018--1-1",
            "2020-1-32",
            "2020-2-30",
            "2021-2-29",
            "2020-0-1",
            "2020-1-0",
            "20-1-1",
        ];

        for date in &invalid_dates {
            assert!(date.parse::<Day>().is_err());
        }
    }

    #[test]
    fn it_formats_dates_zero_padded() {
        assert_eq!(Day::new(2025, 1, 3).to_string(), "2025-01-03");
        assert_eq!(Day::new(2025, 11, 30).to_string(), "2025-11-30");
    }

    #[test]
    fn it_orders_days_chronologically() {
        assert!(Day::new(2025, 1, 31) < Day::new(2025, 2, 1));
        assert!(Day::new(2024, 12, 31) < Day::new(2025, 1, 1));
        assert!(Day::new(2025, 3, 2) > Day::new(2025, 3, 1));
    }

    #[test]
    fn it_computes_civil_date_from_timestamp() {
        // 2025-01-01T23:30:00Z
        let ts = 1735774200000;
        assert_eq!(Day::from_timestamp(ts, &chrono_tz::UTC), Day::new(2025, 1, 1));
        // Tokyo is already on the next day
        assert_eq!(
            Day::from_timestamp(ts, &chrono_tz::Asia::Tokyo),
            Day::new(2025, 1, 2)
        );
    }

    #[test]
    fn it_computes_timestamp_for_wall_clock_time() {
        let day = Day::new(2025, 1, 1);
        let eight_am = 8 * 60 * 60 * 1000;
        assert_eq!(day.timestamp_at(eight_am, &chrono_tz::UTC), 1735718400000);
        // One hour earlier in utc when the zone is utc+1
        assert_eq!(
            day.timestamp_at(eight_am, &chrono_tz::Europe::Oslo),
            1735714800000
        );
    }

    #[test]
    fn year_month_bounds() {
        let ym = "2025-02".parse::<YearMonth>().unwrap();
        assert_eq!(ym.first_day(), Day::new(2025, 2, 1));
        assert_eq!(ym.last_day(), Day::new(2025, 2, 28));
        assert!(ym.contains(&Day::new(2025, 2, 14)));
        assert!(!ym.contains(&Day::new(2025, 3, 1)));
        assert_eq!(ym.to_string(), "2025-02");
        assert!("2025".parse::<YearMonth>().is_err());
        assert!("2025-13".parse::<YearMonth>().is_err());
    }
}
