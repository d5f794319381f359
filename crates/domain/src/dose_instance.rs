use crate::{
    day::Day,
    schedule::{DoseSchedule, TimeOfDay},
    shared::entity::{Entity, ID},
};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// How long after its due time a scheduled dose stays actionable before
/// it counts as missed
pub const INTAKE_GRACE_PERIOD_MILLIS: i64 = 30 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntakeStatus {
    Scheduled,
    Taken,
    Skipped,
    Missed,
}

impl IntakeStatus {
    /// Calendar display severity, worst outcome first
    pub fn severity(&self) -> u8 {
        match self {
            Self::Missed => 4,
            Self::Skipped => 3,
            Self::Taken => 2,
            Self::Scheduled => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Taken => "taken",
            Self::Skipped => "skipped",
            Self::Missed => "missed",
        }
    }
}

impl Display for IntakeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("Invalid intake status: {0}")]
pub struct InvalidIntakeStatusError(String);

impl FromStr for IntakeStatus {
    type Err = InvalidIntakeStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(Self::Scheduled),
            "taken" => Ok(Self::Taken),
            "skipped" => Ok(Self::Skipped),
            "missed" => Ok(Self::Missed),
            _ => Err(InvalidIntakeStatusError(s.to_string())),
        }
    }
}

/// Which actor produced the last status transition. Rows that have never
/// been touched by the user keep `Auto`; any manual transition, including
/// an undo, flips it to `Manual` and thereby opts the row out of automatic
/// missed promotion for the rest of its due window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusSource {
    Manual,
    Auto,
}

impl Display for StatusSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

#[derive(Error, Debug)]
#[error("Invalid status source: {0}")]
pub struct InvalidStatusSourceError(String);

impl FromStr for StatusSource {
    type Err = InvalidStatusSourceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "auto" => Ok(Self::Auto),
            _ => Err(InvalidStatusSourceError(s.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Intake status can not go from {from} to {to}")]
pub struct InvalidStatusTransition {
    pub from: IntakeStatus,
    pub to: IntakeStatus,
}

/// One concrete expected dose, the unit the status lifecycle and the
/// notification dispatch operate on. Exactly one instance exists per
/// `(schedule_id, date)` pair within the maintained window.
#[derive(Debug, Clone)]
pub struct DoseInstance {
    pub id: ID,
    pub schedule_id: ID,
    pub medicine_id: ID,
    pub user_id: ID,
    pub date: Day,
    pub time: TimeOfDay,
    pub status: IntakeStatus,
    pub source: StatusSource,
    pub checked_at: Option<i64>,
    pub deleted_at: Option<i64>,
}

impl DoseInstance {
    pub fn new(schedule: &DoseSchedule, date: Day) -> Self {
        Self {
            id: Default::default(),
            schedule_id: schedule.id.clone(),
            medicine_id: schedule.medicine_id.clone(),
            user_id: schedule.user_id.clone(),
            date,
            time: schedule.time,
            status: IntakeStatus::Scheduled,
            source: StatusSource::Auto,
            checked_at: None,
            deleted_at: None,
        }
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// The utc timestamp in millis at which this dose is due in the
    /// given timezone
    pub fn due_at(&self, tz: &Tz) -> i64 {
        self.date.timestamp_at(self.time.millis_after_midnight(), tz)
    }

    /// Due time plus the grace period. Past this instant an untouched
    /// scheduled dose counts as missed.
    pub fn deadline_at(&self, tz: &Tz) -> i64 {
        self.due_at(tz) + INTAKE_GRACE_PERIOD_MILLIS
    }

    /// Whether the automatic missed promotion applies to this row at
    /// `now`. Only untouched rows qualify, so an undone dose is not
    /// promoted again within the same due window.
    pub fn is_promotable(&self, now: i64, tz: &Tz) -> bool {
        self.status == IntakeStatus::Scheduled
            && self.source == StatusSource::Auto
            && now > self.deadline_at(tz)
    }

    /// The status a reader should present at `now`. Missed promotion is
    /// derived lazily here with the same grace rule the dispatch scan
    /// uses when it persists the promotion.
    pub fn status_at(&self, now: i64, tz: &Tz) -> IntakeStatus {
        if self.is_promotable(now, tz) {
            IntakeStatus::Missed
        } else {
            self.status
        }
    }

    /// A user driven transition. Legal moves are scheduled|missed ->
    /// taken|skipped and taken|skipped|missed -> scheduled (undo, which
    /// clears `checked_at`). Everything else, including any manual move
    /// to missed, is rejected.
    pub fn mark(
        &mut self,
        to: IntakeStatus,
        checked_at: i64,
    ) -> Result<(), InvalidStatusTransition> {
        use IntakeStatus::*;

        match (self.status, to) {
            (Scheduled | Missed, Taken) | (Scheduled | Missed, Skipped) => {
                self.status = to;
                self.source = StatusSource::Manual;
                self.checked_at = Some(checked_at);
                Ok(())
            }
            (Taken | Skipped | Missed, Scheduled) => {
                self.status = Scheduled;
                self.source = StatusSource::Manual;
                self.checked_at = None;
                Ok(())
            }
            (from, to) => Err(InvalidStatusTransition { from, to }),
        }
    }

    /// The automatic scheduled -> missed transition, persisted by the
    /// dispatch scan once the deadline has passed
    pub fn promote_missed(&mut self, now: i64, tz: &Tz) -> Result<(), InvalidStatusTransition> {
        if !self.is_promotable(now, tz) {
            return Err(InvalidStatusTransition {
                from: self.status,
                to: IntakeStatus::Missed,
            });
        }
        self.status = IntakeStatus::Missed;
        self.source = StatusSource::Auto;
        Ok(())
    }
}

impl Entity for DoseInstance {
    fn id(&self) -> &ID {
        &self.id
    }
}
