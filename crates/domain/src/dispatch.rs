use crate::shared::entity::ID;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use thiserror::Error;

/// The two notification kinds a `DoseInstance` can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchKind {
    /// The dose time itself was reached
    OnTime,
    /// The grace period elapsed without an intake being logged
    Reminder,
}

impl DispatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnTime => "on_time",
            Self::Reminder => "reminder",
        }
    }
}

impl Display for DispatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("Invalid dispatch kind: {0}")]
pub struct InvalidDispatchKindError(String);

impl FromStr for DispatchKind {
    type Err = InvalidDispatchKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on_time" => Ok(Self::OnTime),
            "reminder" => Ok(Self::Reminder),
            _ => Err(InvalidDispatchKindError(s.to_string())),
        }
    }
}

/// One row in the dispatch log. The storage layer enforces uniqueness on
/// `(instance_id, kind)`, which is what bounds every instance to at most
/// one notification of each kind across overlapping scan cycles.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRecord {
    pub instance_id: ID,
    pub kind: DispatchKind,
    pub dispatched_at: i64,
}
