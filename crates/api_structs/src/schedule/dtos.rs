use dosetrack_domain::{DoseSchedule, RecurrencePattern, TimeOfDay, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DoseScheduleDTO {
    pub id: ID,
    pub medicine_id: ID,
    pub time: TimeOfDay,
    pub recurrence: RecurrencePattern,
    pub notify_enabled: bool,
}

impl DoseScheduleDTO {
    pub fn new(schedule: DoseSchedule) -> Self {
        Self {
            id: schedule.id,
            medicine_id: schedule.medicine_id,
            time: schedule.time,
            recurrence: schedule.recurrence,
            notify_enabled: schedule.notify_enabled,
        }
    }
}

/// One dose time slot as submitted when creating or editing a medicine.
/// The time is parsed and the recurrence validated before anything is
/// written.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInput {
    pub time: String,
    pub recurrence: RecurrencePattern,
    #[serde(default = "default_notify_enabled")]
    pub notify_enabled: bool,
}

fn default_notify_enabled() -> bool {
    true
}
