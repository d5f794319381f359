use dosetrack_domain::{Day, DoseInstance, IntakeStatus, StatusSource, TimeOfDay, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DoseInstanceDTO {
    pub id: ID,
    pub schedule_id: ID,
    pub medicine_id: ID,
    pub medicine_name: String,
    pub date: Day,
    pub time: TimeOfDay,
    pub status: IntakeStatus,
    pub source: StatusSource,
    pub checked_at: Option<i64>,
}

impl DoseInstanceDTO {
    /// `status` is passed separately so callers can present the lazily
    /// derived status instead of the raw stored one
    pub fn new(instance: DoseInstance, medicine_name: String, status: IntakeStatus) -> Self {
        Self {
            id: instance.id,
            schedule_id: instance.schedule_id,
            medicine_id: instance.medicine_id,
            medicine_name,
            date: instance.date,
            time: instance.time,
            status,
            source: instance.source,
            checked_at: instance.checked_at,
        }
    }
}
