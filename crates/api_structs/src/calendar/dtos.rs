use dosetrack_domain::{DayDot, IntakeStatus, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DayDotDTO {
    pub medicine_id: ID,
    pub label: String,
    pub status: IntakeStatus,
}

impl DayDotDTO {
    pub fn new(dot: DayDot) -> Self {
        Self {
            medicine_id: dot.medicine_id,
            label: dot.label,
            status: dot.status,
        }
    }
}
