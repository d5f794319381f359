use crate::schedule::dtos::DoseScheduleDTO;
use dosetrack_domain::{DoseSchedule, Medicine, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct MedicineDTO {
    pub id: ID,
    pub name: String,
    pub notes: Option<String>,
    pub schedules: Vec<DoseScheduleDTO>,
}

impl MedicineDTO {
    pub fn new(medicine: Medicine, schedules: Vec<DoseSchedule>) -> Self {
        Self {
            id: medicine.id,
            name: medicine.name,
            notes: medicine.notes,
            schedules: schedules.into_iter().map(DoseScheduleDTO::new).collect(),
        }
    }
}
