use crate::dtos::{MedicineDTO, ScheduleInput};
use dosetrack_domain::{DoseSchedule, Medicine, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineResponse {
    pub medicine: MedicineDTO,
}

impl MedicineResponse {
    pub fn new(medicine: Medicine, schedules: Vec<DoseSchedule>) -> Self {
        Self {
            medicine: MedicineDTO::new(medicine, schedules),
        }
    }
}

pub mod create_medicine {
    use super::*;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub name: String,
        pub notes: Option<String>,
        pub schedules: Vec<ScheduleInput>,
    }

    pub type APIResponse = MedicineResponse;
}

pub mod update_medicine {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub medicine_id: ID,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub name: String,
        pub notes: Option<String>,
        pub schedules: Vec<ScheduleInput>,
    }

    pub type APIResponse = MedicineResponse;
}

pub mod delete_medicine {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub medicine_id: ID,
    }

    pub type APIResponse = MedicineResponse;
}

pub mod get_medicines {
    use super::*;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub medicines: Vec<MedicineDTO>,
    }

    impl APIResponse {
        pub fn new(medicines: Vec<(Medicine, Vec<DoseSchedule>)>) -> Self {
            Self {
                medicines: medicines
                    .into_iter()
                    .map(|(medicine, schedules)| MedicineDTO::new(medicine, schedules))
                    .collect(),
            }
        }
    }
}
