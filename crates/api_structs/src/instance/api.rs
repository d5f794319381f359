use crate::dtos::DoseInstanceDTO;
use dosetrack_domain::{DoseInstance, IntakeStatus, ID};
use serde::{Deserialize, Serialize};

pub mod set_intake_status {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub instance_id: ID,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub status: IntakeStatus,
        /// Optional client supplied intake timestamp, defaults to the
        /// server clock
        pub checked_at: Option<i64>,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub instance: DoseInstanceDTO,
    }

    impl APIResponse {
        pub fn new(instance: DoseInstance, medicine_name: String) -> Self {
            let status = instance.status;
            Self {
                instance: DoseInstanceDTO::new(instance, medicine_name, status),
            }
        }
    }
}
