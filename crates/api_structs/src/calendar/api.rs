use crate::dtos::{DayDotDTO, DoseInstanceDTO};
use dosetrack_domain::{Day, DayDot};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub mod get_month_indicator {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub year_month: String,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub days: HashMap<String, Vec<DayDotDTO>>,
    }

    impl APIResponse {
        pub fn new(indicators: BTreeMap<Day, Vec<DayDot>>) -> Self {
            Self {
                days: indicators
                    .into_iter()
                    .map(|(day, dots)| {
                        (
                            day.to_string(),
                            dots.into_iter().map(DayDotDTO::new).collect(),
                        )
                    })
                    .collect(),
            }
        }
    }
}

pub mod get_day_detail {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub date: String,
    }

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct APIResponse {
        pub instances: Vec<DoseInstanceDTO>,
    }
}
