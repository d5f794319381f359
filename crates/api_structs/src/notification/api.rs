use crate::dtos::NotificationChannelDTO;
use dosetrack_domain::{NotificationChannel, ID};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationChannelResponse {
    pub channel: NotificationChannelDTO,
}

impl NotificationChannelResponse {
    pub fn new(channel: NotificationChannel) -> Self {
        Self {
            channel: NotificationChannelDTO::new(channel),
        }
    }
}

pub mod register_channel {
    use super::*;

    #[derive(Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct RequestBody {
        pub endpoint: String,
    }

    pub type APIResponse = NotificationChannelResponse;
}

pub mod remove_channel {
    use super::*;

    #[derive(Deserialize)]
    pub struct PathParams {
        pub channel_id: ID,
    }

    pub type APIResponse = NotificationChannelResponse;
}
