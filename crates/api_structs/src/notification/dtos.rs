use dosetrack_domain::{NotificationChannel, ID};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NotificationChannelDTO {
    pub id: ID,
    pub endpoint: String,
    /// Returned once on registration so the relay can verify sends
    pub secret: String,
}

impl NotificationChannelDTO {
    pub fn new(channel: NotificationChannel) -> Self {
        Self {
            id: channel.id,
            endpoint: channel.endpoint.to_string(),
            secret: channel.secret,
        }
    }
}
