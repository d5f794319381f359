use super::INotificationChannelRepo;
use crate::repos::shared::inmemory_repo::*;
use dosetrack_domain::{NotificationChannel, ID};

pub struct InMemoryNotificationChannelRepo {
    channels: std::sync::Mutex<Vec<NotificationChannel>>,
}

impl InMemoryNotificationChannelRepo {
    pub fn new() -> Self {
        Self {
            channels: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl INotificationChannelRepo for InMemoryNotificationChannelRepo {
    async fn insert(&self, channel: &NotificationChannel) -> anyhow::Result<()> {
        insert(channel, &self.channels);
        Ok(())
    }

    async fn find(&self, channel_id: &ID) -> Option<NotificationChannel> {
        find(channel_id, &self.channels)
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<NotificationChannel> {
        find_by(&self.channels, |c| c.user_id == *user_id)
    }

    async fn delete(&self, channel_id: &ID) -> Option<NotificationChannel> {
        delete(channel_id, &self.channels)
    }
}
