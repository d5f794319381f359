mod inmemory;
mod postgres;

use dosetrack_domain::{NotificationChannel, ID};
pub use inmemory::InMemoryNotificationChannelRepo;
pub use postgres::PostgresNotificationChannelRepo;

#[async_trait::async_trait]
pub trait INotificationChannelRepo: Send + Sync {
    async fn insert(&self, channel: &NotificationChannel) -> anyhow::Result<()>;
    async fn find(&self, channel_id: &ID) -> Option<NotificationChannel>;
    async fn find_by_user(&self, user_id: &ID) -> Vec<NotificationChannel>;
    async fn delete(&self, channel_id: &ID) -> Option<NotificationChannel>;
}
