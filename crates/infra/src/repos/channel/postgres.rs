use super::INotificationChannelRepo;
use dosetrack_domain::{NotificationChannel, ID};
use sqlx::{types::Uuid, FromRow, PgPool};
use tracing::error;
use url::Url;

pub struct PostgresNotificationChannelRepo {
    pool: PgPool,
}

impl PostgresNotificationChannelRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct NotificationChannelRaw {
    channel_uid: Uuid,
    user_uid: Uuid,
    endpoint: String,
    secret: String,
    created: i64,
}

impl From<NotificationChannelRaw> for NotificationChannel {
    fn from(raw: NotificationChannelRaw) -> Self {
        Self {
            id: raw.channel_uid.into(),
            user_id: raw.user_uid.into(),
            endpoint: Url::parse(&raw.endpoint).expect("Stored endpoint to be a valid url"),
            secret: raw.secret,
            created: raw.created,
        }
    }
}

#[async_trait::async_trait]
impl INotificationChannelRepo for PostgresNotificationChannelRepo {
    async fn insert(&self, channel: &NotificationChannel) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notification_channels
            (channel_uid, user_uid, endpoint, secret, created)
            VALUES($1, $2, $3, $4, $5)
            "#,
        )
        .bind(channel.id.inner_ref())
        .bind(channel.user_id.inner_ref())
        .bind(channel.endpoint.as_str())
        .bind(&channel.secret)
        .bind(channel.created)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find(&self, channel_id: &ID) -> Option<NotificationChannel> {
        sqlx::query_as::<_, NotificationChannelRaw>(
            r#"
            SELECT * FROM notification_channels
            WHERE channel_uid = $1
            "#,
        )
        .bind(channel_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_default()
        .map(|raw| raw.into())
    }

    async fn find_by_user(&self, user_id: &ID) -> Vec<NotificationChannel> {
        sqlx::query_as::<_, NotificationChannelRaw>(
            r#"
            SELECT * FROM notification_channels
            WHERE user_uid = $1
            "#,
        )
        .bind(user_id.inner_ref())
        .fetch_all(&self.pool)
        .await
        .unwrap_or_else(|e| {
            error!("Unable to fetch notification channels: {:?}", e);
            Vec::new()
        })
        .into_iter()
        .map(|raw| raw.into())
        .collect()
    }

    async fn delete(&self, channel_id: &ID) -> Option<NotificationChannel> {
        sqlx::query_as::<_, NotificationChannelRaw>(
            r#"
            DELETE FROM notification_channels
            WHERE channel_uid = $1
            RETURNING *
            "#,
        )
        .bind(channel_id.inner_ref())
        .fetch_optional(&self.pool)
        .await
        .unwrap_or_default()
        .map(|raw| raw.into())
    }
}
