use dosetrack_domain::NotificationChannel;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Mutex;
use thiserror::Error;
use tracing::error;

/// A notification intent handed to the delivery collaborator. The
/// `dedupe_tag` lets the relay collapse retries of the same intent.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PushNotification {
    pub title: String,
    pub body: String,
    pub dedupe_tag: String,
    pub payload: serde_json::Value,
}

#[derive(Error, Debug)]
pub enum NotifySendError {
    /// The target does not accept deliveries anymore and should be
    /// deregistered
    #[error("Notification target is gone")]
    Gone,
    #[error("Notification delivery failed: {0}")]
    Transient(String),
}

#[async_trait::async_trait]
pub trait INotifier: Send + Sync {
    async fn send(
        &self,
        channel: &NotificationChannel,
        notification: &PushNotification,
    ) -> Result<(), NotifySendError>;
}

/// Posts notification intents to the per user webhook relays, which own
/// the actual browser push delivery
pub struct WebhookNotifier {
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for WebhookNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl INotifier for WebhookNotifier {
    async fn send(
        &self,
        channel: &NotificationChannel,
        notification: &PushNotification,
    ) -> Result<(), NotifySendError> {
        let res = self
            .client
            .post(channel.endpoint.clone())
            .header("dosetrack-channel-key", &channel.secret)
            .json(notification)
            .send()
            .await
            .map_err(|e| {
                error!("Error delivering notification to channel: {:?}", e);
                NotifySendError::Transient(e.to_string())
            })?;

        match res.status().as_u16() {
            200..=299 => Ok(()),
            404 | 410 => Err(NotifySendError::Gone),
            status => Err(NotifySendError::Transient(format!(
                "Endpoint answered with status: {}",
                status
            ))),
        }
    }
}

/// Records sends instead of delivering them, used when testing
pub struct InMemoryNotifier {
    pub sent: Mutex<Vec<(NotificationChannel, PushNotification)>>,
    pub gone_endpoints: Mutex<HashSet<String>>,
}

impl InMemoryNotifier {
    pub fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            gone_endpoints: Mutex::new(HashSet::new()),
        }
    }

    pub fn mark_gone(&self, endpoint: &str) {
        self.gone_endpoints.lock().unwrap().insert(endpoint.to_string());
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Default for InMemoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl INotifier for InMemoryNotifier {
    async fn send(
        &self,
        channel: &NotificationChannel,
        notification: &PushNotification,
    ) -> Result<(), NotifySendError> {
        if self
            .gone_endpoints
            .lock()
            .unwrap()
            .contains(channel.endpoint.as_str())
        {
            return Err(NotifySendError::Gone);
        }
        self.sent
            .lock()
            .unwrap()
            .push((channel.clone(), notification.clone()));
        Ok(())
    }
}
