use crate::shared::entity::{Entity, ID};
use dosetrack_utils::create_random_secret;
use thiserror::Error;
use url::Url;

const CHANNEL_SECRET_LEN: usize = 30;

#[derive(Error, Debug)]
pub enum InvalidChannelEndpointError {
    #[error("Endpoint: {0} is not a valid url")]
    Malformed(String),
    #[error("Endpoint scheme: {0} is not allowed, expected http or https")]
    DisallowedScheme(String),
}

/// A push delivery target registered by a user. Notification intents for
/// the user are posted to every registered channel; a channel whose
/// endpoint reports itself gone is deregistered.
#[derive(Debug, Clone)]
pub struct NotificationChannel {
    pub id: ID,
    pub user_id: ID,
    pub endpoint: Url,
    /// Shared secret the relay can use to verify the sender
    pub secret: String,
    pub created: i64,
}

impl NotificationChannel {
    pub fn new(user_id: ID, endpoint: Url, created: i64) -> Self {
        Self {
            id: Default::default(),
            user_id,
            endpoint,
            secret: create_random_secret(CHANNEL_SECRET_LEN),
            created,
        }
    }

    pub fn parse_endpoint(endpoint: &str) -> Result<Url, InvalidChannelEndpointError> {
        let url = Url::parse(endpoint)
            .map_err(|_| InvalidChannelEndpointError::Malformed(endpoint.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(InvalidChannelEndpointError::DisallowedScheme(
                scheme.to_string(),
            )),
        }
    }
}

impl Entity for NotificationChannel {
    fn id(&self) -> &ID {
        &self.id
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn it_accepts_http_and_https_endpoints() {
        assert!(NotificationChannel::parse_endpoint("https://relay.example.com/push").is_ok());
        assert!(NotificationChannel::parse_endpoint("http://localhost:9000/push").is_ok());
    }

    #[test]
    fn it_rejects_other_schemes_and_garbage() {
        assert!(NotificationChannel::parse_endpoint("ftp://relay.example.com").is_err());
        assert!(NotificationChannel::parse_endpoint("not a url").is_err());
    }

    #[test]
    fn it_generates_a_secret_per_channel() {
        let endpoint = NotificationChannel::parse_endpoint("https://relay.example.com").unwrap();
        let a = NotificationChannel::new(Default::default(), endpoint.clone(), 0);
        let b = NotificationChannel::new(Default::default(), endpoint, 0);
        assert_eq!(a.secret.len(), CHANNEL_SECRET_LEN);
        assert_ne!(a.secret, b.secret);
    }
}
