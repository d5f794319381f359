mod notifier;

pub use notifier::{INotifier, InMemoryNotifier, NotifySendError, PushNotification, WebhookNotifier};
