pub mod format;
pub mod telegram;
pub mod traits;

pub use telegram::TelegramMessenger;
pub use traits::Messenger;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDateTime;
use tracing::debug;

use crate::monitor::detect::Transition;

/// Something worth telling the chat about
#[derive(Debug, Clone)]
pub enum Notification<'a> {
    /// Sent once when the service starts
    Startup {
        check_every: Duration,
        heartbeat_every: Duration,
    },
    /// Periodic liveness message, `at` in local time
    Heartbeat { at: NaiveDateTime },
    Stock(Transition<'a>),
}

/// Rendered message, ready for a [`Messenger`]
#[derive(Debug, Clone, PartialEq)]
pub enum OutgoingMessage {
    Text(String),
    Photo { url: String, caption: String },
}

/// Renders notifications and hands them to the chat channel
#[derive(Clone)]
pub struct Notifier {
    messenger: Arc<dyn Messenger>,
}

impl Notifier {
    pub fn new(messenger: Arc<dyn Messenger>) -> Self {
        Self { messenger }
    }

    /// Send exactly one message for `notification`
    pub async fn send(&self, notification: &Notification<'_>) -> Result<()> {
        match format::render(notification) {
            OutgoingMessage::Text(text) => {
                debug!("Sending text message ({} chars)", text.chars().count());
                self.messenger.send_text(&text).await
            }
            OutgoingMessage::Photo { url, caption } => {
                debug!("Sending photo message {}", url);
                self.messenger.send_photo(&url, Some(&caption)).await
            }
        }
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingMessenger;
    use super::*;
    use crate::models::fixtures::item;
    use crate::monitor::detect::StockChange;

    #[tokio::test]
    async fn test_restock_goes_out_as_photo() {
        let messenger = Arc::new(RecordingMessenger::default());
        let notifier = Notifier::new(messenger.clone());
        let item = item("42", "Bakery Klein", 5);

        notifier
            .send(&Notification::Stock(Transition {
                item: &item,
                change: StockChange::Restock { available: 5 },
            }))
            .await
            .unwrap();

        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert!(matches!(&sent[0], OutgoingMessage::Photo { url, .. } if url == &item.cover_picture));
    }

    #[tokio::test]
    async fn test_sellout_goes_out_as_text() {
        let messenger = Arc::new(RecordingMessenger::default());
        let notifier = Notifier::new(messenger.clone());
        let item = item("42", "Bakery Klein", 0);

        notifier
            .send(&Notification::Stock(Transition {
                item: &item,
                change: StockChange::Sellout { previous: 5 },
            }))
            .await
            .unwrap();

        let sent = messenger.sent();
        assert_eq!(sent.len(), 1);
        assert!(matches!(&sent[0], OutgoingMessage::Text(t) if t.contains("Bakery Klein")));
    }

    #[tokio::test]
    async fn test_delivery_errors_are_returned() {
        let notifier = Notifier::new(Arc::new(RecordingMessenger::failing()));
        let result = notifier
            .send(&Notification::Startup {
                check_every: Duration::from_secs(60),
                heartbeat_every: Duration::from_secs(3600),
            })
            .await;
        assert!(result.is_err());
    }
}
