use anyhow::Result;
use async_trait::async_trait;

/// Outbound chat channel
///
/// Both calls take Telegram-flavoured Markdown.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, text: &str) -> Result<()>;

    async fn send_photo(&self, photo_url: &str, caption: Option<&str>) -> Result<()>;
}
