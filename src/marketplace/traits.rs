use crate::marketplace::types::RawFavorite;
use anyhow::Result;
use async_trait::async_trait;

/// Anything that can list the user's favorite listings
#[async_trait]
pub trait FavoritesSource: Send + Sync {
    /// Fetch every favorite with its current availability
    async fn fetch_favorites(&self) -> Result<Vec<RawFavorite>>;

    /// Get the name of the marketplace
    fn source_name(&self) -> &'static str;
}
