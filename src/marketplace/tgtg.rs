use crate::config::TgtgCredentials;
use crate::marketplace::traits::FavoritesSource;
use crate::marketplace::types::{FavoritesQuery, ItemsResponse, RawFavorite};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_BASE_URL: &str = "https://apptoogoodtogo.com/api/";
const ITEM_ENDPOINT: &str = "item/v8/";
const PAGE_SIZE: usize = 20;
const MAX_PAGES: usize = 50;

/// Too Good To Go item API client
///
/// Uses the access token as-is. Obtaining and refreshing tokens is left to
/// whoever provisions the credentials.
pub struct TgtgClient {
    client: Client,
    base_url: String,
    credentials: TgtgCredentials,
}

impl TgtgClient {
    /// Create a client against the production API
    pub fn new(credentials: TgtgCredentials) -> Result<Self> {
        Self::with_base_url(credentials, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom API root
    pub fn with_base_url(credentials: TgtgCredentials, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("TGTG/24.2.13 Dalvik/2.1.0 (Linux; U; Android 12; SM-G920V Build/MMB29K)")
            .build()
            .context("Failed to create HTTP client")?;

        let mut base_url = base_url.to_string();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }

        Ok(Self {
            client,
            base_url,
            credentials,
        })
    }

    fn items_url(&self) -> String {
        format!("{}{}", self.base_url, ITEM_ENDPOINT)
    }

    async fn fetch_page(&self, query: &FavoritesQuery) -> Result<Vec<RawFavorite>> {
        let url = self.items_url();
        debug!("Fetching favorites page {} from {}", query.page, url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.credentials.access_token)
            .json(query)
            .send()
            .await
            .context("Failed to reach TGTG item endpoint")?;

        if !response.status().is_success() {
            warn!("TGTG returned status: {}", response.status());
            bail!("Failed to fetch favorites: {}", response.status());
        }

        let body: ItemsResponse = response
            .json()
            .await
            .context("Failed to parse TGTG item response")?;

        Ok(body.items)
    }
}

/// Request pages starting at 1 until one comes back short
///
/// Running out of pages is an error: a truncated list would make the missing
/// favorites look unfavorited now and restocked later.
async fn collect_pages<F, Fut>(page_size: usize, mut fetch_page: F) -> Result<Vec<RawFavorite>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = Result<Vec<RawFavorite>>>,
{
    let mut favorites = Vec::new();

    for page in 1..=MAX_PAGES {
        let batch = fetch_page(page).await?;
        let short_page = batch.len() < page_size;
        favorites.extend(batch);

        if short_page {
            return Ok(favorites);
        }
    }

    bail!(
        "Favorites did not fit in {} pages of {}, refusing a partial list",
        MAX_PAGES,
        page_size
    )
}

#[async_trait]
impl FavoritesSource for TgtgClient {
    async fn fetch_favorites(&self) -> Result<Vec<RawFavorite>> {
        let query = FavoritesQuery::favorites(&self.credentials.user_id, PAGE_SIZE);

        let favorites = collect_pages(PAGE_SIZE, |page| {
            let query = FavoritesQuery {
                page,
                ..query.clone()
            };
            async move { self.fetch_page(&query).await }
        })
        .await?;

        info!("📥 Fetched {} favorites from {}", favorites.len(), self.source_name());
        Ok(favorites)
    }

    fn source_name(&self) -> &'static str {
        "Too Good To Go"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marketplace::types::fixtures::raw_favorite;
    use std::future::ready;

    fn credentials() -> TgtgCredentials {
        TgtgCredentials {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            user_id: "777".to_string(),
        }
    }

    #[test]
    fn test_items_url_defaults_to_production() {
        let client = TgtgClient::new(credentials()).unwrap();
        assert_eq!(client.items_url(), "https://apptoogoodtogo.com/api/item/v8/");
    }

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let client = TgtgClient::with_base_url(credentials(), "http://localhost:8080/api").unwrap();
        assert_eq!(client.items_url(), "http://localhost:8080/api/item/v8/");
    }

    fn batch(page: usize, len: usize) -> Vec<RawFavorite> {
        (0..len)
            .map(|i| raw_favorite(&format!("{page}-{i}"), "Bakery", 1))
            .collect()
    }

    #[tokio::test]
    async fn test_pages_are_combined_until_short_page() {
        let sizes = [PAGE_SIZE, PAGE_SIZE, 3];
        let mut requested = Vec::new();

        let favorites = collect_pages(PAGE_SIZE, |page| {
            requested.push(page);
            ready(Ok(batch(page, sizes[page - 1])))
        })
        .await
        .unwrap();

        assert_eq!(favorites.len(), 43);
        assert_eq!(requested, vec![1, 2, 3]);
        assert_eq!(favorites[0].item.item_id.as_str(), "1-0");
        assert_eq!(favorites[42].item.item_id.as_str(), "3-2");
    }

    #[tokio::test]
    async fn test_full_last_page_is_followed_by_empty_page() {
        let sizes = [PAGE_SIZE, PAGE_SIZE, 0];
        let mut calls = 0;

        let favorites = collect_pages(PAGE_SIZE, |page| {
            calls += 1;
            ready(Ok(batch(page, sizes[page - 1])))
        })
        .await
        .unwrap();

        assert_eq!(favorites.len(), 40);
        assert_eq!(calls, 3);
    }

    #[tokio::test]
    async fn test_paging_stops_at_page_cap_with_error() {
        let mut calls = 0;

        let result = collect_pages(1, |page| {
            calls += 1;
            ready(Ok(batch(page, 1)))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, MAX_PAGES);
    }

    #[tokio::test]
    async fn test_failed_page_fails_the_fetch() {
        let mut calls = 0;

        let result = collect_pages(PAGE_SIZE, |page| {
            calls += 1;
            ready(if page == 2 {
                Err(anyhow::anyhow!("Failed to fetch favorites: 502 Bad Gateway"))
            } else {
                Ok(batch(page, PAGE_SIZE))
            })
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 2);
    }

    #[tokio::test]
    async fn test_unreachable_api_is_an_error() {
        // Port 9 (discard) is not expected to speak HTTP.
        let client = TgtgClient::with_base_url(credentials(), "http://127.0.0.1:9/api/").unwrap();
        assert!(client.fetch_favorites().await.is_err());
    }
}
