// Pixelfed trending — unauthenticated fetch from the public discover
// endpoint. Pixelfed doesn't serve /api/v1/trends/statuses, but its
// discover API returns Mastodon-compatible status entities.

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::debug;

use super::traits::TrendingSource;
use crate::fediverse::models::{Status, TrendingStatus};

/// Trending posts of one Pixelfed instance, daily range.
pub struct PixelfedSource {
    http: reqwest::Client,
    host: String,
}

impl PixelfedSource {
    pub fn new(host: &str) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bellows/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            host: host.to_string(),
        })
    }
}

#[async_trait]
impl TrendingSource for PixelfedSource {
    async fn trending(&self, limit: u32) -> Result<Vec<TrendingStatus>> {
        let url = format!(
            "https://{}/api/pixelfed/v2/discover/posts/trending",
            self.host
        );

        debug!(host = %self.host, "Fetching Pixelfed trending posts");

        let response = self
            .http
            .get(&url)
            .query(&[("range", "daily")])
            .send()
            .await
            .with_context(|| format!("trending request failed for {}", self.host))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} trending returned {status}: {body}", self.host);
        }

        let statuses: Vec<Status> = response
            .json()
            .await
            .with_context(|| format!("failed to deserialize trending response from {}", self.host))?;

        Ok(statuses
            .into_iter()
            .take(limit as usize)
            .map(TrendingStatus::from)
            .collect())
    }
}
