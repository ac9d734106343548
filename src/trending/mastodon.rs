// Mastodon trending — fetched through the per-instance registered
// client's trends API.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use super::traits::TrendingSource;
use crate::fediverse::client::MastodonClient;
use crate::fediverse::models::TrendingStatus;

/// Trending posts of one Mastodon instance.
pub struct MastodonSource {
    client: Arc<MastodonClient>,
    host: String,
}

impl MastodonSource {
    pub fn new(client: Arc<MastodonClient>, host: &str) -> Self {
        Self {
            client,
            host: host.to_string(),
        }
    }
}

#[async_trait]
impl TrendingSource for MastodonSource {
    async fn trending(&self, limit: u32) -> Result<Vec<TrendingStatus>> {
        debug!(host = %self.host, "Fetching Mastodon trending statuses");

        let statuses = self.client.trending_statuses(limit).await?;
        Ok(statuses
            .into_iter()
            .take(limit as usize)
            .map(TrendingStatus::from)
            .collect())
    }
}
