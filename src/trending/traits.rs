// Trending source trait — the protocol-dispatch abstraction.
//
// Each server software that exposes trending posts gets one
// implementation. Supporting a third protocol means adding an
// implementation and a match arm in the directory, not touching the
// cycle coordinator.

use anyhow::Result;
use async_trait::async_trait;

use crate::config::SourceInstance;
use crate::fediverse::models::TrendingStatus;

/// A source instance's trending feed.
#[async_trait]
pub trait TrendingSource: Send + Sync {
    /// The instance's currently trending posts, best-ranked first,
    /// truncated to `limit`.
    async fn trending(&self, limit: u32) -> Result<Vec<TrendingStatus>>;
}

/// Hands out the right `TrendingSource` for a subscribed instance.
#[async_trait]
pub trait SourceDirectory: Send + Sync {
    async fn source_for(&self, instance: &SourceInstance) -> Result<Box<dyn TrendingSource>>;
}
