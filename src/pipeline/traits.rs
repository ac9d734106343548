// Home instance trait — the seam between the boost pipeline and the
// authenticated Mastodon client, so the cycle can be exercised in tests
// without network access.

use anyhow::Result;
use async_trait::async_trait;

use crate::fediverse::models::ResolvedStatus;

/// What the cycle needs from the home instance: resolving a remote URI
/// to the local representation, and reblogging by local id.
#[async_trait]
pub trait HomeInstance: Send + Sync {
    /// Federated search for a remote status URI. `Ok(None)` means the
    /// home instance doesn't know the post — a normal outcome.
    async fn find_status(&self, uri: &str) -> Result<Option<ResolvedStatus>>;

    /// Reblog the status with the given home-instance id.
    async fn boost(&self, status_id: &str) -> Result<()>;
}
