// Source selection — maps an instance's declared software to the
// trending implementation that speaks its protocol.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use super::mastodon::MastodonSource;
use super::pixelfed::PixelfedSource;
use super::traits::{SourceDirectory, TrendingSource};
use crate::config::{Software, SourceInstance};
use crate::fediverse::registry::ClientRegistry;

/// The real `SourceDirectory`, backed by the client registry. Mastodon
/// sources get a lazily registered client; Pixelfed sources need none.
pub struct FederatedSources {
    registry: Arc<ClientRegistry>,
}

impl FederatedSources {
    pub fn new(registry: Arc<ClientRegistry>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl SourceDirectory for FederatedSources {
    async fn source_for(&self, instance: &SourceInstance) -> Result<Box<dyn TrendingSource>> {
        match instance.software {
            Software::Pixelfed => Ok(Box::new(PixelfedSource::new(&instance.name)?)),
            Software::Mastodon => {
                let client = self.registry.source_client(&instance.name).await?;
                Ok(Box::new(MastodonSource::new(client, &instance.name)))
            }
        }
    }
}
