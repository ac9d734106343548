// Bot profile refresh — note text and custom fields on the home
// account.
//
// The note advertises which instances the bot watches, so followers can
// see where the boosts come from.

use anyhow::Result;
use tracing::info;

use crate::config::{Config, SourceInstance};
use crate::fediverse::client::MastodonClient;

/// Build the profile note: the configured lead text followed by a
/// bullet list of subscribed instance hostnames.
pub fn profile_note(profile: &str, instances: &[SourceInstance]) -> String {
    let instance_list = instances
        .iter()
        .map(|instance| format!("- {}", instance.name))
        .collect::<Vec<_>>()
        .join("\n");
    format!("{profile}\n{instance_list}")
}

/// Push the configured note and fields to the home account.
pub async fn update_profile(client: &MastodonClient, config: &Config) -> Result<()> {
    info!("Updating bot profile");
    let note = profile_note(&config.profile, &config.subscribed_instances);
    client.update_credentials(&note, &config.fields).await
}
