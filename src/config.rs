// Configuration loading — two YAML files, one for credentials, one for
// settings.
//
// The auth file carries the home account login; the settings file
// carries the schedule, the subscribed instances, and the boost policy
// flags. Keeping them separate lets deployments mount the secret part
// read-only from a different volume than the tunable part.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Upper bound on per-instance trending results. Out-of-range configured
/// limits are clamped here rather than rejected.
pub const MAX_RESULT_LIMIT: u32 = 20;

/// Which server software a subscribed instance runs. Selects the
/// trending retrieval protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Software {
    #[default]
    Mastodon,
    Pixelfed,
}

/// The home account the service logs in as and boosts from.
#[derive(Debug, Clone, Deserialize)]
pub struct BotAccount {
    pub server: String,
    pub email: String,
    pub password: String,
}

/// One subscribed source instance whose trending posts are polled each
/// cycle.
#[derive(Debug, Clone)]
pub struct SourceInstance {
    pub name: String,
    /// Effective trending-result limit, always within [1, 20].
    pub limit: u32,
    pub software: Software,
    /// Skip posts without media attachments.
    pub boost_only_media: bool,
    /// Carried from configuration; no skip rule consumes it yet.
    pub boost_only_described: bool,
}

impl SourceInstance {
    pub fn new(
        name: &str,
        limit: u32,
        software: Software,
        boost_only_media: bool,
        boost_only_described: bool,
    ) -> Self {
        Self {
            name: name.to_string(),
            limit: clamp_limit(limit),
            software,
            boost_only_media,
            boost_only_described,
        }
    }
}

/// Clamp a configured result limit into [1, 20]. Anything outside the
/// range (including 0) becomes 20.
pub fn clamp_limit(limit: u32) -> u32 {
    if (1..=MAX_RESULT_LIMIT).contains(&limit) {
        limit
    } else {
        MAX_RESULT_LIMIT
    }
}

/// Central configuration, immutable after startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_account: BotAccount,
    /// Minutes between cycle starts.
    pub interval: u64,
    /// Seconds to wait before login and the first cycle.
    pub delay: u64,
    pub log_level: String,
    /// Leading text of the bot profile note.
    pub profile: String,
    /// Custom profile fields (name, value), in file order.
    pub fields: Vec<(String, String)>,
    pub subscribed_instances: Vec<SourceInstance>,
    /// Servers whose posts are never boosted.
    pub filtered_servers: HashSet<String>,
}

// -- Raw serde shapes of the two files --

#[derive(Deserialize)]
struct RawAuth {
    bot_account: Option<RawBotAccount>,
}

#[derive(Deserialize)]
struct RawBotAccount {
    server: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    interval: Option<u64>,
    delay: Option<u64>,
    log_level: Option<String>,
    profile: Option<String>,
    // Mappings stay serde_yaml::Mapping so the file's order survives —
    // instance order is the processing order, field order shows up on
    // the profile.
    fields: Option<serde_yaml::Mapping>,
    subscribed_instances: Option<serde_yaml::Mapping>,
    filtered_instances: Option<Vec<String>>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct RawInstance {
    limit: Option<u32>,
    software: Option<Software>,
    boost_only_media: bool,
    boost_only_described: bool,
}

impl Config {
    /// Load configuration from the auth and settings files.
    ///
    /// A missing or incomplete bot account is fatal — without it there
    /// is nothing to boost from. Everything in the settings file has a
    /// default.
    pub fn load(auth_path: &Path, settings_path: &Path) -> Result<Self, ConfigError> {
        let auth: RawAuth = read_yaml(auth_path)?;
        let account = auth
            .bot_account
            .ok_or(ConfigError::IncompleteBotAccount)?;
        let bot_account = match (account.server, account.email, account.password) {
            (Some(server), Some(email), Some(password)) => BotAccount {
                server,
                email,
                password,
            },
            _ => return Err(ConfigError::IncompleteBotAccount),
        };

        let settings: RawSettings = read_yaml(settings_path)?;

        let mut subscribed_instances = Vec::new();
        for (name, raw) in settings.subscribed_instances.unwrap_or_default() {
            let name: String =
                serde_yaml::from_value(name).map_err(|e| parse_error(settings_path, e))?;
            let raw: RawInstance =
                serde_yaml::from_value(raw).map_err(|e| parse_error(settings_path, e))?;
            subscribed_instances.push(SourceInstance::new(
                &name,
                raw.limit.unwrap_or(MAX_RESULT_LIMIT),
                raw.software.unwrap_or_default(),
                raw.boost_only_media,
                raw.boost_only_described,
            ));
        }

        let mut fields = Vec::new();
        for (name, value) in settings.fields.unwrap_or_default() {
            let name: String =
                serde_yaml::from_value(name).map_err(|e| parse_error(settings_path, e))?;
            let value: String =
                serde_yaml::from_value(value).map_err(|e| parse_error(settings_path, e))?;
            fields.push((name, value));
        }

        Ok(Self {
            bot_account,
            interval: settings.interval.unwrap_or(60),
            delay: settings.delay.unwrap_or(0),
            log_level: settings.log_level.unwrap_or_else(|| "info".to_string()),
            profile: settings.profile.unwrap_or_default(),
            fields,
            subscribed_instances,
            filtered_servers: settings
                .filtered_instances
                .unwrap_or_default()
                .into_iter()
                .collect(),
        })
    }
}

fn parse_error(path: &Path, source: serde_yaml::Error) -> ConfigError {
    ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    }
}

fn read_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
