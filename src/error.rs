//! Typed errors for the fatal startup tier.
//!
//! Runtime failures (fetch, resolve, boost) stay `anyhow` and are
//! contained at the instance boundary of a cycle. Configuration
//! problems are different: they abort the process before any cycle
//! runs, so they get a distinct error kind the caller can match on.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading and validating configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read from disk
    #[error("could not read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file is not valid YAML (or has the wrong shape)
    #[error("could not parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The bot account section is missing or lacks server/email/password
    #[error("bot account config is incomplete or missing")]
    IncompleteBotAccount,
}
