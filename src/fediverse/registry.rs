// Client registry — per-instance clients and their credential artifacts.
//
// App registrations and the home user session are persisted under the
// secrets directory and reused on later runs, so restarting the service
// doesn't re-register an app on every subscribed instance. Source
// clients are created lazily on first use and cached for the process
// lifetime.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use super::client::MastodonClient;
use super::models::{AppCredentials, UserCredentials};
use crate::config::BotAccount;

/// App name sent at OAuth registration.
const CLIENT_NAME: &str = "bellows";

/// Creates, caches, and persists per-instance clients.
pub struct ClientRegistry {
    secrets_dir: PathBuf,
    /// Source clients by hostname. Interior mutability so callers only
    /// need a shared reference; access is serial within a cycle.
    sources: Mutex<HashMap<String, Arc<MastodonClient>>>,
}

impl ClientRegistry {
    pub fn new(secrets_dir: impl Into<PathBuf>) -> Self {
        Self {
            secrets_dir: secrets_dir.into(),
            sources: Mutex::new(HashMap::new()),
        }
    }

    /// An app-registered (unauthenticated) client for a source instance.
    ///
    /// The first call per hostname registers the app (or loads a
    /// previously persisted registration) and caches the client.
    pub async fn source_client(&self, host: &str) -> Result<Arc<MastodonClient>> {
        if let Some(client) = self.sources.lock().unwrap().get(host) {
            return Ok(Arc::clone(client));
        }

        self.app_credentials(host).await?;
        let client = Arc::new(MastodonClient::new(host)?);

        self.sources
            .lock()
            .unwrap()
            .insert(host.to_string(), Arc::clone(&client));
        Ok(client)
    }

    /// The authenticated client for the home account.
    ///
    /// Reuses a persisted user session if one exists; otherwise logs in
    /// with the password grant and persists the token.
    pub async fn home_client(&self, account: &BotAccount) -> Result<Arc<MastodonClient>> {
        let host = &account.server;
        let app = self.app_credentials(host).await?;

        let usercred_path = self.usercred_path(host);
        let user: UserCredentials = match load_artifact(&usercred_path)? {
            Some(user) => {
                debug!(host = %host, "Reusing persisted user session");
                user
            }
            None => {
                info!(host = %host, "Logging in to {host}");
                let client = MastodonClient::new(host)?;
                let user = client
                    .obtain_token(&app, &account.email, &account.password)
                    .await?;
                store_artifact(&usercred_path, &user)?;
                user
            }
        };

        Ok(Arc::new(MastodonClient::with_token(
            host,
            &user.access_token,
        )?))
    }

    /// Load the persisted app registration for a host, registering a
    /// new app if none exists yet.
    async fn app_credentials(&self, host: &str) -> Result<AppCredentials> {
        let path = self.clientcred_path(host);
        if let Some(app) = load_artifact(&path)? {
            debug!(host = %host, "Client for {host} is already initialized");
            return Ok(app);
        }

        info!(host = %host, "Initializing client for {host}");
        let client = MastodonClient::new(host)?;
        let app = client.register_app(CLIENT_NAME).await?;
        store_artifact(&path, &app)?;
        Ok(app)
    }

    fn clientcred_path(&self, host: &str) -> PathBuf {
        self.secrets_dir.join(format!("{host}_clientcred.secret"))
    }

    fn usercred_path(&self, host: &str) -> PathBuf {
        self.secrets_dir.join(format!("{host}_usercred.secret"))
    }
}

fn load_artifact<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("could not read {}", path.display()))?;
    let artifact = serde_json::from_str(&text)
        .with_context(|| format!("could not parse {}", path.display()))?;
    Ok(Some(artifact))
}

fn store_artifact<T: Serialize>(path: &Path, artifact: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("could not create {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(artifact)?;
    fs::write(path, text).with_context(|| format!("could not write {}", path.display()))
}
