// Mastodon REST client — a thin typed wrapper over reqwest.
//
// One client per instance. Source-instance clients carry no token (app
// registration is enough for the trending endpoint); the home client
// carries the user access token obtained through the password grant.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::models::{
    AppCredentials, ResolvedStatus, SearchResults, Status, UserCredentials,
};
use crate::pipeline::traits::HomeInstance;

/// Redirect URI for out-of-band app registration — the bot never runs a
/// browser OAuth flow.
const OOB_REDIRECT_URI: &str = "urn:ietf:wg:oauth:2.0:oob";

/// OAuth scopes requested at registration and login.
const SCOPES: &str = "read write";

/// HTTP client for one Mastodon-compatible instance.
pub struct MastodonClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl MastodonClient {
    /// Create an unauthenticated client for the given hostname.
    pub fn new(host: &str) -> Result<Self> {
        Self::build(host, None)
    }

    /// Create a client that sends the given bearer token.
    pub fn with_token(host: &str, token: &str) -> Result<Self> {
        Self::build(host, Some(token.to_string()))
    }

    fn build(host: &str, token: Option<String>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("bellows/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: format!("https://{host}"),
            token,
        })
    }

    /// GET an API path and deserialize the JSON response.
    async fn api_get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        debug!(path = path, "API GET");
        let request = self.http.get(format!("{}{path}", self.base_url)).query(params);
        self.execute(request, path).await
    }

    /// POST a form to an API path and deserialize the JSON response.
    async fn api_post<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T> {
        debug!(path = path, "API POST");
        let request = self.http.post(format!("{}{path}", self.base_url)).form(form);
        self.execute(request, path).await
    }

    /// PATCH a form to an API path and deserialize the JSON response.
    async fn api_patch<T: DeserializeOwned>(
        &self,
        path: &str,
        form: &[(&str, &str)],
    ) -> Result<T> {
        debug!(path = path, "API PATCH");
        let request = self
            .http
            .patch(format!("{}{path}", self.base_url))
            .form(form);
        self.execute(request, path).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        path: &str,
    ) -> Result<T> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request
            .send()
            .await
            .with_context(|| format!("request failed: {path}"))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{path} returned {status}: {body}");
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("failed to deserialize {path} response"))
    }

    /// Register this service as an OAuth app on the instance.
    pub async fn register_app(&self, client_name: &str) -> Result<AppCredentials> {
        self.api_post(
            "/api/v1/apps",
            &[
                ("client_name", client_name),
                ("redirect_uris", OOB_REDIRECT_URI),
                ("scopes", SCOPES),
            ],
        )
        .await
        .context("app registration failed")
    }

    /// Obtain a user access token through the password grant.
    pub async fn obtain_token(
        &self,
        app: &AppCredentials,
        email: &str,
        password: &str,
    ) -> Result<UserCredentials> {
        self.api_post(
            "/oauth/token",
            &[
                ("grant_type", "password"),
                ("client_id", &app.client_id),
                ("client_secret", &app.client_secret),
                ("username", email),
                ("password", password),
                ("scope", SCOPES),
            ],
        )
        .await
        .context("login failed")
    }

    /// Federated search for a remote status URI, statuses bucket only.
    ///
    /// `resolve=true` asks the instance to fetch the status over
    /// ActivityPub if it doesn't know it yet. Returns the first match;
    /// zero matches is a normal outcome.
    pub async fn search_status(&self, uri: &str) -> Result<Option<ResolvedStatus>> {
        let results: SearchResults = self
            .api_get(
                "/api/v2/search",
                &[("q", uri), ("type", "statuses"), ("resolve", "true")],
            )
            .await
            .with_context(|| format!("search failed for {uri}"))?;

        Ok(results.statuses.into_iter().next().map(ResolvedStatus::from))
    }

    /// The instance's currently trending statuses, most popular first.
    pub async fn trending_statuses(&self, limit: u32) -> Result<Vec<Status>> {
        let limit = limit.to_string();
        self.api_get("/api/v1/trends/statuses", &[("limit", limit.as_str())])
            .await
            .context("failed to fetch trending statuses")
    }

    /// Reblog the status with the given (home-instance) id.
    pub async fn reblog(&self, status_id: &str) -> Result<Status> {
        self.api_post(&format!("/api/v1/statuses/{status_id}/reblog"), &[])
            .await
            .with_context(|| format!("failed to reblog status {status_id}"))
    }

    /// Update the account's profile note and custom fields. The account
    /// is also flagged as a discoverable bot.
    pub async fn update_credentials(
        &self,
        note: &str,
        fields: &[(String, String)],
    ) -> Result<()> {
        let mut form: Vec<(String, String)> = vec![
            ("note".to_string(), note.to_string()),
            ("bot".to_string(), "true".to_string()),
            ("discoverable".to_string(), "true".to_string()),
        ];
        for (index, (name, value)) in fields.iter().enumerate() {
            form.push((format!("fields_attributes[{index}][name]"), name.clone()));
            form.push((format!("fields_attributes[{index}][value]"), value.clone()));
        }
        let form: Vec<(&str, &str)> = form
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        // The API echoes the updated account entity; nothing in it is
        // needed here.
        let _: serde_json::Value = self
            .api_patch("/api/v1/accounts/update_credentials", &form)
            .await
            .context("profile update failed")?;
        Ok(())
    }
}

#[async_trait]
impl HomeInstance for MastodonClient {
    async fn find_status(&self, uri: &str) -> Result<Option<ResolvedStatus>> {
        self.search_status(uri).await
    }

    async fn boost(&self, status_id: &str) -> Result<()> {
        self.reblog(status_id).await.map(|_| ())
    }
}
