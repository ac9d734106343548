// Data models — Mastodon API entities and the simplified records that
// flow through the boost pipeline.
//
// The wire types keep only the fields the pipeline reads; everything
// else in the API responses is ignored by serde. The simplified records
// are separate so the pipeline and policy modules don't depend on the
// transport layer's shapes.

use serde::{Deserialize, Serialize};

/// The account that authored a status. `acct` is `user@server` for
/// remote accounts and a bare `user` for accounts local to the
/// responding instance.
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub acct: String,
}

/// One media attachment on a status.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaAttachment {
    /// Alt text, if the author provided any.
    #[serde(default)]
    pub description: Option<String>,
}

/// A status as returned by the Mastodon API (and by Pixelfed, whose
/// entities are Mastodon-compatible).
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    pub id: String,
    pub uri: String,
    /// Only present (non-null) on authenticated requests.
    #[serde(default)]
    pub reblogged: Option<bool>,
    #[serde(default)]
    pub media_attachments: Vec<MediaAttachment>,
    pub account: Account,
}

/// Response from `GET /api/v2/search` — only the statuses bucket is
/// ever requested.
#[derive(Debug, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub statuses: Vec<Status>,
}

/// App registration artifact, persisted per instance under
/// `secrets/{host}_clientcred.secret`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// User session artifact, persisted for the home instance under
/// `secrets/{host}_usercred.secret`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredentials {
    pub access_token: String,
}

/// A trending post as reported by a source instance. Produced by the
/// trending fetchers, consumed by the resolver.
#[derive(Debug, Clone)]
pub struct TrendingStatus {
    /// Canonical URI, the key for federated search on the home instance.
    pub uri: String,
    pub acct: String,
    pub has_media: bool,
}

impl From<Status> for TrendingStatus {
    fn from(status: Status) -> Self {
        Self {
            uri: status.uri,
            acct: status.account.acct,
            has_media: !status.media_attachments.is_empty(),
        }
    }
}

/// The home instance's representation of a trending post, located via
/// federated search. Carries exactly what the skip rules and the boost
/// action need.
#[derive(Debug, Clone)]
pub struct ResolvedStatus {
    /// Status id on the home instance, the argument to the reblog call.
    pub id: String,
    pub acct: String,
    pub reblogged: bool,
    pub has_media: bool,
}

impl ResolvedStatus {
    /// The server the post originates from: the domain suffix after the
    /// last `@` of the account handle. A bare local handle has no
    /// suffix and is returned as-is.
    pub fn source_server(&self) -> &str {
        self.acct.rsplit('@').next().unwrap_or(&self.acct)
    }
}

impl From<Status> for ResolvedStatus {
    fn from(status: Status) -> Self {
        Self {
            id: status.id,
            acct: status.account.acct,
            reblogged: status.reblogged.unwrap_or(false),
            has_media: !status.media_attachments.is_empty(),
        }
    }
}
