// Fediverse API layer — Mastodon-compatible client, wire models, and
// the per-instance client registry with persisted credentials.

pub mod client;
pub mod models;
pub mod registry;
