// Trending retrieval — trait-based abstraction over the source
// protocols.
//
// The TrendingSource trait defines the interface. MastodonSource and
// PixelfedSource implement it; FederatedSources picks the right one per
// subscribed instance.

pub mod mastodon;
pub mod pixelfed;
pub mod sources;
pub mod traits;
