// Skip policy — the eligibility rules a resolved post must clear before
// it is boosted.
//
// Three independent rules, any of which vetoes the boost. None has side
// effects, so evaluation short-circuits at the first match and the
// reported reason is the first rule that fired.

use std::collections::HashSet;
use std::fmt;

use crate::config::SourceInstance;
use crate::fediverse::models::ResolvedStatus;

/// Why a post was not boosted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The originating server is on the filter list.
    FilteredServer,
    /// The home account already reblogged this post. Keeps repeated
    /// cycles over the same trending content idempotent.
    AlreadyBoosted,
    /// The instance is subscribed media-only and the post has none.
    MissingMedia,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::FilteredServer => "filtered server",
            SkipReason::AlreadyBoosted => "already boosted",
            SkipReason::MissingMedia => "no media",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decide whether a resolved post must be skipped. `None` means boost.
pub fn skip_reason(
    status: &ResolvedStatus,
    instance: &SourceInstance,
    filtered_servers: &HashSet<String>,
) -> Option<SkipReason> {
    if filtered_servers.contains(status.source_server()) {
        return Some(SkipReason::FilteredServer);
    }
    if status.reblogged {
        return Some(SkipReason::AlreadyBoosted);
    }
    if instance.boost_only_media && !status.has_media {
        return Some(SkipReason::MissingMedia);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Software;

    fn status(acct: &str, reblogged: bool, has_media: bool) -> ResolvedStatus {
        ResolvedStatus {
            id: "1".to_string(),
            acct: acct.to_string(),
            reblogged,
            has_media,
        }
    }

    fn instance(boost_only_media: bool) -> SourceInstance {
        SourceInstance::new("src.example", 10, Software::Mastodon, boost_only_media, false)
    }

    fn filtered(servers: &[&str]) -> HashSet<String> {
        servers.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn clean_post_is_boosted() {
        let decision = skip_reason(
            &status("user@src.example", false, true),
            &instance(false),
            &filtered(&[]),
        );
        assert_eq!(decision, None);
    }

    #[test]
    fn filtered_server_is_skipped_regardless_of_other_flags() {
        // Media present and not yet boosted — the filter alone decides.
        let decision = skip_reason(
            &status("user@badserver.example", false, true),
            &instance(false),
            &filtered(&["badserver.example"]),
        );
        assert_eq!(decision, Some(SkipReason::FilteredServer));
    }

    #[test]
    fn already_boosted_is_skipped() {
        let decision = skip_reason(
            &status("user@src.example", true, true),
            &instance(false),
            &filtered(&[]),
        );
        assert_eq!(decision, Some(SkipReason::AlreadyBoosted));
    }

    #[test]
    fn media_only_instance_skips_text_posts() {
        let decision = skip_reason(
            &status("user@src.example", false, false),
            &instance(true),
            &filtered(&[]),
        );
        assert_eq!(decision, Some(SkipReason::MissingMedia));
    }

    #[test]
    fn media_only_instance_boosts_media_posts() {
        let decision = skip_reason(
            &status("user@src.example", false, true),
            &instance(true),
            &filtered(&[]),
        );
        assert_eq!(decision, None);
    }

    #[test]
    fn text_post_passes_when_instance_has_no_media_policy() {
        let decision = skip_reason(
            &status("user@src.example", false, false),
            &instance(false),
            &filtered(&[]),
        );
        assert_eq!(decision, None);
    }

    #[test]
    fn filter_matches_on_suffix_after_last_at() {
        // Leading @ in the handle must not confuse the extraction.
        let decision = skip_reason(
            &status("@user@badserver.example", false, true),
            &instance(false),
            &filtered(&["badserver.example"]),
        );
        assert_eq!(decision, Some(SkipReason::FilteredServer));
    }

    #[test]
    fn filter_reason_wins_over_already_boosted() {
        // Both rules match; the first rule in evaluation order reports.
        let decision = skip_reason(
            &status("user@badserver.example", true, true),
            &instance(false),
            &filtered(&["badserver.example"]),
        );
        assert_eq!(decision, Some(SkipReason::FilteredServer));
    }

    #[test]
    fn local_handle_is_not_filtered_by_remote_server() {
        let decision = skip_reason(
            &status("user", false, true),
            &instance(false),
            &filtered(&["badserver.example"]),
        );
        assert_eq!(decision, None);
    }
}
