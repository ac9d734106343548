// Composition tests — the full cycle wired through mock collaborators.
//
// A canned SourceDirectory and an in-memory HomeInstance exercise the
// fetch -> resolve -> decide -> boost flow without any network access:
// tally accounting, idempotence across cycles, per-instance failure
// isolation, and the skip scenarios.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;

use bellows::config::{Software, SourceInstance};
use bellows::fediverse::models::{ResolvedStatus, TrendingStatus};
use bellows::pipeline::cycle::run_cycle;
use bellows::pipeline::traits::HomeInstance;
use bellows::trending::traits::{SourceDirectory, TrendingSource};

// ============================================================
// Mock collaborators
// ============================================================

struct CannedSource {
    statuses: Vec<TrendingStatus>,
}

#[async_trait]
impl TrendingSource for CannedSource {
    async fn trending(&self, limit: u32) -> Result<Vec<TrendingStatus>> {
        Ok(self
            .statuses
            .iter()
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

struct FailingSource;

#[async_trait]
impl TrendingSource for FailingSource {
    async fn trending(&self, _limit: u32) -> Result<Vec<TrendingStatus>> {
        anyhow::bail!("connection refused")
    }
}

/// Serves a canned feed per instance name; listed hosts fail on fetch.
#[derive(Default)]
struct CannedSources {
    feeds: HashMap<String, Vec<TrendingStatus>>,
    failing: HashSet<String>,
}

#[async_trait]
impl SourceDirectory for CannedSources {
    async fn source_for(&self, instance: &SourceInstance) -> Result<Box<dyn TrendingSource>> {
        if self.failing.contains(&instance.name) {
            return Ok(Box::new(FailingSource));
        }
        Ok(Box::new(CannedSource {
            statuses: self.feeds.get(&instance.name).cloned().unwrap_or_default(),
        }))
    }
}

/// In-memory home instance: a URI -> status map plus a boost log.
/// Boosting flips the stored status to reblogged, like the real thing.
#[derive(Default)]
struct MockHome {
    known: Mutex<HashMap<String, ResolvedStatus>>,
    boosted: Mutex<Vec<String>>,
}

impl MockHome {
    fn insert(&self, uri: &str, status: ResolvedStatus) {
        self.known.lock().unwrap().insert(uri.to_string(), status);
    }

    fn boost_log(&self) -> Vec<String> {
        self.boosted.lock().unwrap().clone()
    }
}

#[async_trait]
impl HomeInstance for MockHome {
    async fn find_status(&self, uri: &str) -> Result<Option<ResolvedStatus>> {
        Ok(self.known.lock().unwrap().get(uri).cloned())
    }

    async fn boost(&self, status_id: &str) -> Result<()> {
        self.boosted.lock().unwrap().push(status_id.to_string());
        let mut known = self.known.lock().unwrap();
        for status in known.values_mut() {
            if status.id == status_id {
                status.reblogged = true;
            }
        }
        Ok(())
    }
}

// ============================================================
// Fixture helpers
// ============================================================

fn trending(uri: &str, acct: &str) -> TrendingStatus {
    TrendingStatus {
        uri: uri.to_string(),
        acct: acct.to_string(),
        has_media: true,
    }
}

fn resolved(id: &str, acct: &str, has_media: bool) -> ResolvedStatus {
    ResolvedStatus {
        id: id.to_string(),
        acct: acct.to_string(),
        reblogged: false,
        has_media,
    }
}

fn mastodon_instance(name: &str, limit: u32) -> SourceInstance {
    SourceInstance::new(name, limit, Software::Mastodon, false, false)
}

/// One instance with `feed_size` posts, all resolvable and boostable.
fn simple_fixture(feed_size: usize, limit: u32) -> (MockHome, CannedSources, Vec<SourceInstance>) {
    let home = MockHome::default();
    let mut feed = Vec::new();
    for n in 0..feed_size {
        let uri = format!("https://src.example/p/{n}");
        feed.push(trending(&uri, "user@src.example"));
        home.insert(&uri, resolved(&n.to_string(), "user@src.example", true));
    }

    let mut sources = CannedSources::default();
    sources.feeds.insert("src.example".to_string(), feed);

    (home, sources, vec![mastodon_instance("src.example", limit)])
}

// ============================================================
// Tally accounting
// ============================================================

#[tokio::test]
async fn decided_posts_equal_min_of_feed_and_limit() {
    let (home, sources, instances) = simple_fixture(5, 3);
    let report = run_cycle(&home, &sources, &instances, &HashSet::new()).await;

    let tally = report.instances[0].outcome.as_ref().unwrap();
    assert_eq!(tally.decided(), 3);
    assert_eq!(tally.boosted, 3);
    assert_eq!(tally.skipped, 0);
}

#[tokio::test]
async fn short_feed_decides_every_post() {
    let (home, sources, instances) = simple_fixture(2, 20);
    let report = run_cycle(&home, &sources, &instances, &HashSet::new()).await;

    let tally = report.instances[0].outcome.as_ref().unwrap();
    assert_eq!(tally.decided(), 2);
}

#[tokio::test]
async fn boosts_happen_in_rank_order() {
    let (home, sources, instances) = simple_fixture(4, 4);
    run_cycle(&home, &sources, &instances, &HashSet::new()).await;

    assert_eq!(home.boost_log(), vec!["0", "1", "2", "3"]);
}

#[tokio::test]
async fn empty_registry_produces_empty_report() {
    let home = MockHome::default();
    let sources = CannedSources::default();
    let report = run_cycle(&home, &sources, &[], &HashSet::new()).await;

    assert!(report.instances.is_empty());
    assert_eq!(report.boosted(), 0);
}

// ============================================================
// Idempotence across cycles
// ============================================================

#[tokio::test]
async fn second_cycle_boosts_nothing_new() {
    let (home, sources, instances) = simple_fixture(3, 3);

    let first = run_cycle(&home, &sources, &instances, &HashSet::new()).await;
    assert_eq!(first.boosted(), 3);

    // Same trending content again: every post is now reblogged.
    let second = run_cycle(&home, &sources, &instances, &HashSet::new()).await;
    assert_eq!(second.boosted(), 0);
    assert_eq!(second.skipped(), 3);
    assert_eq!(home.boost_log().len(), 3);
}

// ============================================================
// Skip scenarios
// ============================================================

#[tokio::test]
async fn filtered_server_posts_are_never_boosted() {
    let home = MockHome::default();
    home.insert(
        "https://bad.example/p/1",
        resolved("1", "user@badserver.example", true),
    );
    home.insert(
        "https://src.example/p/2",
        resolved("2", "user@src.example", true),
    );

    let mut sources = CannedSources::default();
    sources.feeds.insert(
        "src.example".to_string(),
        vec![
            trending("https://bad.example/p/1", "user@badserver.example"),
            trending("https://src.example/p/2", "user@src.example"),
        ],
    );
    let instances = vec![mastodon_instance("src.example", 10)];
    let filtered: HashSet<String> = ["badserver.example".to_string()].into_iter().collect();

    let report = run_cycle(&home, &sources, &instances, &filtered).await;

    let tally = report.instances[0].outcome.as_ref().unwrap();
    assert_eq!(tally.boosted, 1);
    assert_eq!(tally.skipped, 1);
    assert_eq!(home.boost_log(), vec!["2"]);
}

#[tokio::test]
async fn media_only_instance_boosts_only_media_posts() {
    let home = MockHome::default();
    home.insert(
        "https://pix.example/p/1",
        resolved("1", "user@pix.example", false),
    );
    home.insert(
        "https://pix.example/p/2",
        resolved("2", "user@pix.example", true),
    );

    let mut sources = CannedSources::default();
    sources.feeds.insert(
        "pix.example".to_string(),
        vec![
            trending("https://pix.example/p/1", "user@pix.example"),
            trending("https://pix.example/p/2", "user@pix.example"),
        ],
    );
    let instances = vec![SourceInstance::new(
        "pix.example",
        10,
        Software::Pixelfed,
        true,
        false,
    )];

    let report = run_cycle(&home, &sources, &instances, &HashSet::new()).await;

    let tally = report.instances[0].outcome.as_ref().unwrap();
    assert_eq!(tally.boosted, 1);
    assert_eq!(tally.skipped, 1);
    assert_eq!(home.boost_log(), vec!["2"]);
}

#[tokio::test]
async fn unresolvable_post_is_counted_missing_and_cycle_continues() {
    let home = MockHome::default();
    // Only the second post resolves.
    home.insert(
        "https://src.example/p/2",
        resolved("2", "user@src.example", true),
    );

    let mut sources = CannedSources::default();
    sources.feeds.insert(
        "src.example".to_string(),
        vec![
            trending("https://src.example/p/1", "user@src.example"),
            trending("https://src.example/p/2", "user@src.example"),
        ],
    );
    let instances = vec![mastodon_instance("src.example", 10)];

    let report = run_cycle(&home, &sources, &instances, &HashSet::new()).await;

    let tally = report.instances[0].outcome.as_ref().unwrap();
    assert_eq!(tally.missing, 1);
    assert_eq!(tally.boosted, 1);
    assert_eq!(home.boost_log(), vec!["2"]);
}

// ============================================================
// Failure isolation
// ============================================================

#[tokio::test]
async fn failing_instance_does_not_affect_the_others() {
    let home = MockHome::default();
    for (n, host) in [("1", "first.example"), ("3", "third.example")] {
        home.insert(
            &format!("https://{host}/p/{n}"),
            resolved(n, &format!("user@{host}"), true),
        );
    }

    let mut sources = CannedSources::default();
    sources.feeds.insert(
        "first.example".to_string(),
        vec![trending("https://first.example/p/1", "user@first.example")],
    );
    sources.failing.insert("second.example".to_string());
    sources.feeds.insert(
        "third.example".to_string(),
        vec![trending("https://third.example/p/3", "user@third.example")],
    );

    let instances = vec![
        mastodon_instance("first.example", 10),
        mastodon_instance("second.example", 10),
        mastodon_instance("third.example", 10),
    ];

    let report = run_cycle(&home, &sources, &instances, &HashSet::new()).await;

    // Order preserved, middle instance errored, neighbors unaffected.
    assert_eq!(report.instances.len(), 3);
    assert!(report.instances[0].outcome.is_ok());
    assert!(report.instances[1].outcome.is_err());
    assert!(report.instances[2].outcome.is_ok());
    assert_eq!(report.boosted(), 2);
    assert_eq!(report.failed_instances(), 1);
    assert_eq!(home.boost_log(), vec!["1", "3"]);
}

#[tokio::test]
async fn boost_failure_aborts_only_that_instance() {
    // A home that fails the reblog call for one specific id.
    struct FlakyHome {
        inner: MockHome,
    }

    #[async_trait]
    impl HomeInstance for FlakyHome {
        async fn find_status(&self, uri: &str) -> Result<Option<ResolvedStatus>> {
            self.inner.find_status(uri).await
        }

        async fn boost(&self, status_id: &str) -> Result<()> {
            if status_id == "poison" {
                anyhow::bail!("HTTP 500");
            }
            self.inner.boost(status_id).await
        }
    }

    let home = FlakyHome {
        inner: MockHome::default(),
    };
    home.inner.insert(
        "https://a.example/p/1",
        resolved("poison", "user@a.example", true),
    );
    home.inner.insert(
        "https://b.example/p/1",
        resolved("ok", "user@b.example", true),
    );

    let mut sources = CannedSources::default();
    sources.feeds.insert(
        "a.example".to_string(),
        vec![trending("https://a.example/p/1", "user@a.example")],
    );
    sources.feeds.insert(
        "b.example".to_string(),
        vec![trending("https://b.example/p/1", "user@b.example")],
    );
    let instances = vec![
        mastodon_instance("a.example", 10),
        mastodon_instance("b.example", 10),
    ];

    let report = run_cycle(&home, &sources, &instances, &HashSet::new()).await;

    assert!(report.instances[0].outcome.is_err());
    assert!(report.instances[1].outcome.is_ok());
    assert_eq!(home.inner.boost_log(), vec!["ok"]);
}
