// Boost cycle: one full pass over the subscribed instances.
//
// Per instance: fetch trending -> resolve each post on the home
// instance -> apply the skip rules -> boost the survivors. Failures are
// contained at the instance boundary: a source that errors produces
// nothing this cycle and the pass moves on to the next one. No error
// escapes run_cycle.

use std::collections::HashSet;

use anyhow::Result;
use tracing::{error, info, warn};

use super::policy::skip_reason;
use super::traits::HomeInstance;
use crate::config::SourceInstance;
use crate::trending::traits::SourceDirectory;

/// What happened to one instance's trending posts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoostTally {
    pub boosted: usize,
    pub skipped: usize,
    /// Posts the home instance could not find via federated search.
    pub missing: usize,
}

impl BoostTally {
    /// Posts that reached a boost-or-skip decision.
    pub fn decided(&self) -> usize {
        self.boosted + self.skipped
    }
}

/// Per-instance outcome: a tally, or the error that cut the instance's
/// processing short.
#[derive(Debug)]
pub struct InstanceReport {
    pub instance: String,
    pub outcome: Result<BoostTally>,
}

/// Everything one cycle did, per instance in registry order.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub instances: Vec<InstanceReport>,
}

impl CycleReport {
    pub fn boosted(&self) -> usize {
        self.instances
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok())
            .map(|t| t.boosted)
            .sum()
    }

    pub fn skipped(&self) -> usize {
        self.instances
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok())
            .map(|t| t.skipped)
            .sum()
    }

    pub fn failed_instances(&self) -> usize {
        self.instances
            .iter()
            .filter(|r| r.outcome.is_err())
            .count()
    }
}

/// Run one boost cycle over all subscribed instances, in order.
///
/// Never fails: each instance's errors are logged with the instance
/// name and recorded in its report entry, and processing continues with
/// the next instance.
pub async fn run_cycle(
    home: &dyn HomeInstance,
    sources: &dyn SourceDirectory,
    instances: &[SourceInstance],
    filtered_servers: &HashSet<String>,
) -> CycleReport {
    info!("Run boost cycle");

    let mut report = CycleReport::default();
    for instance in instances {
        let outcome = process_instance(home, sources, instance, filtered_servers).await;
        if let Err(ref e) = outcome {
            error!(
                instance = %instance.name,
                error = %e,
                "{}: could not process instance - {e:#}",
                instance.name
            );
        }
        report.instances.push(InstanceReport {
            instance: instance.name.clone(),
            outcome,
        });
    }
    report
}

/// Process a single instance's trending posts. Any fetch, resolve, or
/// boost error aborts this instance and propagates to run_cycle.
async fn process_instance(
    home: &dyn HomeInstance,
    sources: &dyn SourceDirectory,
    instance: &SourceInstance,
    filtered_servers: &HashSet<String>,
) -> Result<BoostTally> {
    let source = sources.source_for(instance).await?;
    let trending = source.trending(instance.limit).await?;
    let total = trending.len();

    let mut tally = BoostTally::default();
    for (index, post) in trending.iter().enumerate() {
        let counter = index + 1;

        // Resolve to the home instance's copy; the reblog call needs
        // the local id, not the remote URI.
        let Some(status) = home.find_status(&post.uri).await? else {
            warn!(
                instance = %instance.name,
                uri = %post.uri,
                "{}: {counter}/{total} could not find post",
                instance.name
            );
            tally.missing += 1;
            continue;
        };

        match skip_reason(&status, instance, filtered_servers) {
            Some(reason) => {
                tally.skipped += 1;
                info!(
                    instance = %instance.name,
                    reason = %reason,
                    "{}: {counter}/{total} ignore",
                    instance.name
                );
            }
            None => {
                home.boost(&status.id).await?;
                tally.boosted += 1;
                info!(
                    instance = %instance.name,
                    "{}: {counter}/{total} boost",
                    instance.name
                );
            }
        }
    }

    Ok(tally)
}
