//! Sampling passes: discovery, concurrent stat fetches, publication.
//!
//! One pass lists the running containers, fetches a stats snapshot for
//! each of them concurrently with fail-fast semantics, normalizes the
//! snapshots, and publishes the results into the metric store. A pass is
//! all-or-nothing: if any single fetch fails, nothing is published and
//! the store keeps the previous pass's values.
//!
//! Passes never overlap. Reactive passes (triggered by a scrape) queue up
//! behind the in-flight one; proactive ticks from [`run_scheduler`] are
//! skipped instead.

use std::sync::Arc;
use std::time::Duration;

use crate::container::ContainerIdentity;
use crate::runtime::{self, ContainerSummary};
use crate::stats::{self, StatsSnapshot};
use crate::store::MetricStore;

pub struct Sampler {
    runtime: Arc<dyn runtime::Client>,
    store: Arc<MetricStore>,
    filter: Option<String>,
    // Single-flight guard; see the module docs.
    inflight: tokio::sync::Mutex<()>,
}

impl Sampler {
    pub fn new(
        runtime: Arc<dyn runtime::Client>,
        store: Arc<MetricStore>,
        filter: Option<String>,
    ) -> Self {
        Self {
            runtime,
            store,
            filter,
            inflight: tokio::sync::Mutex::new(()),
        }
    }

    /// Runs one sampling pass, waiting for an in-flight pass to finish
    /// first.
    ///
    /// # Errors
    ///
    /// Returns the runtime error that aborted the pass. The store is
    /// left untouched in that case.
    pub async fn sample(&self) -> runtime::Result<()> {
        let _guard = self.inflight.lock().await;
        self.run_pass().await
    }

    /// Runs one sampling pass unless one is already in flight, in which
    /// case the call is a no-op.
    pub async fn sample_if_idle(&self) -> runtime::Result<()> {
        match self.inflight.try_lock() {
            Ok(_guard) => self.run_pass().await,
            Err(_) => {
                log::debug!("sampling pass already in flight, skipping tick");
                Ok(())
            }
        }
    }

    async fn run_pass(&self) -> runtime::Result<()> {
        let containers = self.runtime.list(self.filter.as_deref()).await?;
        if containers.is_empty() {
            // Not an error: a name filter may legitimately match nothing.
            log::debug!("no containers matched, publishing an empty pass");
            self.store.publish(&[]);
            return Ok(());
        }

        let fetches = containers
            .iter()
            .filter(|container| !container.id.is_empty())
            .map(|container| {
                let runtime = Arc::clone(&self.runtime);
                async move {
                    let snapshot = runtime.stats(&container.id).await?;
                    Ok::<_, runtime::Error>((container, snapshot))
                }
            });
        let results = futures::future::try_join_all(fetches).await?;

        let entries: Vec<(ContainerIdentity, stats::DerivedMetrics)> = results
            .into_iter()
            .map(|(container, snapshot)| {
                (
                    identity_of(container, &snapshot),
                    stats::derive(&snapshot),
                )
            })
            .collect();

        log::trace!("publishing stats for {} containers", entries.len());
        self.store.publish(&entries);
        Ok(())
    }
}

/// Builds the label-set identity, preferring the snapshot's own name/id
/// over the listing entry (the daemon fills both; the snapshot wins so
/// renames between listing and fetch are reflected).
fn identity_of(container: &ContainerSummary, snapshot: &StatsSnapshot) -> ContainerIdentity {
    let name = snapshot
        .name
        .as_deref()
        .or_else(|| container.name())
        .unwrap_or("");
    let id = snapshot.id.as_deref().unwrap_or(&container.id);
    ContainerIdentity::new(name, id)
}

/// Drives proactive sampling: one pass immediately, then one per interval.
///
/// Ticks that fire while a pass is still in flight are skipped, not
/// queued.
pub async fn run_scheduler(sampler: Arc<Sampler>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        ticker.tick().await;
        if let Err(err) = sampler.sample_if_idle().await {
            log::error!("sampling pass failed: {err}");
        }
    }
}
