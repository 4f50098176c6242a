//! Lookup orchestrator.
//!
//! This module provides the `Orchestrator`, the single entry point for
//! resolving an identifier. A request moves through
//! `validate -> cache check -> dispatch -> collect -> persist`:
//!
//! - validation failures return immediately and are never cached
//! - cache hits return the stored result with `from_cache` set
//! - every applicable probe runs concurrently; a failing or slow probe yields
//!   its own `error` result without cancelling or delaying the others
//! - results are reported in registration order regardless of completion order

use crate::assembly::build_details;
use crate::probes::{Probe, ProbeContext};
use crate::registry::ProbeRegistry;
use futures::stream::{FuturesUnordered, StreamExt};
use lookout_cache::CacheStore;
use lookout_core::{AggregateResult, Identifier, ProbingConfig, ProbeResult, QueryType};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Default per-probe timeout.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(10);

/// Error message recorded for probes cut off by the request deadline.
pub const DEADLINE_EXCEEDED: &str = "request deadline exceeded";

/// Resolves identifiers into [`AggregateResult`]s.
pub struct Orchestrator {
    /// Probe set per query type
    registry: Arc<ProbeRegistry>,
    /// Capabilities handed to every probe
    context: ProbeContext,
    /// Result cache, if caching is enabled
    cache: Option<Arc<dyn CacheStore>>,
    /// Bound on each probe
    probe_timeout: Duration,
    /// Bound on the whole fan-out
    request_deadline: Option<Duration>,
    /// Cap on probes in flight
    max_concurrent_probes: Option<usize>,
}

impl Orchestrator {
    /// Create an orchestrator with the default probe timeout and no deadline.
    #[must_use]
    pub fn new(
        registry: Arc<ProbeRegistry>,
        context: ProbeContext,
        cache: Option<Arc<dyn CacheStore>>,
    ) -> Self {
        Self {
            registry,
            context,
            cache,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            request_deadline: None,
            max_concurrent_probes: None,
        }
    }

    /// Create an orchestrator with timeouts and limits from `config`.
    #[must_use]
    pub fn from_config(
        config: &ProbingConfig,
        registry: Arc<ProbeRegistry>,
        context: ProbeContext,
        cache: Option<Arc<dyn CacheStore>>,
    ) -> Self {
        Self::new(registry, context, cache)
            .with_probe_timeout(config.timeout())
            .with_request_deadline(config.request_deadline())
            .with_max_concurrent_probes(config.concurrency_limit())
    }

    /// Set the per-probe timeout.
    #[must_use]
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Set (or clear) the whole-request deadline.
    #[must_use]
    pub fn with_request_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.request_deadline = deadline;
        self
    }

    /// Set (or clear) the cap on concurrently running probes.
    #[must_use]
    pub fn with_max_concurrent_probes(mut self, max: Option<usize>) -> Self {
        self.max_concurrent_probes = max.filter(|&n| n > 0);
        self
    }

    /// Resolve `raw` as an identifier of `query_type`, using the cache.
    ///
    /// Never fails: malformed input yields a result carrying `error`, and
    /// probe or cache failures are absorbed into the result.
    pub async fn resolve(&self, query_type: QueryType, raw: &str) -> AggregateResult {
        self.resolve_with(query_type, raw, true).await
    }

    /// Like [`resolve`](Self::resolve) but skips the cache read. The fresh
    /// result still replaces any cached one.
    pub async fn resolve_fresh(&self, query_type: QueryType, raw: &str) -> AggregateResult {
        self.resolve_with(query_type, raw, false).await
    }

    async fn resolve_with(
        &self,
        query_type: QueryType,
        raw: &str,
        read_cache: bool,
    ) -> AggregateResult {
        let identifier = match Identifier::parse(query_type, raw) {
            Ok(identifier) => identifier,
            Err(e) => {
                tracing::info!(%query_type, error = %e, "Rejected malformed input");
                return AggregateResult::invalid(query_type, raw, &e);
            }
        };

        if read_cache {
            if let Some(cache) = &self.cache {
                if let Some(mut hit) = cache.get(identifier.normalized(), query_type).await {
                    tracing::debug!(%identifier, "Cache hit");
                    hit.from_cache = true;
                    return hit;
                }
                tracing::debug!(%identifier, "Cache miss");
            }
        }

        tracing::info!(%identifier, "Resolving");

        let results = self.run_probes(&identifier).await;
        let details = build_details(&identifier, &results);
        let result = AggregateResult::from_probe_results(identifier, results, Some(details));

        tracing::info!(
            %query_type,
            query = %result.query,
            checked = result.total_checked,
            found = result.total_found,
            succeeded = result.succeeded,
            "Resolved"
        );

        if let Some(cache) = &self.cache {
            if !cache.set(&result.query, query_type, &result).await {
                tracing::debug!(query = %result.query, "Result not cached");
            }
        }

        result
    }

    /// Run every applicable probe and collect results in registration order.
    async fn run_probes(&self, identifier: &Identifier) -> Vec<ProbeResult> {
        let probes = self.registry.probes_for(identifier);
        if probes.is_empty() {
            tracing::warn!(query_type = %identifier.query_type(), "No probes registered");
            return Vec::new();
        }

        let deadline = self.request_deadline.map(|d| Instant::now() + d);
        let limit = self.max_concurrent_probes.unwrap_or(probes.len());

        let mut slots: Vec<Option<ProbeResult>> = vec![None; probes.len()];
        let mut in_flight = FuturesUnordered::new();

        for (index, probe) in probes.iter().enumerate() {
            in_flight.push(self.run_probe(index, probe.as_ref(), identifier, deadline));

            // Respect concurrency limit
            while in_flight.len() >= limit {
                if let Some((index, result)) = in_flight.next().await {
                    slots[index] = Some(result);
                }
            }
        }

        while let Some((index, result)) = in_flight.next().await {
            slots[index] = Some(result);
        }

        slots.into_iter().flatten().collect()
    }

    /// Run one probe under the probe timeout and request deadline.
    ///
    /// Every failure mode becomes an `error` result.
    async fn run_probe(
        &self,
        index: usize,
        probe: &dyn Probe,
        identifier: &Identifier,
        deadline: Option<Instant>,
    ) -> (usize, ProbeResult) {
        let platform = probe.platform();
        let bounded =
            tokio::time::timeout(self.probe_timeout, probe.check(&self.context, identifier));

        let outcome = match deadline {
            Some(deadline) => match tokio::time::timeout_at(deadline, bounded).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    tracing::debug!(platform, "Probe cut off by request deadline");
                    let url = probe.target_url(identifier);
                    return (index, ProbeResult::error(platform, url, DEADLINE_EXCEEDED));
                }
            },
            None => bounded.await,
        };

        let result = match outcome {
            Ok(Ok(result)) => result,
            Ok(Err(e)) => {
                tracing::debug!(platform, error = %e, "Probe failed");
                ProbeResult::error(platform, probe.target_url(identifier), e.to_string())
            }
            Err(_) => {
                tracing::debug!(platform, timeout = ?self.probe_timeout, "Probe timed out");
                ProbeResult::error(
                    platform,
                    probe.target_url(identifier),
                    format!("timed out after {:?}", self.probe_timeout),
                )
            }
        };

        (index, result)
    }
}
