//! Offline stand-ins for the network capabilities and for probes.

#![allow(dead_code)]

use async_trait::async_trait;
use lookout_core::{Fields, Identifier, ProbeResult};
use lookout_fetch::{AddressResolver, FetchError, FetchedPage, HttpFetcher};
use lookout_scanner::{Probe, ProbeContext, ScanError};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Canned HTTP responses keyed by exact URL. Unknown URLs answer 404.
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, FetchedPage>,
    failures: HashMap<String, String>,
    requested: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, status: u16, body: &str) -> Self {
        self.pages
            .insert(url.to_string(), FetchedPage::new(status, url, body));
        self
    }

    pub fn failing(mut self, url: &str, message: &str) -> Self {
        self.failures.insert(url.to_string(), message.to_string());
        self
    }

    pub fn requested(&self) -> Vec<String> {
        self.requested.lock().unwrap().clone()
    }
}

#[async_trait]
impl HttpFetcher for StubFetcher {
    async fn get(&self, url: &str) -> lookout_fetch::Result<FetchedPage> {
        self.requested.lock().unwrap().push(url.to_string());
        if let Some(message) = self.failures.get(url) {
            return Err(FetchError::Request(message.clone()));
        }
        Ok(self
            .pages
            .get(url)
            .cloned()
            .unwrap_or_else(|| FetchedPage::new(404, url, "")))
    }
}

/// Fixed forward and reverse tables. Anything else fails to resolve.
#[derive(Default)]
pub struct StubResolver {
    forward: HashMap<String, Vec<IpAddr>>,
    reverse: HashMap<IpAddr, String>,
    broken: HashMap<String, String>,
}

impl StubResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn host(mut self, host: &str, ips: &[&str]) -> Self {
        let ips = ips.iter().map(|ip| ip.parse().unwrap()).collect();
        self.forward.insert(host.to_string(), ips);
        self
    }

    pub fn ptr(mut self, ip: &str, hostname: &str) -> Self {
        self.reverse.insert(ip.parse().unwrap(), hostname.to_string());
        self
    }

    /// Lookups of `subject` (a host or an IP) fail with a transient error.
    pub fn broken(mut self, subject: &str, message: &str) -> Self {
        self.broken.insert(subject.to_string(), message.to_string());
        self
    }

    fn failure(&self, subject: &str) -> Option<FetchError> {
        self.broken
            .get(subject)
            .map(|message| FetchError::Resolve(format!("{subject}: {message}")))
    }
}

#[async_trait]
impl AddressResolver for StubResolver {
    async fn lookup_host(&self, host: &str) -> lookout_fetch::Result<Vec<IpAddr>> {
        if let Some(err) = self.failure(host) {
            return Err(err);
        }
        self.forward
            .get(host)
            .cloned()
            .ok_or_else(|| FetchError::NoRecord(host.to_string()))
    }

    async fn reverse(&self, ip: IpAddr) -> lookout_fetch::Result<String> {
        if let Some(err) = self.failure(&ip.to_string()) {
            return Err(err);
        }
        self.reverse
            .get(&ip)
            .cloned()
            .ok_or_else(|| FetchError::NoRecord(ip.to_string()))
    }
}

pub fn context(fetcher: StubFetcher, resolver: StubResolver) -> ProbeContext {
    ProbeContext::new(Arc::new(fetcher), Arc::new(resolver))
}

pub fn offline_context() -> ProbeContext {
    context(StubFetcher::new(), StubResolver::new())
}

/// What a [`ScriptedProbe`] does once its delay has elapsed.
#[derive(Debug, Clone, Copy)]
pub enum Outcome {
    Found,
    NotFound,
    Fail,
    Hang,
}

/// Probe with a fixed delay and outcome that counts its invocations and
/// tracks how many scripted probes are in flight at once.
pub struct ScriptedProbe {
    name: String,
    delay: Duration,
    outcome: Outcome,
    calls: Arc<AtomicUsize>,
    gauge: Option<Arc<Gauge>>,
}

impl ScriptedProbe {
    pub fn new(name: &str, outcome: Outcome) -> Self {
        Self {
            name: name.to_string(),
            delay: Duration::ZERO,
            outcome,
            calls: Arc::new(AtomicUsize::new(0)),
            gauge: None,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn counted(mut self, calls: &Arc<AtomicUsize>) -> Self {
        self.calls = Arc::clone(calls);
        self
    }

    pub fn gauged(mut self, gauge: &Arc<Gauge>) -> Self {
        self.gauge = Some(Arc::clone(gauge));
        self
    }
}

#[async_trait]
impl Probe for ScriptedProbe {
    fn platform(&self) -> &str {
        &self.name
    }

    fn target_url(&self, identifier: &Identifier) -> String {
        format!("https://{}.test/{}", self.name.to_lowercase(), identifier.normalized())
    }

    async fn check(
        &self,
        _ctx: &ProbeContext,
        identifier: &Identifier,
    ) -> lookout_scanner::Result<ProbeResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _guard = self.gauge.as_ref().map(|g| g.enter());

        tokio::time::sleep(self.delay).await;

        let url = self.target_url(identifier);
        match self.outcome {
            Outcome::Found => {
                let mut fields = Fields::new();
                fields.insert("name", &self.name);
                fields.insert("avatar", format!("https://img.test/{}.png", self.name));
                Ok(ProbeResult::found(&self.name, url, fields))
            }
            Outcome::NotFound => Ok(ProbeResult::not_found(&self.name, url)),
            Outcome::Fail => Err(ScanError::Fetch(FetchError::Request(
                "connection reset".to_string(),
            ))),
            Outcome::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(ProbeResult::found(&self.name, url, Fields::new()))
            }
        }
    }
}

/// Tracks current and peak concurrency.
#[derive(Default)]
pub struct Gauge {
    current: AtomicUsize,
    peak: AtomicUsize,
}

impl Gauge {
    pub fn enter(&self) -> GaugeGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        GaugeGuard(self)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

pub struct GaugeGuard<'a>(&'a Gauge);

impl Drop for GaugeGuard<'_> {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}
