//! Per-source probes.
//!
//! A probe checks one identifier against one source and reduces whatever the
//! source answered to a [`ProbeResult`]. Probes report failures through
//! `Err`; the orchestrator turns those (and timeouts) into `error` results,
//! so a probe never has to build one itself.

pub mod domain;
pub mod email;
pub mod endpoint;
pub mod phone;
pub mod profile;

use crate::error::Result;
use async_trait::async_trait;
use lookout_core::{Identifier, ProbeResult};
use lookout_fetch::{AddressResolver, HttpFetcher};
use std::sync::Arc;

pub use domain::{AccessibilityProbe, AddressProbe, DnsSummaryProbe};
pub use email::{classify_provider, email_probes, FREE_MAIL_PROVIDERS};
pub use endpoint::EndpointProbe;
pub use phone::{phone_probes, MessagingLinkProbe};
pub use profile::{profile_probes, ProfileDefinition, ProfileProbe};

/// Capabilities shared by every probe of a request.
#[derive(Clone)]
pub struct ProbeContext {
    /// Outbound HTTP
    pub fetcher: Arc<dyn HttpFetcher>,
    /// Forward and reverse address lookups
    pub resolver: Arc<dyn AddressResolver>,
}

impl ProbeContext {
    /// Bundle the two capabilities.
    pub fn new(fetcher: Arc<dyn HttpFetcher>, resolver: Arc<dyn AddressResolver>) -> Self {
        Self { fetcher, resolver }
    }
}

/// A single source-specific check.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Source name reported in results.
    fn platform(&self) -> &str;

    /// URL this probe requests (or would request) for `identifier`.
    fn target_url(&self, identifier: &Identifier) -> String;

    /// Whether this probe has anything to say about `identifier`.
    fn applies_to(&self, _identifier: &Identifier) -> bool {
        true
    }

    /// Run the check.
    async fn check(&self, ctx: &ProbeContext, identifier: &Identifier) -> Result<ProbeResult>;
}
