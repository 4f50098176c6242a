use super::{Probe, ProbeContext};
use crate::error::Result;
use crate::url_builder::build_probe_url;
use async_trait::async_trait;
use lookout_core::{Found, Identifier, ProbeResult, ProbeStatus};

/// Reachability check of a search or lookup endpoint.
///
/// Only the status code is used: 200 is `accessible`, 404 is `not_found`,
/// anything else is `http_<code>`. Existence is never inferred.
#[derive(Debug, Clone)]
pub struct EndpointProbe {
    platform: &'static str,
    url_template: &'static str,
}

impl EndpointProbe {
    pub const fn new(platform: &'static str, url_template: &'static str) -> Self {
        Self {
            platform,
            url_template,
        }
    }
}

/// Map a status code onto a verdict and coarse status.
pub fn classify_status(code: u16) -> (Found, ProbeStatus) {
    let status = ProbeStatus::from_http(code);
    let found = if status == ProbeStatus::NotFound {
        Found::No
    } else {
        Found::Unknown
    };
    (found, status)
}

#[async_trait]
impl Probe for EndpointProbe {
    fn platform(&self) -> &str {
        self.platform
    }

    fn target_url(&self, identifier: &Identifier) -> String {
        build_probe_url(self.url_template, identifier)
            .unwrap_or_else(|_| self.url_template.to_string())
    }

    async fn check(&self, ctx: &ProbeContext, identifier: &Identifier) -> Result<ProbeResult> {
        let url = build_probe_url(self.url_template, identifier)?;
        let page = ctx.fetcher.get(&url).await?;
        let (found, status) = classify_status(page.status);

        tracing::debug!(platform = self.platform, status = %status, "Endpoint checked");

        Ok(ProbeResult::new(self.platform, url, found, status))
    }
}
