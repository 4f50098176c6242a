use super::{EndpointProbe, Probe, ProbeContext};
use crate::error::{Result, ScanError};
use crate::url_builder::build_probe_url;
use async_trait::async_trait;
use lookout_core::{Fields, Found, Identifier, ProbeResult, ProbeStatus};
use std::sync::Arc;

const MESSAGING_LINKS: [(&str, &str); 3] = [
    ("WhatsApp", "https://wa.me/{digits}"),
    ("Viber", "viber://contact?number={digits}"),
    ("Telegram", "https://t.me/+{digits}"),
];

const DIRECTORY_ENDPOINTS: [(&str, &str); 3] = [
    ("Whitepages", "https://www.whitepages.com/phone/{digits}"),
    ("Truecaller", "https://www.truecaller.com/search/{digits}"),
    ("Spokeo", "https://www.spokeo.com/phone/{digits}"),
];

/// Builds a deep link into a messaging app without contacting it.
///
/// The result is always `unverified`: a link can be constructed for any
/// number, so it says nothing about whether an account exists.
#[derive(Debug, Clone)]
pub struct MessagingLinkProbe {
    platform: &'static str,
    url_template: &'static str,
}

impl MessagingLinkProbe {
    pub const fn new(platform: &'static str, url_template: &'static str) -> Self {
        Self {
            platform,
            url_template,
        }
    }
}

#[async_trait]
impl Probe for MessagingLinkProbe {
    fn platform(&self) -> &str {
        self.platform
    }

    fn target_url(&self, identifier: &Identifier) -> String {
        build_probe_url(self.url_template, identifier)
            .unwrap_or_else(|_| self.url_template.to_string())
    }

    async fn check(&self, _ctx: &ProbeContext, identifier: &Identifier) -> Result<ProbeResult> {
        let Identifier::PhoneNumber { normalized, .. } = identifier else {
            return Err(ScanError::UnsupportedIdentifier {
                platform: self.platform.to_string(),
                query_type: identifier.query_type(),
            });
        };

        let link = build_probe_url(self.url_template, identifier)?;
        let mut fields = Fields::new();
        fields.insert("link", &link);
        fields.insert("phone", format!("+{normalized}"));

        Ok(
            ProbeResult::new(self.platform, link, Found::Unknown, ProbeStatus::Unverified)
                .with_fields(fields),
        )
    }
}

/// Phone probes in registration order: messaging links, then directories.
pub fn phone_probes() -> Vec<Arc<dyn Probe>> {
    let links = MESSAGING_LINKS.into_iter().map(|(platform, template)| {
        Arc::new(MessagingLinkProbe::new(platform, template)) as Arc<dyn Probe>
    });
    let directories = DIRECTORY_ENDPOINTS.into_iter().map(|(platform, template)| {
        Arc::new(EndpointProbe::new(platform, template)) as Arc<dyn Probe>
    });
    links.chain(directories).collect()
}
