//! Profile-page probes.
//!
//! Each platform is described by a [`ProfileDefinition`]: where its profile
//! pages live, which body strings mean "no such profile", which strings must
//! be present before a page counts as a profile, and which meta tags or DOM
//! regions to lift into fields. One [`ProfileProbe`] interprets any of them.

use super::{Probe, ProbeContext};
use crate::error::Result;
use crate::parser::HtmlPage;
use crate::url_builder::build_probe_url;
use async_trait::async_trait;
use lookout_core::{Fields, Found, Identifier, ProbeResult, ProbeStatus};
use lookout_fetch::FetchedPage;
use std::sync::Arc;

/// Where a field value comes from.
#[derive(Debug, Clone, Copy)]
pub enum FieldSource {
    /// `<meta property="..." content="...">`
    MetaProperty(&'static str),
    /// `<meta name="..." content="...">`
    MetaName(&'static str),
    /// Text of the first element matching a CSS selector
    Text(&'static str),
}

/// A page-level label chosen by the first marker found in the page text.
#[derive(Debug, Clone, Copy)]
pub struct PageFlag {
    pub key: &'static str,
    /// `(marker, value)` pairs; markers are matched against lower-cased text.
    pub cases: &'static [(&'static str, &'static str)],
    pub fallback: Option<&'static str>,
}

/// Static description of one platform's profile pages.
#[derive(Debug, Clone, Copy)]
pub struct ProfileDefinition {
    pub platform: &'static str,
    pub url_template: &'static str,
    /// Lower-case strings whose presence means the profile does not exist.
    pub negative_markers: &'static [&'static str],
    /// Lower-case strings of which at least one must appear, if any are given.
    pub presence_markers: &'static [&'static str],
    pub fields: &'static [(&'static str, FieldSource)],
    pub flags: &'static [PageFlag],
}

pub const GITHUB: ProfileDefinition = ProfileDefinition {
    platform: "GitHub",
    url_template: "https://github.com/{query}",
    negative_markers: &[],
    presence_markers: &["p-nickname", "vcard-names"],
    fields: &[
        ("name", FieldSource::Text("span.p-name")),
        ("bio", FieldSource::Text("div.p-note")),
        ("location", FieldSource::Text("span.p-label")),
        ("company", FieldSource::Text("span.p-org")),
        ("website", FieldSource::Text("a.u-url")),
        ("profile_image", FieldSource::MetaProperty("og:image")),
        ("followers_link", FieldSource::Text(r#"a[href$="?tab=followers"]"#)),
    ],
    flags: &[],
};

pub const TWITTER: ProfileDefinition = ProfileDefinition {
    platform: "Twitter",
    url_template: "https://twitter.com/{query}",
    negative_markers: &["account suspended", "does not exist"],
    presence_markers: &[],
    fields: &[
        ("name", FieldSource::MetaProperty("og:title")),
        ("description", FieldSource::MetaProperty("og:description")),
    ],
    flags: &[],
};

pub const INSTAGRAM: ProfileDefinition = ProfileDefinition {
    platform: "Instagram",
    url_template: "https://instagram.com/{query}",
    negative_markers: &[],
    presence_markers: &["window._shareddata", "graphql"],
    fields: &[
        ("title", FieldSource::MetaProperty("og:title")),
        ("description", FieldSource::MetaProperty("og:description")),
    ],
    flags: &[PageFlag {
        key: "access_type",
        cases: &[("private", "Private")],
        fallback: Some("Public"),
    }],
};

pub const LINKEDIN: ProfileDefinition = ProfileDefinition {
    platform: "LinkedIn",
    url_template: "https://linkedin.com/in/{query}",
    negative_markers: &[],
    presence_markers: &[],
    fields: &[
        ("profile_title", FieldSource::MetaProperty("og:title")),
        ("description", FieldSource::MetaProperty("og:description")),
        ("profile_image", FieldSource::MetaProperty("og:image")),
    ],
    flags: &[PageFlag {
        key: "visibility",
        cases: &[("this profile is private", "Private")],
        fallback: Some("Public"),
    }],
};

pub const VK: ProfileDefinition = ProfileDefinition {
    platform: "VK",
    url_template: "https://vk.com/{query}",
    negative_markers: &["профиль удален", "page not found"],
    presence_markers: &[],
    fields: &[
        ("name", FieldSource::MetaProperty("og:title")),
        ("description", FieldSource::MetaProperty("og:description")),
        ("profile_image", FieldSource::MetaProperty("og:image")),
    ],
    flags: &[PageFlag {
        key: "online_status",
        cases: &[("онлайн", "Online"), ("был", "Recently online")],
        fallback: None,
    }],
};

pub const TELEGRAM: ProfileDefinition = ProfileDefinition {
    platform: "Telegram",
    url_template: "https://t.me/{query}",
    negative_markers: &["not-found"],
    presence_markers: &[],
    fields: &[
        ("name", FieldSource::MetaProperty("og:title")),
        ("description", FieldSource::MetaProperty("og:description")),
        ("profile_image", FieldSource::MetaProperty("og:image")),
    ],
    flags: &[PageFlag {
        key: "type",
        cases: &[("members", "Channel"), ("subscribers", "Channel")],
        fallback: Some("User"),
    }],
};

/// Built-in profile definitions in registration order.
pub const DEFAULT_PROFILES: [ProfileDefinition; 6] =
    [GITHUB, TWITTER, INSTAGRAM, LINKEDIN, VK, TELEGRAM];

/// Profile probes for the built-in definitions, in registration order.
pub fn profile_probes() -> Vec<Arc<dyn Probe>> {
    DEFAULT_PROFILES
        .into_iter()
        .map(|definition| Arc::new(ProfileProbe::new(definition)) as Arc<dyn Probe>)
        .collect()
}

/// Probe that interprets a profile page according to its definition.
#[derive(Debug, Clone)]
pub struct ProfileProbe {
    definition: ProfileDefinition,
}

impl ProfileProbe {
    pub const fn new(definition: ProfileDefinition) -> Self {
        Self { definition }
    }

    pub fn definition(&self) -> &ProfileDefinition {
        &self.definition
    }

    /// Classify a fetched page. Synchronous so the parsed document never
    /// crosses an await.
    pub fn interpret(&self, url: String, page: &FetchedPage) -> ProbeResult {
        let def = &self.definition;

        if page.is_not_found() {
            return ProbeResult::not_found(def.platform, url);
        }
        if !page.is_ok() {
            let status = ProbeStatus::Http(page.status);
            return ProbeResult::new(def.platform, url, Found::Unknown, status);
        }

        let lowered = page.body.to_lowercase();
        if def.negative_markers.iter().any(|m| lowered.contains(m)) {
            return ProbeResult::not_found(def.platform, url);
        }
        if !def.presence_markers.is_empty()
            && !def.presence_markers.iter().any(|m| lowered.contains(m))
        {
            return ProbeResult::new(def.platform, url, Found::Unknown, ProbeStatus::Accessible);
        }

        let html = HtmlPage::parse(&page.body);
        let mut fields = Fields::new();
        for (key, source) in def.fields {
            let value = match source {
                FieldSource::MetaProperty(property) => html.meta_property(property),
                FieldSource::MetaName(name) => html.meta_name(name),
                FieldSource::Text(css) => html.first_text(css).unwrap_or_else(|e| {
                    tracing::warn!(platform = def.platform, error = %e, "Bad field selector");
                    None
                }),
            };
            if let Some(value) = value {
                fields.insert(*key, value);
            }
        }

        if !def.flags.is_empty() {
            let text = html.text().to_lowercase();
            for flag in def.flags {
                let value = flag
                    .cases
                    .iter()
                    .find(|(marker, _)| text.contains(marker))
                    .map(|(_, value)| *value)
                    .or(flag.fallback);
                if let Some(value) = value {
                    fields.insert(flag.key, value);
                }
            }
        }

        ProbeResult::found(def.platform, url, fields)
    }
}

#[async_trait]
impl Probe for ProfileProbe {
    fn platform(&self) -> &str {
        self.definition.platform
    }

    fn target_url(&self, identifier: &Identifier) -> String {
        build_probe_url(self.definition.url_template, identifier)
            .unwrap_or_else(|_| self.definition.url_template.to_string())
    }

    async fn check(&self, ctx: &ProbeContext, identifier: &Identifier) -> Result<ProbeResult> {
        let url = build_probe_url(self.definition.url_template, identifier)?;
        let page = ctx.fetcher.get(&url).await?;
        let result = self.interpret(url, &page);

        tracing::debug!(
            platform = self.definition.platform,
            found = ?result.found,
            fields = result.fields.len(),
            "Profile checked"
        );

        Ok(result)
    }
}
