//! Domain and IP sub-analyses.
//!
//! Classification happens when the identifier is parsed. What remains is
//! address resolution (both kinds), homepage accessibility and a DNS summary
//! (domains only).

use super::{Probe, ProbeContext};
use crate::error::{Result, ScanError};
use crate::parser::HtmlPage;
use async_trait::async_trait;
use lookout_core::identifier::parse_ipv4;
use lookout_core::{Fields, Found, Identifier, ProbeResult, ProbeStatus, TargetKind};
use lookout_fetch::{FetchError, FetchedPage};
use std::net::IpAddr;

pub const ADDRESS_PLATFORM: &str = "Address";
pub const WEBSITE_PLATFORM: &str = "Website";
pub const DNS_PLATFORM: &str = "DNS";

/// CMS fingerprints, in priority order.
const CMS_MARKERS: [(&str, &str); 3] = [
    ("wordpress", "WordPress"),
    ("joomla", "Joomla"),
    ("drupal", "Drupal"),
];

fn host_of<'a>(platform: &str, identifier: &'a Identifier) -> Result<(&'a str, TargetKind)> {
    match identifier {
        Identifier::DomainOrIp {
            normalized, target, ..
        } => Ok((normalized, *target)),
        other => Err(ScanError::UnsupportedIdentifier {
            platform: platform.to_string(),
            query_type: other.query_type(),
        }),
    }
}

fn dns_url(host: &str) -> String {
    format!("dns:{host}")
}

/// Split a host into its subdomain labels and the last two labels.
pub fn split_domain(host: &str) -> (Option<String>, String) {
    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() > 2 {
        let cut = labels.len() - 2;
        (Some(labels[..cut].join(".")), labels[cut..].join("."))
    } else {
        (None, host.to_string())
    }
}

/// First case-insensitive CMS marker present in `body`.
pub fn detect_cms(body: &str) -> Option<&'static str> {
    let lowered = body.to_lowercase();
    CMS_MARKERS
        .iter()
        .find(|(marker, _)| lowered.contains(marker))
        .map(|(_, name)| *name)
}

/// Reverse lookup for an IP, forward lookup for a domain.
///
/// `found` means a host name (IP) or an address (domain) was resolved.
#[derive(Debug, Clone, Copy, Default)]
pub struct AddressProbe;

#[async_trait]
impl Probe for AddressProbe {
    fn platform(&self) -> &str {
        ADDRESS_PLATFORM
    }

    fn target_url(&self, identifier: &Identifier) -> String {
        dns_url(identifier.normalized())
    }

    async fn check(&self, ctx: &ProbeContext, identifier: &Identifier) -> Result<ProbeResult> {
        let (host, target) = host_of(ADDRESS_PLATFORM, identifier)?;
        let url = dns_url(host);
        let mut fields = Fields::new();

        match target {
            TargetKind::Ip => {
                fields.insert("ip", host);
                let ip = parse_ipv4(host)
                    .map(IpAddr::V4)
                    .ok_or_else(|| ScanError::InvalidAddress(host.to_string()))?;
                match ctx.resolver.reverse(ip).await {
                    Ok(hostname) => {
                        fields.insert("hostname", hostname);
                        Ok(ProbeResult::found(ADDRESS_PLATFORM, url, fields))
                    }
                    Err(FetchError::NoRecord(_)) => {
                        tracing::debug!(ip = %ip, "No PTR record");
                        Ok(ProbeResult::not_found(ADDRESS_PLATFORM, url).with_fields(fields))
                    }
                    Err(e) => Err(e.into()),
                }
            }
            TargetKind::Domain => {
                fields.insert("domain", host);
                let (subdomain, main_domain) = split_domain(host);
                if let Some(subdomain) = subdomain {
                    fields.insert("subdomain", subdomain);
                }
                fields.insert("main_domain", main_domain);

                match ctx.resolver.lookup_host(host).await {
                    Ok(ips) => {
                        let primary =
                            ips.iter().find(|ip| ip.is_ipv4()).or_else(|| ips.first());
                        if let Some(ip) = primary {
                            fields.insert("ip_address", ip.to_string());
                        }
                        Ok(ProbeResult::found(ADDRESS_PLATFORM, url, fields))
                    }
                    Err(FetchError::NoRecord(_)) => {
                        tracing::debug!(host, "No address record");
                        Ok(ProbeResult::not_found(ADDRESS_PLATFORM, url).with_fields(fields))
                    }
                    Err(e) => Err(e.into()),
                }
            }
        }
    }
}

/// GET the homepage over HTTPS and summarize it.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessibilityProbe;

impl AccessibilityProbe {
    /// Summarize a fetched homepage. Synchronous so the parsed document never
    /// crosses an await.
    pub fn interpret(url: String, page: &FetchedPage) -> ProbeResult {
        let mut fields = Fields::new();
        fields.insert("status_code", page.status.to_string());
        if let Some(content_type) = &page.content_type {
            fields.insert("content_type", content_type);
        }

        if !page.is_ok() {
            return ProbeResult::new(
                WEBSITE_PLATFORM,
                url,
                Found::Unknown,
                ProbeStatus::from_http(page.status),
            )
            .with_fields(fields);
        }

        let html = HtmlPage::parse(&page.body);
        if let Some(title) = html.title() {
            fields.insert("title", title);
        }
        if let Some(description) = html.meta_name("description") {
            fields.insert("description", description);
        }
        if let Ok(links) = html.count("a[href]") {
            fields.insert("total_links", links.to_string());
        }
        if let Some(cms) = detect_cms(&page.body) {
            fields.insert("cms", cms);
        }

        ProbeResult::found(WEBSITE_PLATFORM, url, fields)
    }
}

#[async_trait]
impl Probe for AccessibilityProbe {
    fn platform(&self) -> &str {
        WEBSITE_PLATFORM
    }

    fn target_url(&self, identifier: &Identifier) -> String {
        format!("https://{}", identifier.normalized())
    }

    fn applies_to(&self, identifier: &Identifier) -> bool {
        identifier.target() == Some(TargetKind::Domain)
    }

    async fn check(&self, ctx: &ProbeContext, identifier: &Identifier) -> Result<ProbeResult> {
        let (host, _) = host_of(WEBSITE_PLATFORM, identifier)?;
        let url = format!("https://{host}");
        let page = ctx.fetcher.get(&url).await?;
        Ok(Self::interpret(url, &page))
    }
}

/// Primary and full address set of a domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct DnsSummaryProbe;

#[async_trait]
impl Probe for DnsSummaryProbe {
    fn platform(&self) -> &str {
        DNS_PLATFORM
    }

    fn target_url(&self, identifier: &Identifier) -> String {
        dns_url(identifier.normalized())
    }

    fn applies_to(&self, identifier: &Identifier) -> bool {
        identifier.target() == Some(TargetKind::Domain)
    }

    async fn check(&self, ctx: &ProbeContext, identifier: &Identifier) -> Result<ProbeResult> {
        let (host, _) = host_of(DNS_PLATFORM, identifier)?;
        let url = dns_url(host);

        let ips = match ctx.resolver.lookup_host(host).await {
            Ok(ips) if !ips.is_empty() => ips,
            Ok(_) => return Ok(ProbeResult::not_found(DNS_PLATFORM, url)),
            Err(FetchError::NoRecord(_)) => {
                tracing::debug!(host, "DNS summary found no records");
                return Ok(ProbeResult::not_found(DNS_PLATFORM, url));
            }
            Err(e) => return Err(e.into()),
        };

        let mut unique: Vec<IpAddr> = Vec::with_capacity(ips.len());
        for ip in ips {
            if !unique.contains(&ip) {
                unique.push(ip);
            }
        }

        let mut fields = Fields::new();
        let primary = unique.iter().find(|ip| ip.is_ipv4()).or_else(|| unique.first());
        if let Some(a_record) = primary {
            fields.insert("a_record", a_record.to_string());
        }
        let all: Vec<String> = unique.iter().map(ToString::to_string).collect();
        fields.insert("all_ips", all.join(", "));

        Ok(ProbeResult::found(DNS_PLATFORM, url, fields))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookout_core::QueryType;

    #[test]
    fn test_split_domain() {
        assert_eq!(split_domain("example.com"), (None, "example.com".to_string()));
        assert_eq!(
            split_domain("a.b.example.com"),
            (Some("a.b".to_string()), "example.com".to_string())
        );
    }

    #[test]
    fn test_detect_cms_priority() {
        assert_eq!(detect_cms("<link href='/wp-content/'>WordPress</link>"), Some("WordPress"));
        assert_eq!(detect_cms("Powered by Drupal and joomla"), Some("Joomla"));
        assert_eq!(detect_cms("<html>plain</html>"), None);
    }

    #[test]
    fn test_accessibility_fields() {
        let body = r#"<html><head><title>Example Domain</title>
            <meta name="description" content="For use in examples"></head>
            <body><a href="https://www.iana.org/domains/example">More</a></body></html>"#;
        let mut page = FetchedPage::new(200, "https://example.com/", body);
        page.content_type = Some("text/html; charset=UTF-8".to_string());

        let result = AccessibilityProbe::interpret("https://example.com".into(), &page);
        assert_eq!(result.found, Found::Yes);
        assert_eq!(result.fields.get("status_code"), Some("200"));
        assert_eq!(result.fields.get("title"), Some("Example Domain"));
        assert_eq!(result.fields.get("description"), Some("For use in examples"));
        assert_eq!(result.fields.get("total_links"), Some("1"));
        assert!(!result.fields.contains_key("cms"));
    }

    #[test]
    fn test_accessibility_non_200() {
        let page = FetchedPage::new(503, "https://example.com/", "");
        let result = AccessibilityProbe::interpret("https://example.com".into(), &page);
        assert_eq!(result.found, Found::Unknown);
        assert_eq!(result.status, ProbeStatus::Http(503));
    }

    #[test]
    fn test_applicability() {
        let ip = Identifier::parse(QueryType::Domain, "8.8.8.8").unwrap();
        let domain = Identifier::parse(QueryType::Domain, "example.com").unwrap();
        assert!(AddressProbe.applies_to(&ip));
        assert!(!AccessibilityProbe.applies_to(&ip));
        assert!(!DnsSummaryProbe.applies_to(&ip));
        assert!(AccessibilityProbe.applies_to(&domain));
        assert!(DnsSummaryProbe.applies_to(&domain));
    }
}
