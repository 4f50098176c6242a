//! Per-type summary records built from collected probe results.

use crate::probes::classify_provider;
use crate::probes::domain::{ADDRESS_PLATFORM, DNS_PLATFORM, WEBSITE_PLATFORM};
use lookout_core::{DomainSummary, Identifier, ProbeResult, ProbeStatus, QueryDetails};

/// Build the [`QueryDetails`] record for `identifier`.
#[must_use]
pub fn build_details(identifier: &Identifier, results: &[ProbeResult]) -> QueryDetails {
    match identifier {
        Identifier::Username { .. } => QueryDetails::Username,
        Identifier::PhoneNumber { normalized, .. } => QueryDetails::Phone {
            digits: normalized.clone(),
            international: format!("+{normalized}"),
        },
        Identifier::EmailAddress { normalized, .. } => {
            let (local_part, domain) = normalized
                .split_once('@')
                .unwrap_or((normalized.as_str(), ""));
            QueryDetails::Email {
                local_part: local_part.to_string(),
                domain: domain.to_string(),
                provider: classify_provider(domain),
            }
        }
        Identifier::DomainOrIp {
            normalized, target, ..
        } => QueryDetails::Domain(summarize_domain(normalized, *target, results)),
    }
}

fn summarize_domain(
    host: &str,
    target: lookout_core::TargetKind,
    results: &[ProbeResult],
) -> DomainSummary {
    let by_platform = |platform: &str| results.iter().find(|r| r.platform == platform);
    let field = |platform: &str, key: &str| {
        by_platform(platform)
            .and_then(|r| r.fields.get(key))
            .map(str::to_string)
    };

    let website = by_platform(WEBSITE_PLATFORM);

    DomainSummary {
        target,
        host: host.to_string(),
        ip: field(ADDRESS_PLATFORM, "ip")
            .or_else(|| field(ADDRESS_PLATFORM, "ip_address"))
            .or_else(|| field(DNS_PLATFORM, "a_record")),
        hostname: field(ADDRESS_PLATFORM, "hostname"),
        subdomain: field(ADDRESS_PLATFORM, "subdomain"),
        main_domain: field(ADDRESS_PLATFORM, "main_domain"),
        accessible: website
            .filter(|r| r.status != ProbeStatus::Error)
            .map(|r| r.status == ProbeStatus::Accessible),
        cms: field(WEBSITE_PLATFORM, "cms"),
    }
}
