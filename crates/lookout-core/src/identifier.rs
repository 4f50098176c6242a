//! Identifiers and query types.
//!
//! An [`Identifier`] is the validated, normalized form of what a caller asked
//! about. Parsing is the only place input validation happens: anything that
//! reaches a probe has already been accepted here.

use crate::error::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::sync::OnceLock;

/// The kind of lookup being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    /// Handle on social or developer networks
    Username,
    /// Telephone number
    Phone,
    /// Email address
    Email,
    /// Domain name or IPv4 address
    Domain,
}

impl QueryType {
    /// All query types, in a stable order.
    pub const ALL: [QueryType; 4] = [Self::Username, Self::Phone, Self::Email, Self::Domain];

    /// Lower-case name used in cache keys and on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Username => "username",
            Self::Phone => "phone",
            Self::Email => "email",
            Self::Domain => "domain",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "username" => Ok(Self::Username),
            "phone" => Ok(Self::Phone),
            "email" => Ok(Self::Email),
            "domain" | "ip" => Ok(Self::Domain),
            other => Err(ValidationError::UnknownQueryType(other.to_string())),
        }
    }
}

/// Whether a domain-type query names an IPv4 address or a host name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    /// Dotted-quad IPv4 address
    Ip,
    /// DNS host name
    Domain,
}

/// A validated identifier, tagged by what it identifies.
///
/// Every variant keeps the caller's `raw` input alongside the `normalized`
/// form used for probing and cache addressing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identifier {
    /// `@`-stripped, lower-cased handle
    Username {
        /// Input as supplied
        raw: String,
        /// Normalized handle
        normalized: String,
    },
    /// Digits-only phone number
    PhoneNumber {
        /// Input as supplied
        raw: String,
        /// Digits only
        normalized: String,
    },
    /// Lower-cased email address
    EmailAddress {
        /// Input as supplied
        raw: String,
        /// Lower-cased address
        normalized: String,
    },
    /// Lower-cased host name or IPv4 address
    DomainOrIp {
        /// Input as supplied
        raw: String,
        /// Bare host, no scheme or path
        normalized: String,
        /// IP or domain classification
        target: TargetKind,
    },
}

impl Identifier {
    /// Validate and normalize `raw` as an identifier of `query_type`.
    ///
    /// # Errors
    /// Returns the matching [`ValidationError`] when the input is malformed
    /// for its type.
    pub fn parse(query_type: QueryType, raw: &str) -> Result<Self, ValidationError> {
        let raw_owned = raw.to_string();
        match query_type {
            QueryType::Username => {
                let normalized = normalize_username(raw);
                if normalized.is_empty() {
                    return Err(ValidationError::EmptyUsername);
                }
                Ok(Self::Username {
                    raw: raw_owned,
                    normalized,
                })
            }
            QueryType::Phone => {
                let normalized = normalize_phone(raw);
                if normalized.is_empty() {
                    return Err(ValidationError::InvalidPhone(raw_owned));
                }
                Ok(Self::PhoneNumber {
                    raw: raw_owned,
                    normalized,
                })
            }
            QueryType::Email => {
                let normalized = raw.trim().to_lowercase();
                if !is_valid_email(&normalized) {
                    return Err(ValidationError::InvalidEmail(raw_owned));
                }
                Ok(Self::EmailAddress {
                    raw: raw_owned,
                    normalized,
                })
            }
            QueryType::Domain => {
                let host = normalize_host(raw);
                let target = classify_target(&host)
                    .ok_or_else(|| ValidationError::InvalidDomain(raw_owned.clone()))?;
                // Leading-zero octets collapse so `008.8.8.8` and `8.8.8.8` are one address.
                let normalized = parse_ipv4(&host).map_or(host, |ip| ip.to_string());
                Ok(Self::DomainOrIp {
                    raw: raw_owned,
                    normalized,
                    target,
                })
            }
        }
    }

    /// The query type this identifier belongs to.
    #[must_use]
    pub fn query_type(&self) -> QueryType {
        match self {
            Self::Username { .. } => QueryType::Username,
            Self::PhoneNumber { .. } => QueryType::Phone,
            Self::EmailAddress { .. } => QueryType::Email,
            Self::DomainOrIp { .. } => QueryType::Domain,
        }
    }

    /// Input exactly as the caller supplied it.
    #[must_use]
    pub fn raw(&self) -> &str {
        match self {
            Self::Username { raw, .. }
            | Self::PhoneNumber { raw, .. }
            | Self::EmailAddress { raw, .. }
            | Self::DomainOrIp { raw, .. } => raw,
        }
    }

    /// Normalized form used for probing and cache keys.
    #[must_use]
    pub fn normalized(&self) -> &str {
        match self {
            Self::Username { normalized, .. }
            | Self::PhoneNumber { normalized, .. }
            | Self::EmailAddress { normalized, .. }
            | Self::DomainOrIp { normalized, .. } => normalized,
        }
    }

    /// IP/domain classification, for domain-type identifiers only.
    #[must_use]
    pub fn target(&self) -> Option<TargetKind> {
        match self {
            Self::DomainOrIp { target, .. } => Some(*target),
            _ => None,
        }
    }

    /// Local part and domain of an email identifier.
    #[must_use]
    pub fn email_parts(&self) -> Option<(&str, &str)> {
        match self {
            Self::EmailAddress { normalized, .. } => normalized.split_once('@'),
            _ => None,
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.query_type(), self.normalized())
    }
}

fn normalize_username(raw: &str) -> String {
    raw.trim().trim_start_matches('@').trim().to_lowercase()
}

fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Reduce a domain-ish input to a bare host: no scheme, path or trailing dot.
fn normalize_host(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let host = without_scheme.split('/').next().unwrap_or_default();
    host.trim_end_matches('.').to_string()
}

fn is_valid_email(candidate: &str) -> bool {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid regex")
    });
    regex.is_match(candidate)
}

/// Four dot-separated decimal octets, each in `[0, 255]`.
#[must_use]
pub fn is_valid_ip(candidate: &str) -> bool {
    parse_ipv4(candidate).is_some()
}

/// Parse dotted-quad IPv4, tolerating leading zeros in an octet.
///
/// `std`'s parser rejects `008.8.8.8`; this accepts it as `8.8.8.8`.
#[must_use]
pub fn parse_ipv4(candidate: &str) -> Option<Ipv4Addr> {
    let mut octets = [0u8; 4];
    let mut parts = candidate.split('.');
    for octet in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *octet = part.parse().ok()?;
    }
    if parts.next().is_some() {
        return None;
    }
    Some(Ipv4Addr::from(octets))
}

/// DNS label syntax ending in an alphabetic TLD of at least two letters.
#[must_use]
pub fn is_valid_domain(candidate: &str) -> bool {
    static DOMAIN_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = DOMAIN_REGEX.get_or_init(|| {
        Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,}$").expect("valid regex")
    });
    regex.is_match(&candidate.to_lowercase())
}

/// Classify a normalized host as an IP address or a domain name.
#[must_use]
pub fn classify_target(host: &str) -> Option<TargetKind> {
    if is_valid_ip(host) {
        Some(TargetKind::Ip)
    } else if is_valid_domain(host) {
        Some(TargetKind::Domain)
    } else {
        None
    }
}
