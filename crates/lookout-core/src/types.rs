//! Normalized result schema shared by probes, the cache and renderers.
//!
//! [`AggregateResult`] is the wire contract handed to front-ends. Its
//! constructors keep the counting invariants (`total_checked`, `total_found`,
//! `succeeded`) consistent with the contained probe results.

use crate::error::ValidationError;
use crate::identifier::{Identifier, QueryType, TargetKind};
use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Tri-state existence verdict. Serialized as `true`, `false` or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Found {
    /// The identifier exists on the source
    Yes,
    /// The source reported the identifier absent
    No,
    /// The probe could not tell
    #[default]
    Unknown,
}

impl From<Option<bool>> for Found {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Yes,
            Some(false) => Self::No,
            None => Self::Unknown,
        }
    }
}

impl From<Found> for Option<bool> {
    fn from(value: Found) -> Self {
        match value {
            Found::Yes => Some(true),
            Found::No => Some(false),
            Found::Unknown => None,
        }
    }
}

/// Coarse outcome of a single probe.
///
/// Serialized as `accessible`, `not_found`, `error`, `unknown`, `unverified`
/// or `http_<code>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ProbeStatus {
    /// Source answered 200
    Accessible,
    /// Source answered 404 or otherwise reported absence
    NotFound,
    /// Network, timeout, decode or parse failure
    Error,
    /// No classification was possible
    Unknown,
    /// A link was constructed without any verification request
    Unverified,
    /// Any other HTTP status
    Http(u16),
}

impl ProbeStatus {
    /// Map an HTTP status code onto the coarse status set.
    #[must_use]
    pub fn from_http(code: u16) -> Self {
        match code {
            200 => Self::Accessible,
            404 => Self::NotFound,
            other => Self::Http(other),
        }
    }
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accessible => f.write_str("accessible"),
            Self::NotFound => f.write_str("not_found"),
            Self::Error => f.write_str("error"),
            Self::Unknown => f.write_str("unknown"),
            Self::Unverified => f.write_str("unverified"),
            Self::Http(code) => write!(f, "http_{code}"),
        }
    }
}

impl FromStr for ProbeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, String> {
        match s {
            "accessible" => Ok(Self::Accessible),
            "not_found" => Ok(Self::NotFound),
            "error" => Ok(Self::Error),
            "unknown" => Ok(Self::Unknown),
            "unverified" => Ok(Self::Unverified),
            other => other
                .strip_prefix("http_")
                .and_then(|code| code.parse().ok())
                .map(Self::Http)
                .ok_or_else(|| format!("unrecognised probe status: {other:?}")),
        }
    }
}

impl From<ProbeStatus> for String {
    fn from(value: ProbeStatus) -> Self {
        value.to_string()
    }
}

impl TryFrom<String> for ProbeStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, String> {
        value.parse()
    }
}

/// Insertion-ordered string map of best-effort extracted attributes.
///
/// Empty values are dropped on insert, and re-inserting a key replaces its
/// value without moving it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, String)>);

impl Fields {
    /// Create an empty field set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a trimmed value; blank values are ignored.
    pub fn insert(&mut self, key: impl Into<String>, value: impl AsRef<str>) {
        let value = value.as_ref().trim();
        if value.is_empty() {
            return;
        }
        let key = key.into();
        match self.0.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value.to_string(),
            None => self.0.push((key, value.to_string())),
        }
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }

    /// Whether `key` is present.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: AsRef<str>> FromIterator<(K, V)> for Fields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Fields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FieldsVisitor;

        impl<'de> Visitor<'de> for FieldsVisitor {
            type Value = Fields;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of string fields")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Fields, A::Error> {
                let mut fields = Fields::new();
                while let Some((key, value)) = access.next_entry::<String, String>()? {
                    fields.insert(key, value);
                }
                Ok(fields)
            }
        }

        deserializer.deserialize_map(FieldsVisitor)
    }
}

/// Outcome of one probe against one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Source name, e.g. `GitHub`
    pub platform: String,
    /// URL that was (or would be) requested
    pub source_url: String,
    /// Existence verdict
    pub found: Found,
    /// Coarse status
    pub status: ProbeStatus,
    /// Extracted attributes; empty or advisory unless `found` is `Yes`
    #[serde(default, skip_serializing_if = "Fields::is_empty")]
    pub fields: Fields,
    /// Failure message when `status` is `Error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProbeResult {
    /// A result with the given verdict and status and no fields.
    #[must_use]
    pub fn new(
        platform: impl Into<String>,
        source_url: impl Into<String>,
        found: Found,
        status: ProbeStatus,
    ) -> Self {
        Self {
            platform: platform.into(),
            source_url: source_url.into(),
            found,
            status,
            fields: Fields::new(),
            error: None,
        }
    }

    /// The identifier exists; attach whatever was extracted.
    #[must_use]
    pub fn found(
        platform: impl Into<String>,
        source_url: impl Into<String>,
        fields: Fields,
    ) -> Self {
        Self::new(platform, source_url, Found::Yes, ProbeStatus::Accessible).with_fields(fields)
    }

    /// The source reported the identifier absent.
    #[must_use]
    pub fn not_found(platform: impl Into<String>, source_url: impl Into<String>) -> Self {
        Self::new(platform, source_url, Found::No, ProbeStatus::NotFound)
    }

    /// The probe failed; the verdict is unknown and no fields are kept.
    #[must_use]
    pub fn error(
        platform: impl Into<String>,
        source_url: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::new(platform, source_url, Found::Unknown, ProbeStatus::Error)
        }
    }

    /// Replace the field set.
    #[must_use]
    pub fn with_fields(mut self, fields: Fields) -> Self {
        self.fields = fields;
        self
    }

    /// Whether the verdict is `Found::Yes`.
    #[must_use]
    pub fn is_found(&self) -> bool {
        self.found == Found::Yes
    }
}

/// Free-mail or organisational email domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmailProvider {
    /// Public free-mail service
    Free,
    /// Any other domain
    Corporate,
}

/// Summary of the domain/IP sub-analyses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainSummary {
    /// IP or domain classification
    pub target: TargetKind,
    /// The normalized host that was analysed
    pub host: String,
    /// Resolved (or given) IPv4 address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Reverse-resolved host name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    /// Labels left of the registrable domain
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdomain: Option<String>,
    /// Last two labels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main_domain: Option<String>,
    /// Whether the homepage answered 200
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accessible: Option<bool>,
    /// Fingerprinted CMS
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms: Option<String>,
}

/// Per-query-type record with a fixed optional-field set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryDetails {
    /// Username lookups carry no extra summary
    Username,
    /// Phone number forms
    Phone {
        /// Digits only
        digits: String,
        /// `+` followed by the digits
        international: String,
    },
    /// Email address breakdown
    Email {
        /// Part before `@`
        local_part: String,
        /// Part after `@`
        domain: String,
        /// Provider classification of `domain`
        provider: EmailProvider,
    },
    /// Domain/IP analysis summary
    Domain(DomainSummary),
}

/// Normalized bundle of all probe outcomes for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateResult {
    /// Normalized query, or the raw input when validation failed
    pub query: String,
    /// Query type discriminant
    pub query_type: QueryType,
    /// Parsed identifier; absent only for validation errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,
    /// Probe outcomes in registration order
    pub probe_results: Vec<ProbeResult>,
    /// Always `probe_results.len()`
    pub total_checked: usize,
    /// Number of results with `found == Yes`
    pub total_found: usize,
    /// Whether the lookup produced a usable signal
    pub succeeded: bool,
    /// Set by the orchestrator on cache hits
    pub from_cache: bool,
    /// Type-specific summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<QueryDetails>,
    /// Input validation failure message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the probes ran
    pub checked_at: DateTime<Utc>,
}

impl AggregateResult {
    /// Assemble a result from collected probe outcomes.
    #[must_use]
    pub fn from_probe_results(
        identifier: Identifier,
        probe_results: Vec<ProbeResult>,
        details: Option<QueryDetails>,
    ) -> Self {
        let query_type = identifier.query_type();
        let total_found = probe_results.iter().filter(|r| r.is_found()).count();
        let succeeded = succeeded_for(query_type, &probe_results, total_found);

        Self {
            query: identifier.normalized().to_string(),
            query_type,
            identifier: Some(identifier),
            total_checked: probe_results.len(),
            total_found,
            succeeded,
            from_cache: false,
            details,
            error: None,
            checked_at: Utc::now(),
            probe_results,
        }
    }

    /// A result for input rejected before any probe ran.
    #[must_use]
    pub fn invalid(query_type: QueryType, raw: &str, error: &ValidationError) -> Self {
        Self {
            query: raw.to_string(),
            query_type,
            identifier: None,
            probe_results: Vec::new(),
            total_checked: 0,
            total_found: 0,
            succeeded: false,
            from_cache: false,
            details: None,
            error: Some(error.to_string()),
            checked_at: Utc::now(),
        }
    }

    /// Whether this is a validation-error result.
    #[must_use]
    pub fn is_invalid(&self) -> bool {
        self.identifier.is_none() && self.error.is_some()
    }
}

/// Success rule per query type.
///
/// Username and domain lookups succeed when something was found. Email and
/// phone probes never confirm existence, so they succeed when at least one
/// endpoint answered or one link was constructed.
fn succeeded_for(query_type: QueryType, results: &[ProbeResult], total_found: usize) -> bool {
    match query_type {
        QueryType::Username | QueryType::Domain => total_found > 0,
        QueryType::Email => results.iter().any(|r| r.status == ProbeStatus::Accessible),
        QueryType::Phone => results.iter().any(|r| {
            matches!(r.status, ProbeStatus::Unverified | ProbeStatus::Accessible)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn username() -> Identifier {
        Identifier::parse(QueryType::Username, "octocat").expect("valid username")
    }

    #[test]
    fn test_found_serializes_as_nullable_bool() {
        assert_eq!(serde_json::to_string(&Found::Yes).unwrap(), "true");
        assert_eq!(serde_json::to_string(&Found::No).unwrap(), "false");
        assert_eq!(serde_json::to_string(&Found::Unknown).unwrap(), "null");
        let parsed: Found = serde_json::from_str("null").unwrap();
        assert_eq!(parsed, Found::Unknown);
    }

    #[test]
    fn test_probe_status_strings() {
        assert_eq!(ProbeStatus::from_http(200), ProbeStatus::Accessible);
        assert_eq!(ProbeStatus::from_http(404), ProbeStatus::NotFound);
        assert_eq!(ProbeStatus::from_http(429).to_string(), "http_429");
        assert_eq!("http_503".parse::<ProbeStatus>(), Ok(ProbeStatus::Http(503)));
        assert!("http_abc".parse::<ProbeStatus>().is_err());
        assert!("found".parse::<ProbeStatus>().is_err());

        let json = serde_json::to_string(&ProbeStatus::NotFound).unwrap();
        assert_eq!(json, "\"not_found\"");
    }

    #[test]
    fn test_fields_keep_insertion_order() {
        let mut fields = Fields::new();
        fields.insert("name", "The Octocat");
        fields.insert("bio", "  ");
        fields.insert("location", "San Francisco");
        fields.insert("name", "Mona");

        let keys: Vec<&str> = fields.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["name", "location"]);
        assert_eq!(fields.get("name"), Some("Mona"));

        let json = serde_json::to_string(&fields).unwrap();
        assert_eq!(json, r#"{"name":"Mona","location":"San Francisco"}"#);
        let back: Fields = serde_json::from_str(&json).unwrap();
        assert_eq!(back, fields);
    }

    #[test]
    fn test_error_result_has_no_fields() {
        let result = ProbeResult::error("GitHub", "https://github.com/x", "timed out");
        assert_eq!(result.found, Found::Unknown);
        assert_eq!(result.status, ProbeStatus::Error);
        assert!(result.fields.is_empty());
        assert_eq!(result.error.as_deref(), Some("timed out"));
    }

    #[test]
    fn test_aggregate_counts() {
        let results = vec![
            ProbeResult::found("GitHub", "https://github.com/octocat", Fields::new()),
            ProbeResult::not_found("Twitter", "https://twitter.com/octocat"),
            ProbeResult::error("VK", "https://vk.com/octocat", "boom"),
        ];
        let aggregate = AggregateResult::from_probe_results(username(), results, None);

        assert_eq!(aggregate.total_checked, 3);
        assert_eq!(aggregate.total_found, 1);
        assert!(aggregate.succeeded);
        assert!(!aggregate.from_cache);
        assert_eq!(aggregate.query, "octocat");
    }

    #[test]
    fn test_empty_aggregate_did_not_succeed() {
        let aggregate = AggregateResult::from_probe_results(username(), Vec::new(), None);
        assert_eq!(aggregate.total_checked, 0);
        assert!(!aggregate.succeeded);
    }

    #[test]
    fn test_email_success_rule() {
        let id = Identifier::parse(QueryType::Email, "a@example.com").unwrap();
        let results = vec![ProbeResult::new(
            "Reddit",
            "https://www.reddit.com/search/?q=a%40example.com",
            Found::Unknown,
            ProbeStatus::Accessible,
        )];
        let aggregate = AggregateResult::from_probe_results(id, results, None);
        assert_eq!(aggregate.total_found, 0);
        assert!(aggregate.succeeded);
    }

    #[test]
    fn test_invalid_result() {
        let err = ValidationError::InvalidEmail("not-an-email".to_string());
        let aggregate = AggregateResult::invalid(QueryType::Email, "not-an-email", &err);
        assert!(aggregate.is_invalid());
        assert!(!aggregate.succeeded);
        assert_eq!(aggregate.total_checked, 0);
    }

    #[test]
    fn test_aggregate_round_trip_is_lossless() {
        let mut fields = Fields::new();
        fields.insert("profile_image", "https://avatars.example/u/1");
        let results = vec![ProbeResult::found("GitHub", "https://github.com/octocat", fields)];
        let aggregate =
            AggregateResult::from_probe_results(username(), results, Some(QueryDetails::Username));

        let json = serde_json::to_string(&aggregate).unwrap();
        let back: AggregateResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, aggregate);
    }
}
