use super::{EndpointProbe, Probe};
use lookout_core::EmailProvider;
use std::sync::Arc;

/// Public free-mail domains.
pub const FREE_MAIL_PROVIDERS: [&str; 6] = [
    "gmail.com",
    "yahoo.com",
    "outlook.com",
    "hotmail.com",
    "mail.com",
    "protonmail.com",
];

const EMAIL_ENDPOINTS: [(&str, &str); 7] = [
    ("Gmail", "https://accounts.google.com/gservicelogin"),
    ("GitHub", "https://api.github.com/search/users?q={query}"),
    ("LinkedIn", "https://www.linkedin.com/pub/dir?company="),
    ("Facebook", "https://www.facebook.com/search/people/?q={query}"),
    ("Twitter", "https://twitter.com/search?q={query}"),
    ("Instagram", "https://instagram.com/{local}"),
    ("Reddit", "https://www.reddit.com/search/?q={query}"),
];

/// Email probes in registration order.
pub fn email_probes() -> Vec<Arc<dyn Probe>> {
    EMAIL_ENDPOINTS
        .into_iter()
        .map(|(platform, template)| {
            Arc::new(EndpointProbe::new(platform, template)) as Arc<dyn Probe>
        })
        .collect()
}

/// Classify an email domain as free-mail or organisational.
pub fn classify_provider(domain: &str) -> EmailProvider {
    let domain = domain.trim().to_ascii_lowercase();
    if FREE_MAIL_PROVIDERS.contains(&domain.as_str()) {
        EmailProvider::Free
    } else {
        EmailProvider::Corporate
    }
}
