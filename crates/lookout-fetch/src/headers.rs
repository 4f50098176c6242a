use crate::error::{FetchError, Result};
use lookout_core::ProbingConfig;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};

/// Browser-like request headers sent with every probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestProfile {
    pub user_agent: String,
    pub accept_language: String,
    pub accept: String,
}

impl RequestProfile {
    pub fn from_config(config: &ProbingConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
            accept: config.accept.clone(),
        }
    }

    /// Default header map for a client built from this profile.
    pub fn header_map(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value("User-Agent", &self.user_agent)?);
        headers.insert(
            ACCEPT_LANGUAGE,
            header_value("Accept-Language", &self.accept_language)?,
        );
        headers.insert(ACCEPT, header_value("Accept", &self.accept)?);
        Ok(headers)
    }
}

impl Default for RequestProfile {
    fn default() -> Self {
        Self::from_config(&ProbingConfig::default())
    }
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| FetchError::Client(format!("invalid {name} header: {e}")))
}
