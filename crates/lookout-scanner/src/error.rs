use lookout_core::QueryType;
use lookout_fetch::FetchError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },

    #[error("URL template {template:?} cannot be rendered: {reason}")]
    Template { template: String, reason: String },

    #[error("{0:?} is not an IPv4 address")]
    InvalidAddress(String),

    #[error("{platform} does not handle {query_type} identifiers")]
    UnsupportedIdentifier {
        platform: String,
        query_type: QueryType,
    },
}

pub type Result<T> = std::result::Result<T, ScanError>;
