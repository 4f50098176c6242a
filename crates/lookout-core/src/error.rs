//! Core error types for Lookout.
//!
//! `ValidationError` is the input-validation failure surfaced by identifier
//! parsing. It short-circuits a lookup before any probe runs or the cache is
//! touched. `ConfigError` covers configuration loading and saving.

use thiserror::Error;

/// Central error type for Lookout operations that can fail outside the
/// lookup path (configuration, bootstrap, validation).
#[derive(Error, Debug)]
pub enum LookoutError {
    /// Configuration errors (file loading, parsing, validation)
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed identifier for its query type
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

/// Identifier rejected for its query type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Username was empty after stripping `@` and whitespace
    #[error("username cannot be empty")]
    EmptyUsername,

    /// Phone number contained no digits
    #[error("invalid phone number format: {0:?}")]
    InvalidPhone(String),

    /// Email did not match `local@domain.tld`
    #[error("invalid email format: {0:?}")]
    InvalidEmail(String),

    /// Neither a dotted IPv4 address nor a domain name
    #[error("invalid domain or IP address format: {0:?}")]
    InvalidDomain(String),

    /// Unrecognised query type name
    #[error("unknown query type: {0:?}")]
    UnknownQueryType(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to determine config directory path
    #[error("could not determine config directory (XDG base directories not available)")]
    NoConfigDir,

    /// Failed to parse TOML
    #[error("failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config
    #[error("failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    /// I/O error reading/writing config
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration value
    #[error("invalid config value for {field}: {reason}")]
    InvalidValue {
        /// Field name
        field: String,
        /// Reason for invalidity
        reason: String,
    },
}

/// Result type alias using `LookoutError`.
pub type Result<T> = std::result::Result<T, LookoutError>;

/// Result type alias for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
