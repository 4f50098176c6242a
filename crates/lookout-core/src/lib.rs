//! Lookout Core - Foundation crate for the Lookout OSINT aggregator.
//!
//! This crate provides the identifier model, the normalized result schema,
//! error handling and configuration management that all other Lookout crates
//! depend on.
//!
//! # Modules
//!
//! - [`error`] - Central error types using thiserror
//! - [`config`] - TOML-based configuration with XDG paths
//! - [`identifier`] - Query types, identifier parsing and normalization
//! - [`types`] - `ProbeResult`, `AggregateResult` and the per-type details union
//!
//! # Example
//!
//! ```rust
//! use lookout_core::{Identifier, QueryType};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let id = Identifier::parse(QueryType::Username, "@Octocat")?;
//! assert_eq!(id.normalized(), "octocat");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod config;
pub mod error;
pub mod identifier;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, CacheConfig, LoggingConfig, ProbingConfig};
pub use error::{ConfigError, ConfigResult, LookoutError, Result, ValidationError};
pub use identifier::{Identifier, QueryType, TargetKind};
pub use types::{
    AggregateResult, DomainSummary, EmailProvider, Fields, Found, ProbeResult, ProbeStatus,
    QueryDetails,
};
