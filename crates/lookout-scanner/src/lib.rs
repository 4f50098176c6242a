//! Lookout Scanner - Probe set and lookup orchestration.
//!
//! This crate turns an identifier into an [`AggregateResult`](lookout_core::AggregateResult):
//! it holds the per-source probes and their response heuristics, fans them out
//! concurrently with failure isolation, assembles per-type details, and caches
//! the outcome.
//!
//! # Features
//!
//! - Profile-page probes driven by static platform definitions
//! - Endpoint reachability probes for email and phone directories
//! - Unverified messaging-link construction for phone numbers
//! - Address, accessibility and DNS analyses for domains and IPs
//! - Per-probe timeout, optional request deadline and concurrency cap
//! - Image URL extraction over finished results
//!
//! # Example
//!
//! ```rust,ignore
//! use lookout_scanner::{extract_images, Orchestrator, ProbeContext, ProbeRegistry};
//! use std::sync::Arc;
//!
//! let context = ProbeContext::new(Arc::new(fetcher), Arc::new(SystemResolver));
//! let orchestrator = Orchestrator::new(
//!     Arc::new(ProbeRegistry::with_defaults()),
//!     context,
//!     Some(Arc::new(cache)),
//! );
//!
//! let result = orchestrator.resolve(QueryType::Username, "@octocat").await;
//! let images = extract_images(&result);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod assembly;
#[allow(missing_docs)]
pub mod error;
pub mod normalizer;
pub mod orchestrator;
#[allow(missing_docs)]
pub mod parser;
#[allow(missing_docs)]
pub mod probes;
pub mod registry;
#[allow(missing_docs)]
pub mod url_builder;

// Re-export commonly used types
pub use assembly::build_details;
pub use error::{Result, ScanError};
pub use normalizer::{extract_images, IMAGE_KEYS};
pub use orchestrator::{Orchestrator, DEADLINE_EXCEEDED, DEFAULT_PROBE_TIMEOUT};
pub use parser::HtmlPage;
pub use probes::{Probe, ProbeContext};
pub use registry::ProbeRegistry;
pub use url_builder::build_probe_url;
