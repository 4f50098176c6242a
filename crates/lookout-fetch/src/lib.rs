//! Outbound capabilities for Lookout probes.
//!
//! Probes never talk to the network directly. They receive an
//! [`HttpFetcher`] and an [`AddressResolver`], which the binary wires to
//! [`ReqwestFetcher`] and [`SystemResolver`] and tests replace with stubs.

pub mod client;
pub mod error;
pub mod headers;
pub mod resolver;

pub use client::{FetchedPage, HttpFetcher, ReqwestFetcher};
pub use error::{FetchError, Result};
pub use headers::RequestProfile;
pub use resolver::{AddressResolver, SystemResolver};
