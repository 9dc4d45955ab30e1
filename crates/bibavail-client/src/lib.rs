//! HTTP client for the ILS bib-availability endpoint.
//!
//! The service seam is the [`AvailabilityService`] trait; [`AlmaClient`]
//! is the reqwest-backed implementation. Decoding of the returned envelope
//! lives in `bibavail-core` - this crate only moves bytes and classifies
//! transport failures.

use async_trait::async_trait;
use serde_json::Value;

mod alma;
mod error;

pub use alma::AlmaClient;
pub use error::FetchError;

/// One upstream availability fetch for a batch of record ids.
///
/// Implementations return the raw envelope as JSON; callers decode it.
/// The error taxonomy distinguishes timeouts from hard transport failures
/// so retry policy can treat them explicitly.
#[async_trait]
pub trait AvailabilityService: Send + Sync {
    async fn fetch_availability(&self, ids: &[String]) -> Result<Value, FetchError>;
}
