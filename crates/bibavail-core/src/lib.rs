// bibavail-core - Platform-agnostic availability decoding
//
// This crate contains the PURE logic for turning the ILS's MARC-style
// availability envelope into normalized holding records, plus the
// default display formatting. No I/O, no async, no runtime dependencies.

use serde_json::Value;

pub mod decode;
pub mod envelope;
pub mod error;
pub mod format;
pub mod schema;

// Re-export commonly used types
pub use decode::{Decoded, Decoder, Holding};
pub use error::DecodeError;
pub use format::{format_holding, DefaultFormatter, HoldingFormatter};
pub use schema::InventoryKind;

/// Decode one raw availability envelope with the default (identity)
/// holding transform.
///
/// This is the pure core entry point: envelope JSON in, a mapping from
/// record id to its ordered holdings out. Deterministic for the same input.
pub fn decode(envelope: &Value) -> Result<Decoded, DecodeError> {
    Decoder::new().decode(envelope)
}
