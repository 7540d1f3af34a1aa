//! Content-fingerprinting and similarity-scoring engine.
//!
//! Pure, synchronous transforms over explicit inputs: a reference text is
//! condensed into a [`Fingerprint`] of its k-gram rolling hashes, and any
//! candidate text can then be scored against it. No I/O, no shared mutable
//! state; a built fingerprint is read-only and safe to share across tasks.

pub mod fingerprint;
pub mod keywords;
pub mod normalize;

pub use fingerprint::{Fingerprint, FingerprintMode, HashParams};
pub use keywords::{extract_keywords, extract_keywords_or_fallback};
pub use normalize::normalize;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("invalid fingerprint parameter: {0}")]
    InvalidParameter(&'static str),
}
