//! Order-N word chain.
//!
//! - `Prefix`: the sliding window of normalized words used as a lookup key
//! - `Suffixes`: what was seen after a prefix (a single word, or a weighted set)
//! - `ChainModel`: learning, sampling and generation
//! - `ChainStats`: summary numbers for reporting

/// Sliding prefix window and token normalization.
pub mod prefix;

/// Per-prefix suffix storage with singleton promotion.
pub mod suffixes;

/// The chain model itself.
pub mod model;

/// Summary statistics over a model.
pub mod stats;

pub use model::ChainModel;
pub use prefix::{normalize, Prefix, BOUNDARY};
pub use stats::ChainStats;
pub use suffixes::{SuffixSet, Suffixes};
