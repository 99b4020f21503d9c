//! Pre-tokenization pipeline.
//!
//! This module provides the operations applied before segmentation:
//! normalization of the raw text and splitting it into words.

pub mod normalize;
pub mod split;

pub use normalize::{NormalizationForm, Normalizer, NormalizerConfig};
pub use split::{SplitPattern, Splitter};
