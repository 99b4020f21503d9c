//! Reading model files.
//!
//! This module provides the `tokenizer.json` format definitions and the
//! loader that validates them into runtime parts.

pub mod format;
pub mod load;

pub use format::TokenizerFile;
pub use load::{ModelParts, TokenizerLoader};
