//! Subword-tokenizer - High-level tokenizer API
//!
//! This crate loads a `tokenizer.json` model file and exposes the whole
//! text pipeline (normalization, word splitting, segmentation, special
//! tokens and detokenization) behind a single immutable [`Tokenizer`].
//!
//! # Features
//!
//! - WordPiece, BPE and Unigram models from the same file format
//! - Unicode normalization, lowercasing and accent stripping
//! - Sequence start/end markers resolved from the post processor
//! - Parallel batch calls on rayon, in input order
//!
//! # Example
//!
//! ```rust
//! use subword_tokenizer::Tokenizer;
//!
//! let json = r###"{
//!     "model": {
//!         "type": "WordPiece",
//!         "unk_token": "[UNK]",
//!         "vocab": {"[UNK]": 0, "un": 1, "##fit": 2}
//!     }
//! }"###;
//! let tokenizer: Tokenizer = json.parse()?;
//!
//! // Encode text
//! let encoding = tokenizer.encode("unfit", false)?;
//! assert_eq!(encoding.tokens, vec!["un", "##fit"]);
//!
//! // Decode tokens
//! assert_eq!(tokenizer.decode(&encoding.ids), "unfit");
//! # Ok::<(), subword_tokenizer::TokenizerError>(())
//! ```

// Re-export core types
pub use subword_core::{ModelKind, Result, SpecialRole, SpecialTokens, TokenizerError};

// Tokenizer API
pub mod tokenizer;
pub use tokenizer::{Encoding, Tokenizer, TokenizerBuilder, TokenizerOptions};

// Model file loading
pub mod io;
pub use io::{ModelParts, TokenizerLoader};

// Pre-tokenization
pub mod pre_tokenizer;
pub use pre_tokenizer::{Normalizer, NormalizerConfig, Splitter};

// Detokenization
pub mod decoder;
pub use decoder::Decoder;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
