//! Subword-core - vocabulary store and segmentation algorithms
//!
//! This crate provides the fundamental data structures and algorithms for
//! subword tokenization, independent of any configuration format.
//!
//! # Features
//!
//! - Efficient vocabulary storage using `AHashMap` and compact strings
//! - Special token roles (unknown, sequence start/end, padding, ...)
//! - WordPiece, BPE and Unigram segmentation behind one [`Model`] enum
//! - Byte fallback for characters missing from the vocabulary
//! - Error handling with detailed diagnostics
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use subword_core::{Model, SpecialRole, Vocabulary, WordPiece};
//!
//! let mut builder = Vocabulary::builder();
//! builder.add_token("[UNK]", 0, None)?;
//! builder.add_token("un", 1, None)?;
//! builder.add_token("##fit", 2, None)?;
//! builder.bind_role(SpecialRole::Unk, "[UNK]")?;
//! let vocab = Arc::new(builder.build()?);
//!
//! let model = Model::WordPiece(WordPiece::with_defaults(vocab));
//! assert_eq!(model.segment("unfit"), vec!["un", "##fit"]);
//! # Ok::<(), subword_core::TokenizerError>(())
//! ```

pub mod error;
pub use error::{Result, TokenizerError};

// Vocabulary, merge rules, trie
pub mod core;
pub use self::core::{
    MergeMap, MergeRules, Pair, SpecialRole, SpecialTokens, Token, Vocab, VocabR, VocabTrie,
    Vocabulary, VocabularyBuilder,
};

// Segmentation models
pub mod models;
pub use models::{Bpe, ByteFallback, Model, ModelKind, Unigram, WordPiece};
