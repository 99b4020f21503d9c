//! Core data structures.
//!
//! The vocabulary store, BPE merge rules and the character trie shared by
//! the segmentation models. Everything here is built once at load time and
//! read-only afterwards.

pub mod merges;
pub mod trie;
pub mod vocab;

pub use merges::{MergeMap, MergeRules, Pair};
pub use trie::VocabTrie;
pub use vocab::{SpecialRole, SpecialTokens, Token, Vocab, VocabR, Vocabulary, VocabularyBuilder};
