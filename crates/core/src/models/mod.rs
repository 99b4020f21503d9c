//! Segmentation models.
//!
//! The model is chosen once, at load time, and dispatched through the
//! [`Model`] enum. Every variant segments a single pre-tokenized word into
//! vocabulary IDs and never fails: pieces it cannot cover become the unknown
//! token (or byte pieces, where byte fallback is enabled).

pub mod bpe;
pub mod byte_fallback;
pub mod unigram;
pub mod wordpiece;

pub use bpe::Bpe;
pub use byte_fallback::{byte_token, parse_byte_token, ByteFallback};
pub use unigram::Unigram;
pub use wordpiece::WordPiece;

use crate::core::vocab::Vocabulary;
use crate::error::TokenizerError;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Segmentation algorithm discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    WordPiece,
    Bpe,
    Unigram,
}

impl ModelKind {
    /// Name used by the `model.type` field of `tokenizer.json`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelKind::WordPiece => "WordPiece",
            ModelKind::Bpe => "BPE",
            ModelKind::Unigram => "Unigram",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModelKind {
    type Err = TokenizerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WordPiece" => Ok(ModelKind::WordPiece),
            "BPE" => Ok(ModelKind::Bpe),
            "Unigram" => Ok(ModelKind::Unigram),
            other => Err(TokenizerError::UnsupportedModel(other.to_string())),
        }
    }
}

/// A loaded segmentation model.
#[derive(Debug, Clone)]
pub enum Model {
    WordPiece(WordPiece),
    Bpe(Bpe),
    Unigram(Unigram),
}

impl Model {
    pub fn kind(&self) -> ModelKind {
        match self {
            Model::WordPiece(_) => ModelKind::WordPiece,
            Model::Bpe(_) => ModelKind::Bpe,
            Model::Unigram(_) => ModelKind::Unigram,
        }
    }

    pub fn vocab(&self) -> &Arc<Vocabulary> {
        match self {
            Model::WordPiece(m) => m.vocab(),
            Model::Bpe(m) => m.vocab(),
            Model::Unigram(m) => m.vocab(),
        }
    }

    /// Segment one word, appending token IDs to `out`.
    #[inline]
    pub fn segment_word(&self, word: &str, out: &mut Vec<u32>) {
        match self {
            Model::WordPiece(m) => m.segment_word(word, out),
            Model::Bpe(m) => m.segment_word(word, out),
            Model::Unigram(m) => m.segment_word(word, out),
        }
    }

    /// Segment one word into token strings.
    pub fn segment(&self, word: &str) -> Vec<String> {
        let mut ids = Vec::new();
        self.segment_word(word, &mut ids);

        let vocab = self.vocab();
        ids.into_iter()
            .map(|id| vocab.get_token(id).unwrap_or(vocab.unk_token()).to_string())
            .collect()
    }
}
