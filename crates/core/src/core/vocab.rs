//! Vocabulary storage and lookup.
//!
//! This module provides efficient vocabulary storage using AHashMap for fast lookups
//! and CompactString for memory-efficient string storage. A [`Vocabulary`] is
//! assembled once through a [`VocabularyBuilder`] and is read-only afterwards.

use crate::error::{Result, TokenizerError};
use ahash::AHashMap;
use compact_str::CompactString;
use std::fmt;

/// Forward mapping: token string -> ID
pub type Vocab = AHashMap<CompactString, u32>;

/// Reverse mapping: ID -> token
pub type VocabR = AHashMap<u32, Token>;

/// A single vocabulary entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// Surface form
    pub content: CompactString,
    /// Token ID
    pub id: u32,
    /// Whether this is a special (structural) token
    pub special: bool,
    /// Log-probability used by Unigram segmentation
    pub score: Option<f64>,
}

/// Structural roles a special token can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialRole {
    /// Unknown token (always bound)
    Unk,
    /// Beginning of sequence
    Bos,
    /// End of sequence
    Eos,
    /// Padding
    Pad,
    /// Separator between sequences
    Sep,
    /// Classification token
    Cls,
    /// Mask token
    Mask,
}

impl SpecialRole {
    pub const ALL: [SpecialRole; 7] = [
        SpecialRole::Unk,
        SpecialRole::Bos,
        SpecialRole::Eos,
        SpecialRole::Pad,
        SpecialRole::Sep,
        SpecialRole::Cls,
        SpecialRole::Mask,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecialRole::Unk => "unk",
            SpecialRole::Bos => "bos",
            SpecialRole::Eos => "eos",
            SpecialRole::Pad => "pad",
            SpecialRole::Sep => "sep",
            SpecialRole::Cls => "cls",
            SpecialRole::Mask => "mask",
        }
    }
}

impl fmt::Display for SpecialRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Special token IDs cached for fast access.
///
/// These are used extensively during encoding and decoding, so we cache the IDs
/// to avoid repeated lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialTokens {
    /// Unknown token ID
    pub unk: u32,
    /// Beginning of sequence token ID
    pub bos: Option<u32>,
    /// End of sequence token ID
    pub eos: Option<u32>,
    /// Padding token ID
    pub pad: Option<u32>,
    /// Separator token ID
    pub sep: Option<u32>,
    /// Classification token ID
    pub cls: Option<u32>,
    /// Mask token ID
    pub mask: Option<u32>,
}

impl SpecialTokens {
    /// Get the ID bound to a role.
    pub fn get(&self, role: SpecialRole) -> Option<u32> {
        match role {
            SpecialRole::Unk => Some(self.unk),
            SpecialRole::Bos => self.bos,
            SpecialRole::Eos => self.eos,
            SpecialRole::Pad => self.pad,
            SpecialRole::Sep => self.sep,
            SpecialRole::Cls => self.cls,
            SpecialRole::Mask => self.mask,
        }
    }

    /// Check if an ID is bound to any role.
    #[inline]
    pub fn has_role(&self, id: u32) -> bool {
        SpecialRole::ALL.iter().any(|&role| self.get(role) == Some(id))
    }

    /// Number of sequence markers `encode` injects with special tokens enabled.
    pub fn marker_count(&self) -> usize {
        usize::from(self.bos.is_some()) + usize::from(self.eos.is_some())
    }
}

/// Immutable vocabulary with forward and reverse mappings.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Forward mapping: token string -> ID
    vocab: Vocab,
    /// Reverse mapping: ID -> token
    vocab_r: VocabR,
    /// Special token IDs
    special: SpecialTokens,
    /// Largest ID in use
    max_id: u32,
}

impl Vocabulary {
    /// Start assembling a vocabulary.
    pub fn builder() -> VocabularyBuilder {
        VocabularyBuilder::new()
    }

    /// Map a token to its ID, falling back to the unknown token.
    #[inline]
    pub fn id_of(&self, token: &str) -> u32 {
        match self.try_id_of(token) {
            Ok(id) => id,
            Err(_) => {
                tracing::trace!(token, "token not in vocabulary, using unk");
                self.special.unk
            }
        }
    }

    /// Map a token to its ID, reporting unknown tokens.
    #[inline]
    pub fn try_id_of(&self, token: &str) -> Result<u32> {
        self.get_id(token)
            .ok_or_else(|| TokenizerError::UnknownToken(token.to_string()))
    }

    /// Map an ID to its token string.
    #[inline]
    pub fn token_of(&self, id: u32) -> Result<&str> {
        self.get_token(id).ok_or(TokenizerError::OutOfRange(id))
    }

    /// Get the ID for a token string.
    #[inline]
    pub fn get_id(&self, token: &str) -> Option<u32> {
        self.vocab.get(token).copied()
    }

    /// Get the token string for an ID.
    #[inline]
    pub fn get_token(&self, id: u32) -> Option<&str> {
        self.vocab_r.get(&id).map(|t| t.content.as_str())
    }

    /// Get the full entry for an ID.
    #[inline]
    pub fn entry(&self, id: u32) -> Option<&Token> {
        self.vocab_r.get(&id)
    }

    #[inline]
    pub fn contains(&self, token: &str) -> bool {
        self.vocab.contains_key(token)
    }

    /// Unigram score of a token, if it has one.
    #[inline]
    pub fn score_of(&self, id: u32) -> Option<f64> {
        self.vocab_r.get(&id).and_then(|t| t.score)
    }

    /// Whether the ID belongs to a special token.
    #[inline]
    pub fn is_special(&self, id: u32) -> bool {
        self.vocab_r.get(&id).is_some_and(|t| t.special)
    }

    #[inline]
    pub fn special(&self) -> &SpecialTokens {
        &self.special
    }

    #[inline]
    pub fn unk_id(&self) -> u32 {
        self.special.unk
    }

    /// The unknown placeholder string.
    pub fn unk_token(&self) -> &str {
        self.get_token(self.special.unk).unwrap_or_default()
    }

    /// Token string bound to a role.
    pub fn role_token(&self, role: SpecialRole) -> Option<&str> {
        self.special.get(role).and_then(|id| self.get_token(id))
    }

    /// Get the size of the vocabulary.
    #[inline]
    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    /// Check if the vocabulary is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }

    /// Largest ID in use. IDs may be sparse below it.
    #[inline]
    pub fn max_id(&self) -> u32 {
        self.max_id
    }

    /// Iterate over all entries in no particular order.
    pub fn tokens(&self) -> impl Iterator<Item = &Token> {
        self.vocab_r.values()
    }
}

/// Bulk constructor for [`Vocabulary`].
///
/// Enforces the uniqueness invariant in both directions: a surface form maps
/// to one ID and an ID to one surface form.
#[derive(Debug, Default)]
pub struct VocabularyBuilder {
    vocab: Vocab,
    vocab_r: VocabR,
    roles: AHashMap<SpecialRole, u32>,
}

impl VocabularyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            vocab: Vocab::with_capacity(capacity),
            vocab_r: VocabR::with_capacity(capacity),
            roles: AHashMap::new(),
        }
    }

    /// Add a token with a specific ID.
    ///
    /// Returns an error if either the ID or the surface form is already taken.
    pub fn add_token(&mut self, content: &str, id: u32, score: Option<f64>) -> Result<()> {
        if let Some(existing) = self.vocab_r.get(&id) {
            return Err(TokenizerError::parse(format!(
                "token ID {} is assigned to both {:?} and {:?}",
                id, existing.content, content
            )));
        }
        if let Some(&other) = self.vocab.get(content) {
            return Err(TokenizerError::parse(format!(
                "token {:?} is assigned to both ID {} and ID {}",
                content, other, id
            )));
        }

        let content = CompactString::new(content);
        self.vocab.insert(content.clone(), id);
        self.vocab_r.insert(
            id,
            Token {
                content,
                id,
                special: false,
                score,
            },
        );

        Ok(())
    }

    /// Add (or re-declare) a special token.
    ///
    /// Re-declaring an existing entry with the same ID just flags it special;
    /// any other collision is an error.
    pub fn add_special_token(&mut self, content: &str, id: u32) -> Result<()> {
        let known = self.vocab.get(content).copied();
        let taken = self.vocab_r.contains_key(&id);

        match (known, taken) {
            (Some(known), true) if known == id => {
                if let Some(entry) = self.vocab_r.get_mut(&id) {
                    entry.special = true;
                }
                Ok(())
            }
            (None, false) => {
                self.add_token(content, id, None)?;
                if let Some(entry) = self.vocab_r.get_mut(&id) {
                    entry.special = true;
                }
                Ok(())
            }
            _ => Err(TokenizerError::parse(format!(
                "special token {:?} with ID {} conflicts with the vocabulary",
                content, id
            ))),
        }
    }

    /// Bind a role to an existing token, flagging it special.
    pub fn bind_role(&mut self, role: SpecialRole, content: &str) -> Result<u32> {
        let id = self.vocab.get(content).copied().ok_or_else(|| {
            TokenizerError::parse(format!(
                "{} token {:?} is not in the vocabulary",
                role, content
            ))
        })?;
        self.bind_role_id(role, id)?;
        Ok(id)
    }

    /// Bind a role to an existing ID, flagging it special.
    pub fn bind_role_id(&mut self, role: SpecialRole, id: u32) -> Result<()> {
        let entry = self.vocab_r.get_mut(&id).ok_or_else(|| {
            TokenizerError::parse(format!("{} token ID {} is not in the vocabulary", role, id))
        })?;
        entry.special = true;
        self.roles.insert(role, id);
        Ok(())
    }

    #[inline]
    pub fn contains(&self, content: &str) -> bool {
        self.vocab.contains_key(content)
    }

    #[inline]
    pub fn get_id(&self, content: &str) -> Option<u32> {
        self.vocab.get(content).copied()
    }

    /// Whether a token has been declared special.
    pub fn is_special(&self, content: &str) -> bool {
        self.vocab
            .get(content)
            .and_then(|id| self.vocab_r.get(id))
            .is_some_and(|t| t.special)
    }

    /// Whether a role already has a binding.
    pub fn has_role(&self, role: SpecialRole) -> bool {
        self.roles.contains_key(&role)
    }

    /// Special tokens that are not bound to any role yet.
    pub fn unbound_special_tokens(&self) -> impl Iterator<Item = &Token> {
        self.vocab_r
            .values()
            .filter(|t| t.special && !self.roles.values().any(|&id| id == t.id))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vocab.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vocab.is_empty()
    }

    /// Freeze the vocabulary. The unknown role must be bound.
    pub fn build(self) -> Result<Vocabulary> {
        if self.vocab.is_empty() {
            return Err(TokenizerError::parse("vocabulary is empty"));
        }
        let unk = self
            .roles
            .get(&SpecialRole::Unk)
            .copied()
            .ok_or_else(|| TokenizerError::parse("no unknown token configured"))?;
        let role = |r: SpecialRole| self.roles.get(&r).copied();
        let special = SpecialTokens {
            unk,
            bos: role(SpecialRole::Bos),
            eos: role(SpecialRole::Eos),
            pad: role(SpecialRole::Pad),
            sep: role(SpecialRole::Sep),
            cls: role(SpecialRole::Cls),
            mask: role(SpecialRole::Mask),
        };
        let max_id = self.vocab_r.keys().copied().max().unwrap_or(0);

        Ok(Vocabulary {
            vocab: self.vocab,
            vocab_r: self.vocab_r,
            special,
            max_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vocabulary {
        let mut builder = VocabularyBuilder::new();
        builder.add_token("[UNK]", 0, None).unwrap();
        builder.add_token("hello", 1, None).unwrap();
        builder.add_token("world", 5, Some(-2.5)).unwrap();
        builder.add_special_token("[CLS]", 7).unwrap();
        builder.bind_role(SpecialRole::Unk, "[UNK]").unwrap();
        builder.bind_role(SpecialRole::Bos, "[CLS]").unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_lookup_both_ways() {
        let vocab = sample();

        assert_eq!(vocab.id_of("hello"), 1);
        assert_eq!(vocab.token_of(5).unwrap(), "world");
        assert!(vocab.contains("world"));
        assert!(!vocab.contains("planet"));
        assert_eq!(vocab.len(), 4);
        assert_eq!(vocab.max_id(), 7);
    }

    #[test]
    fn test_unknown_token_falls_back() {
        let vocab = sample();

        assert_eq!(vocab.id_of("planet"), vocab.unk_id());
        assert!(matches!(
            vocab.try_id_of("planet"),
            Err(TokenizerError::UnknownToken(t)) if t == "planet"
        ));
        assert_eq!(vocab.unk_token(), "[UNK]");
    }

    #[test]
    fn test_out_of_range() {
        let vocab = sample();

        // sparse hole and past the end
        assert!(matches!(vocab.token_of(3), Err(TokenizerError::OutOfRange(3))));
        assert!(matches!(vocab.token_of(99), Err(TokenizerError::OutOfRange(99))));
    }

    #[test]
    fn test_special_flags() {
        let vocab = sample();

        assert!(vocab.is_special(0));
        assert!(vocab.is_special(7));
        assert!(!vocab.is_special(1));
        assert_eq!(vocab.special().bos, Some(7));
        assert_eq!(vocab.special().eos, None);
        assert_eq!(vocab.special().marker_count(), 1);
        assert_eq!(vocab.role_token(SpecialRole::Bos), Some("[CLS]"));
        assert_eq!(vocab.score_of(5), Some(-2.5));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut builder = VocabularyBuilder::new();
        builder.add_token("a", 0, None).unwrap();

        assert!(builder.add_token("b", 0, None).unwrap_err().is_parse_error());
        assert!(builder.add_token("a", 1, None).unwrap_err().is_parse_error());
    }

    #[test]
    fn test_special_redeclaration() {
        let mut builder = VocabularyBuilder::new();
        builder.add_token("[UNK]", 0, None).unwrap();
        assert!(!builder.is_special("[UNK]"));

        // same binding just flags it
        builder.add_special_token("[UNK]", 0).unwrap();
        assert!(builder.is_special("[UNK]"));
        assert!(!builder.is_special("[PAD]"));
        // conflicting binding is rejected
        assert!(builder.add_special_token("[UNK]", 3).is_err());
        assert!(builder.add_special_token("[PAD]", 0).is_err());
    }

    #[test]
    fn test_build_requires_unk() {
        let mut builder = VocabularyBuilder::new();
        builder.add_token("a", 0, None).unwrap();
        assert!(builder.build().unwrap_err().is_parse_error());

        assert!(VocabularyBuilder::new().build().is_err());
    }
}
