//! Merge rule management for BPE.
//!
//! Merge rules arrive as pairs of token strings in priority order. They are
//! resolved against the vocabulary once, at load time, and stored using token
//! IDs for fast comparison during segmentation.

use crate::core::vocab::Vocabulary;
use crate::error::{Result, TokenizerError};
use ahash::AHashMap;

/// A pair of token IDs that can be merged.
pub type Pair = (u32, u32);

/// Merge rule mapping: pair -> (rank, new_token_id).
///
/// The rank indicates the priority of this merge rule (lower rank = higher priority).
/// The new_token_id is the ID of the token created by merging this pair.
pub type MergeMap = AHashMap<Pair, (u32, u32)>;

/// Collection of BPE merge rules with efficient lookup.
#[derive(Debug, Clone, Default)]
pub struct MergeRules {
    /// Merge rules: pair -> (rank, new_token_id)
    merges: MergeMap,
    /// Maximum rank
    max_rank: u32,
}

impl MergeRules {
    /// Create a new empty collection of merge rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve string merge rules against a vocabulary.
    ///
    /// Ranks are assigned in order (0, 1, 2, ...). Both parts and the merged
    /// token must be in the vocabulary. A pair listed twice keeps its first
    /// (highest priority) rank.
    pub fn from_token_pairs<I, S>(vocab: &Vocabulary, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, S)>,
        S: AsRef<str>,
    {
        let mut rules = Self::new();

        for (rank, (left, right)) in pairs.into_iter().enumerate() {
            let (left, right) = (left.as_ref(), right.as_ref());
            let lookup = |token: &str| {
                vocab.get_id(token).ok_or_else(|| {
                    TokenizerError::parse(format!(
                        "merge #{} ({:?} {:?}) refers to unknown token {:?}",
                        rank, left, right, token
                    ))
                })
            };

            let pair = (lookup(left)?, lookup(right)?);
            let merged = lookup(&format!("{}{}", left, right))?;

            if rules.merges.contains_key(&pair) {
                tracing::debug!(rank, left, right, "duplicate merge rule ignored");
                continue;
            }
            let rank = u32::try_from(rank)
                .map_err(|_| TokenizerError::parse("too many merge rules"))?;
            rules.add_merge(pair, rank, merged);
        }

        Ok(rules)
    }

    /// Add a merge rule.
    ///
    /// # Arguments
    /// * `pair` - The pair of token IDs to merge
    /// * `rank` - The priority rank (lower = higher priority)
    /// * `new_token_id` - The ID of the token created by this merge
    pub fn add_merge(&mut self, pair: Pair, rank: u32, new_token_id: u32) {
        self.merges.insert(pair, (rank, new_token_id));
        self.max_rank = self.max_rank.max(rank);
    }

    /// Get the merge rule for a pair.
    ///
    /// Returns Some((rank, new_token_id)) if this pair should be merged,
    /// None otherwise.
    #[inline]
    pub fn get(&self, pair: Pair) -> Option<(u32, u32)> {
        self.merges.get(&pair).copied()
    }

    /// Get the number of merge rules.
    #[inline]
    pub fn len(&self) -> usize {
        self.merges.len()
    }

    /// Check if there are no merge rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.merges.is_empty()
    }

    #[inline]
    pub fn max_rank(&self) -> u32 {
        self.max_rank
    }
}
