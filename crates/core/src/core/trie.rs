//! Character trie over vocabulary entries.
//!
//! Used by WordPiece for longest-prefix matching and by Unigram to enumerate
//! every vocabulary piece that starts at a given position.

use crate::core::vocab::Vocabulary;
use ahash::AHashMap;

/// Trie node for prefix lookup.
#[derive(Debug, Clone, Default)]
struct TrieNode {
    /// Child nodes indexed by character
    children: AHashMap<char, TrieNode>,
    /// Token ID if this node represents a complete token
    token_id: Option<u32>,
}

/// Trie structure for fast prefix lookup of tokens.
#[derive(Debug, Clone, Default)]
pub struct VocabTrie {
    root: TrieNode,
    len: usize,
}

impl VocabTrie {
    /// Create a new empty trie.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a trie from the non-special entries of a vocabulary.
    ///
    /// Special tokens are structural and must never be produced from raw text.
    pub fn from_vocab(vocab: &Vocabulary) -> Self {
        let mut trie = Self::new();

        for token in vocab.tokens().filter(|t| !t.special) {
            trie.insert(&token.content, token.id);
        }

        trie
    }

    /// Insert a token string into the trie.
    pub fn insert(&mut self, token: &str, token_id: u32) {
        let mut node = &mut self.root;

        for ch in token.chars() {
            node = node.children.entry(ch).or_default();
        }

        if node.token_id.replace(token_id).is_none() {
            self.len += 1;
        }
    }

    /// Number of tokens stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Find the longest matching token starting at the given position.
    ///
    /// Returns the token ID and length of the match (in chars), or None if no match.
    pub fn find_longest_match(&self, chars: &[char], pos: usize) -> Option<(u32, usize)> {
        Self::longest_from(&self.root, chars, pos)
    }

    /// Like [`find_longest_match`](Self::find_longest_match), but every
    /// candidate must start with `prefix`. The returned length excludes the prefix.
    pub fn find_longest_match_with_prefix(
        &self,
        prefix: &str,
        chars: &[char],
        pos: usize,
    ) -> Option<(u32, usize)> {
        let mut node = &self.root;
        for ch in prefix.chars() {
            node = node.children.get(&ch)?;
        }
        Self::longest_from(node, chars, pos)
    }

    /// All tokens that start at `pos`, shortest first, as (token ID, length in chars).
    pub fn common_prefix_matches(&self, chars: &[char], pos: usize) -> Vec<(u32, usize)> {
        let mut node = &self.root;
        let mut matches = Vec::new();

        for (offset, ch) in chars[pos..].iter().enumerate() {
            match node.children.get(ch) {
                Some(child) => {
                    node = child;
                    if let Some(token_id) = node.token_id {
                        matches.push((token_id, offset + 1));
                    }
                }
                None => break,
            }
        }

        matches
    }

    fn longest_from(start: &TrieNode, chars: &[char], pos: usize) -> Option<(u32, usize)> {
        let mut node = start;
        let mut best_match: Option<(u32, usize)> = None;

        for (offset, ch) in chars[pos..].iter().enumerate() {
            // Check if this character exists in the trie
            match node.children.get(ch) {
                Some(child) => {
                    node = child;

                    // If this node represents a complete token, update best match
                    if let Some(token_id) = node.token_id {
                        best_match = Some((token_id, offset + 1));
                    }
                }
                None => break,
            }
        }

        best_match
    }
}
