//! Unigram segmentation.
//!
//! Picks the segmentation with the highest total log score with a Viterbi
//! pass over the scored-piece table. Equal scores prefer fewer pieces, then
//! the longest leftmost piece. A position no piece covers yields the unknown
//! token with a score below every real piece.

use crate::core::trie::VocabTrie;
use crate::core::vocab::Vocabulary;
use crate::models::byte_fallback::ByteFallback;
use std::sync::Arc;

/// Score gap between the worst piece and the unknown token.
pub const UNK_PENALTY: f64 = 10.0;

/// Tolerance when comparing path scores.
const SCORE_EPSILON: f64 = 1e-9;

/// Unigram model.
#[derive(Debug, Clone)]
pub struct Unigram {
    vocab: Arc<Vocabulary>,
    trie: VocabTrie,
    unk_score: f64,
    byte_fallback: ByteFallback,
}

/// Best segmentation of the suffix starting at some position.
#[derive(Debug, Clone, Copy)]
struct Best {
    score: f64,
    pieces: usize,
    /// End of the first piece (in chars)
    end: usize,
    /// None means the unknown token
    id: Option<u32>,
}

impl Best {
    /// Whether `self` should replace `other`.
    fn beats(&self, other: &Best) -> bool {
        if (self.score - other.score).abs() > SCORE_EPSILON {
            return self.score > other.score;
        }
        if self.pieces != other.pieces {
            return self.pieces < other.pieces;
        }
        self.end > other.end
    }
}

impl Unigram {
    pub fn new(vocab: Arc<Vocabulary>, byte_fallback: bool) -> Self {
        let trie = VocabTrie::from_vocab(&vocab);
        let min_score = vocab
            .tokens()
            .filter(|t| !t.special)
            .filter_map(|t| t.score)
            .fold(f64::INFINITY, f64::min);
        let min_score = if min_score.is_finite() { min_score } else { 0.0 };
        let byte_fallback = ByteFallback::new(byte_fallback, &vocab);

        Self {
            vocab,
            trie,
            unk_score: min_score - UNK_PENALTY,
            byte_fallback,
        }
    }

    pub fn unk_score(&self) -> f64 {
        self.unk_score
    }

    pub fn byte_fallback(&self) -> bool {
        self.byte_fallback.is_enabled()
    }

    pub fn vocab(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    /// Segment one word, appending token IDs to `out`.
    pub fn segment_word(&self, word: &str, out: &mut Vec<u32>) {
        let chars: Vec<char> = word.chars().collect();
        let n = chars.len();
        if n == 0 {
            return;
        }

        // best[i] covers chars[i..]; filled right to left so that ties can
        // favour the longest first piece.
        let mut best: Vec<Option<Best>> = vec![None; n + 1];
        best[n] = Some(Best {
            score: 0.0,
            pieces: 0,
            end: n,
            id: None,
        });

        for start in (0..n).rev() {
            let mut chosen: Option<Best> = None;
            let mut covers_single_char = false;

            let matches = self.trie.common_prefix_matches(&chars, start);
            let candidates = matches
                .iter()
                .map(|&(id, len)| (Some(id), len))
                .chain(std::iter::once((None, 1)));

            for (id, len) in candidates {
                match id {
                    Some(_) if len == 1 => covers_single_char = true,
                    // unk is only a last resort for an uncovered character
                    None if covers_single_char => continue,
                    _ => {}
                }

                let end = start + len;
                let Some(rest) = best[end] else {
                    continue;
                };
                let piece_score = match id {
                    Some(id) => self.vocab.score_of(id).unwrap_or(self.unk_score),
                    None => self.unk_score,
                };
                let candidate = Best {
                    score: piece_score + rest.score,
                    pieces: rest.pieces + 1,
                    end,
                    id,
                };

                if chosen.map_or(true, |current| candidate.beats(&current)) {
                    chosen = Some(candidate);
                }
            }

            best[start] = chosen;
        }

        let mut pos = 0;
        while pos < n {
            let Some(step) = best[pos] else {
                // unreachable: every position has at least the unk candidate
                break;
            };
            match step.id {
                Some(id) => out.push(id),
                None => {
                    tracing::trace!(ch = %chars[pos], "character not covered by any piece");
                    self.byte_fallback
                        .encode_unknown(chars[pos], self.vocab.unk_id(), out);
                }
            }
            pos = step.end;
        }
    }
}
