//! Byte pair encoding (SentencePiece-merge style).
//!
//! A word starts as one piece per character. Adjacent pairs are merged in
//! rank order (lowest rank first, leftmost first among equal ranks) until no
//! merge rule applies. Characters missing from the vocabulary become the
//! unknown token, or byte pieces when byte fallback is enabled, and never
//! take part in merges.

use crate::core::merges::MergeRules;
use crate::core::vocab::Vocabulary;
use crate::models::byte_fallback::ByteFallback;
use dary_heap::OctonaryHeap;
use std::cmp::Ordering;
use std::sync::Arc;

/// BPE model.
#[derive(Debug, Clone)]
pub struct Bpe {
    vocab: Arc<Vocabulary>,
    merges: MergeRules,
    byte_fallback: ByteFallback,
}

/// One piece of a word while merges are applied.
#[derive(Debug, Clone, Copy)]
struct Symbol {
    id: u32,
    next: Option<usize>,
    prev: Option<usize>,
    alive: bool,
    mergeable: bool,
}

/// A pending merge of the symbol at `pos` with its right neighbour.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MergeOp {
    rank: u32,
    pos: usize,
    new_id: u32,
}

// Lowest rank first, then leftmost position
impl Ord for MergeOp {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .rank
            .cmp(&self.rank)
            .then_with(|| other.pos.cmp(&self.pos))
    }
}

impl PartialOrd for MergeOp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Bpe {
    pub fn new(vocab: Arc<Vocabulary>, merges: MergeRules, byte_fallback: bool) -> Self {
        let byte_fallback = ByteFallback::new(byte_fallback, &vocab);
        Self {
            vocab,
            merges,
            byte_fallback,
        }
    }

    pub fn merges(&self) -> &MergeRules {
        &self.merges
    }

    pub fn byte_fallback(&self) -> bool {
        self.byte_fallback.is_enabled()
    }

    pub fn vocab(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    /// Segment one word, appending token IDs to `out`.
    pub fn segment_word(&self, word: &str, out: &mut Vec<u32>) {
        let mut symbols = self.initial_symbols(word);
        self.apply_merges(&mut symbols);
        out.extend(symbols.iter().filter(|s| s.alive).map(|s| s.id));
    }

    /// One symbol per character, or per fallback piece for unknown characters.
    fn initial_symbols(&self, word: &str) -> Vec<Symbol> {
        let mut ids = Vec::with_capacity(word.len());
        let mut mergeable = Vec::with_capacity(word.len());
        let mut buf = [0u8; 4];

        for ch in word.chars() {
            let known = self
                .vocab
                .get_id(ch.encode_utf8(&mut buf))
                .filter(|&id| !self.vocab.is_special(id));

            match known {
                Some(id) => {
                    ids.push(id);
                    mergeable.push(true);
                }
                None => {
                    tracing::trace!(%ch, "character not in BPE vocabulary");
                    let pushed = self
                        .byte_fallback
                        .encode_unknown(ch, self.vocab.unk_id(), &mut ids);
                    mergeable.extend(std::iter::repeat(false).take(pushed));
                }
            }
        }

        let len = ids.len();
        ids.into_iter()
            .zip(mergeable)
            .enumerate()
            .map(|(i, (id, mergeable))| Symbol {
                id,
                prev: i.checked_sub(1),
                next: (i + 1 < len).then_some(i + 1),
                alive: true,
                mergeable,
            })
            .collect()
    }

    fn candidate(&self, symbols: &[Symbol], pos: usize) -> Option<MergeOp> {
        let left = symbols[pos];
        let right = symbols[left.next?];
        if !left.mergeable || !right.mergeable {
            return None;
        }
        self.merges
            .get((left.id, right.id))
            .map(|(rank, new_id)| MergeOp { rank, pos, new_id })
    }

    /// Apply merge rules in priority order.
    ///
    /// A merged symbol keeps the left position and the right one is retired,
    /// so positions stay stable and heap entries can be validated on pop.
    fn apply_merges(&self, symbols: &mut [Symbol]) {
        if symbols.len() < 2 || self.merges.is_empty() {
            return;
        }

        let mut heap = OctonaryHeap::with_capacity(symbols.len());
        for pos in 0..symbols.len() {
            if let Some(op) = self.candidate(symbols, pos) {
                heap.push(op);
            }
        }

        while let Some(op) = heap.pop() {
            if !symbols[op.pos].alive {
                continue;
            }
            // Stale entry: the pair at this position changed since the push
            match self.candidate(symbols, op.pos) {
                Some(current) if current == op => {}
                _ => continue,
            }
            let Some(right) = symbols[op.pos].next else {
                continue;
            };

            // Perform merge
            let after = symbols[right].next;
            symbols[right].alive = false;
            symbols[op.pos].id = op.new_id;
            symbols[op.pos].next = after;
            if let Some(after) = after {
                symbols[after].prev = Some(op.pos);
            }

            // Add new merge opportunities
            if let Some(prev) = symbols[op.pos].prev {
                if let Some(op) = self.candidate(symbols, prev) {
                    heap.push(op);
                }
            }
            if let Some(op) = self.candidate(symbols, op.pos) {
                heap.push(op);
            }
        }
    }
}
