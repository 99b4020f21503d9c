//! WordPiece segmentation.
//!
//! Greedy longest-match-first over each word: the first piece is matched
//! as-is, every following piece is matched with the continuation prefix
//! (`##` by default). A word that cannot be fully covered becomes a single
//! unknown token; pieces matched before the failure are discarded.

use crate::core::trie::VocabTrie;
use crate::core::vocab::Vocabulary;
use std::sync::Arc;

/// Default continuation prefix.
pub const DEFAULT_CONTINUATION_PREFIX: &str = "##";

/// Default limit on word length, in characters.
pub const DEFAULT_MAX_INPUT_CHARS_PER_WORD: usize = 100;

/// WordPiece model.
#[derive(Debug, Clone)]
pub struct WordPiece {
    vocab: Arc<Vocabulary>,
    trie: VocabTrie,
    continuing_subword_prefix: String,
    max_input_chars_per_word: usize,
}

impl WordPiece {
    pub fn new(
        vocab: Arc<Vocabulary>,
        continuing_subword_prefix: impl Into<String>,
        max_input_chars_per_word: usize,
    ) -> Self {
        let trie = VocabTrie::from_vocab(&vocab);
        Self {
            vocab,
            trie,
            continuing_subword_prefix: continuing_subword_prefix.into(),
            max_input_chars_per_word,
        }
    }

    /// Create a model with the default prefix and word limit.
    pub fn with_defaults(vocab: Arc<Vocabulary>) -> Self {
        Self::new(
            vocab,
            DEFAULT_CONTINUATION_PREFIX,
            DEFAULT_MAX_INPUT_CHARS_PER_WORD,
        )
    }

    pub fn continuing_subword_prefix(&self) -> &str {
        &self.continuing_subword_prefix
    }

    pub fn max_input_chars_per_word(&self) -> usize {
        self.max_input_chars_per_word
    }

    pub fn vocab(&self) -> &Arc<Vocabulary> {
        &self.vocab
    }

    /// Segment one word, appending token IDs to `out`.
    pub fn segment_word(&self, word: &str, out: &mut Vec<u32>) {
        let chars: Vec<char> = word.chars().collect();
        if chars.is_empty() {
            return;
        }

        if chars.len() > self.max_input_chars_per_word {
            tracing::trace!(chars = chars.len(), "word exceeds WordPiece limit");
            out.push(self.vocab.unk_id());
            return;
        }

        let word_start = out.len();
        let mut pos = 0;

        while pos < chars.len() {
            let matched = if pos == 0 {
                self.trie.find_longest_match(&chars, pos)
            } else {
                self.trie
                    .find_longest_match_with_prefix(&self.continuing_subword_prefix, &chars, pos)
            };

            match matched {
                Some((token_id, length)) => {
                    out.push(token_id);
                    pos += length;
                }
                None => {
                    // Whole word degrades to unk
                    tracing::trace!(word, pos, "no WordPiece match");
                    out.truncate(word_start);
                    out.push(self.vocab.unk_id());
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocab::SpecialRole;

    fn model(tokens: &[&str]) -> WordPiece {
        let mut builder = Vocabulary::builder();
        builder.add_token("[UNK]", 0, None).unwrap();
        for (i, token) in tokens.iter().enumerate() {
            builder.add_token(token, i as u32 + 1, None).unwrap();
        }
        builder.bind_role(SpecialRole::Unk, "[UNK]").unwrap();
        WordPiece::with_defaults(Arc::new(builder.build().unwrap()))
    }

    fn segment(model: &WordPiece, word: &str) -> Vec<String> {
        let mut ids = Vec::new();
        model.segment_word(word, &mut ids);
        ids.iter()
            .map(|&id| model.vocab().get_token(id).unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_prefix_then_continuation() {
        let model = model(&["un", "##able", "##fit"]);
        assert_eq!(segment(&model, "unfit"), vec!["un", "##fit"]);
    }

    #[test]
    fn test_failed_suffix_degrades_whole_word() {
        let model = model(&["un", "##able", "##fit"]);
        // "un" matches, but "workable" has no continuation path
        assert_eq!(segment(&model, "unworkable"), vec!["[UNK]"]);
    }

    #[test]
    fn test_no_first_piece() {
        let model = model(&["un", "##fit"]);
        assert_eq!(segment(&model, "fit"), vec!["[UNK]"]);
    }

    #[test]
    fn test_longest_match_wins() {
        let model = model(&["a", "ab", "abc", "##d", "##cd"]);
        // "abc" is longest, then "##d"; greedy never backtracks to "ab" + "##cd"
        assert_eq!(segment(&model, "abcd"), vec!["abc", "##d"]);
    }

    #[test]
    fn test_word_limit() {
        let mut builder = Vocabulary::builder();
        builder.add_token("[UNK]", 0, None).unwrap();
        builder.add_token("a", 1, None).unwrap();
        builder.add_token("##a", 2, None).unwrap();
        builder.bind_role(SpecialRole::Unk, "[UNK]").unwrap();
        let model = WordPiece::new(Arc::new(builder.build().unwrap()), "##", 3);

        assert_eq!(segment(&model, "aaa"), vec!["a", "##a", "##a"]);
        assert_eq!(segment(&model, "aaaa"), vec!["[UNK]"]);
    }

    #[test]
    fn test_special_tokens_not_matched() {
        let model = model(&["[", "##UNK", "##]"]);
        // the literal text "[UNK]" is segmented, not mapped to the special token
        assert_eq!(segment(&model, "[UNK]"), vec!["[", "##UNK", "##]"]);
    }

    #[test]
    fn test_unknown_after_earlier_words_keeps_them() {
        let model = model(&["hi", "un", "##fit"]);
        let mut ids = Vec::new();
        model.segment_word("hi", &mut ids);
        model.segment_word("unxx", &mut ids);

        assert_eq!(ids, vec![1, 0]);
    }
}
