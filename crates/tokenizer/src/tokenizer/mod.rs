//! Main tokenizer implementation.
//!
//! This module provides the high-level `Tokenizer` struct that ties the
//! vocabulary, segmentation model, normalizer, pre-tokenizer and decoder
//! loaded from one model file together.

mod batch;

use crate::decoder::Decoder;
use crate::io::{ModelParts, TokenizerLoader};
use crate::pre_tokenizer::{Normalizer, Splitter};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::path::Path;
use std::sync::Arc;
use subword_core::{Model, ModelKind, Result, SpecialTokens, TokenizerError, Vocabulary};
use tracing::{debug, trace};

/// Default limit on input size, in bytes.
pub const DEFAULT_MAX_INPUT_BYTES: usize = 1_000_000;

/// Runtime options, independent of the model file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizerOptions {
    /// Inputs longer than this many bytes are rejected
    pub max_input_bytes: usize,
    /// Size of a dedicated thread pool for batch calls; `None` uses the global rayon pool
    pub num_threads: Option<usize>,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            num_threads: None,
        }
    }
}

/// Builder for creating a tokenizer.
#[derive(Debug, Clone, Default)]
pub struct TokenizerBuilder {
    options: TokenizerOptions,
}

impl TokenizerBuilder {
    /// Create a new tokenizer builder with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the input size limit.
    pub fn max_input_bytes(mut self, max: usize) -> Self {
        self.options.max_input_bytes = max;
        self
    }

    /// Run batch calls on a dedicated pool of `threads` workers.
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.options.num_threads = Some(threads);
        self
    }

    /// Load a tokenizer from a `tokenizer.json` file.
    pub fn from_file(self, path: impl AsRef<Path>) -> Result<Tokenizer> {
        let parts = TokenizerLoader::load(path.as_ref())?;
        self.build(parts)
    }

    /// Load a tokenizer from an in-memory `tokenizer.json` document.
    pub fn from_json(self, json: &str) -> Result<Tokenizer> {
        let parts = TokenizerLoader::from_str(json)?;
        self.build(parts)
    }

    /// Build the tokenizer from already loaded parts.
    pub fn build(self, parts: ModelParts) -> Result<Tokenizer> {
        Tokenizer::from_parts(parts, self.options)
    }
}

/// Main tokenizer struct.
///
/// Immutable once loaded; share it by reference or `Arc` across threads.
pub struct Tokenizer {
    /// Vocabulary
    vocab: Arc<Vocabulary>,
    /// Segmentation model
    model: Model,
    /// Unicode normalizer
    normalizer: Normalizer,
    /// Word splitter
    splitter: Splitter,
    /// Detokenization convention
    decoder: Decoder,
    /// Runtime options
    options: TokenizerOptions,
    /// Dedicated pool for batch calls
    pool: Option<Arc<ThreadPool>>,
}

impl Tokenizer {
    /// Assemble a tokenizer from loaded parts.
    pub fn from_parts(parts: ModelParts, options: TokenizerOptions) -> Result<Self> {
        let ModelParts {
            vocab,
            model,
            normalizer,
            decoder,
        } = parts;

        let splitter = match decoder.word_prefix() {
            Some(replacement) => Splitter::metaspace(replacement),
            None => Splitter::whitespace(),
        };

        let pool = match options.num_threads {
            Some(threads) => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("subword-batch-{}", i))
                    .build()
                    .map_err(|e| TokenizerError::ThreadPool(e.to_string()))?;
                debug!(threads, "started batch thread pool");
                Some(Arc::new(pool))
            }
            None => None,
        };

        Ok(Self {
            vocab,
            model,
            normalizer: Normalizer::new(normalizer),
            splitter,
            decoder,
            options,
            pool,
        })
    }

    /// Create a tokenizer builder.
    pub fn builder() -> TokenizerBuilder {
        TokenizerBuilder::new()
    }

    /// Load a tokenizer from a `tokenizer.json` file with default options.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::builder().from_file(path)
    }

    /// Normalize text the way `tokenize` and `encode` do.
    pub fn normalize(&self, text: &str) -> String {
        self.normalizer.normalize(text)
    }

    /// Split text into subword token strings (no special tokens).
    pub fn tokenize(&self, text: &str) -> Result<Vec<String>> {
        let ids = self.segment(text)?;
        Ok(ids.iter().map(|&id| self.piece(id).to_string()).collect())
    }

    /// Encode text to token IDs.
    ///
    /// # Arguments
    /// * `text` - The text to encode
    /// * `add_special_tokens` - Whether to add the sequence start/end markers
    pub fn encode(&self, text: &str, add_special_tokens: bool) -> Result<Encoding> {
        let content = self.segment(text)?;
        let special = self.vocab.special();

        let mut ids = Vec::with_capacity(content.len() + special.marker_count());
        let mut special_tokens_mask = Vec::with_capacity(ids.capacity());

        // Add special tokens if requested
        let bos = special.bos.filter(|_| add_special_tokens);
        let eos = special.eos.filter(|_| add_special_tokens);
        if let Some(bos) = bos {
            ids.push(bos);
            special_tokens_mask.push(1);
        }
        special_tokens_mask.resize(special_tokens_mask.len() + content.len(), 0);
        ids.extend(content);
        if let Some(eos) = eos {
            ids.push(eos);
            special_tokens_mask.push(1);
        }

        let tokens = ids.iter().map(|&id| self.piece(id).to_string()).collect();
        Ok(Encoding {
            ids,
            tokens,
            special_tokens_mask,
        })
    }

    /// Decode token IDs back to text.
    ///
    /// Special tokens other than the unknown token are dropped. IDs outside
    /// the vocabulary are rendered as the unknown token, so this never fails.
    pub fn decode(&self, ids: &[u32]) -> String {
        let unk = self.vocab.unk_id();
        let pieces: Vec<&str> = ids
            .iter()
            .filter_map(|&id| match self.vocab.get_token(id) {
                Some(_) if id != unk && self.vocab.is_special(id) => None,
                Some(token) => Some(token),
                None => {
                    trace!(id, "decoding unknown ID as the unknown token");
                    Some(self.vocab.unk_token())
                }
            })
            .collect();

        self.decoder.decode(&pieces)
    }

    /// Map token strings to IDs; unknown strings map to the unknown token.
    pub fn convert_tokens_to_ids<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<u32> {
        tokens
            .iter()
            .map(|token| self.vocab.id_of(token.as_ref()))
            .collect()
    }

    /// Map IDs to token strings.
    ///
    /// # Errors
    /// `OutOfRange` for the first ID not in the vocabulary.
    pub fn convert_ids_to_tokens(&self, ids: &[u32]) -> Result<Vec<String>> {
        ids.iter()
            .map(|&id| self.vocab.token_of(id).map(str::to_string))
            .collect()
    }

    /// Detokenize token strings, applying the same rules as `decode`.
    pub fn convert_tokens_to_text<S: AsRef<str>>(&self, tokens: &[S]) -> String {
        let unk = self.vocab.unk_id();
        let pieces: Vec<&str> = tokens
            .iter()
            .map(|token| token.as_ref())
            .filter(|token: &&str| match self.vocab.get_id(token) {
                Some(id) => id == unk || !self.vocab.is_special(id),
                None => true,
            })
            .collect();

        self.decoder.decode(&pieces)
    }

    /// Get the vocabulary size.
    pub fn vocab_size(&self) -> usize {
        self.vocab.len()
    }

    /// Look up a token's ID without the unknown-token fallback.
    pub fn token_to_id(&self, token: &str) -> Option<u32> {
        self.vocab.get_id(token)
    }

    /// Look up the token string of an ID.
    pub fn id_to_token(&self, id: u32) -> Option<&str> {
        self.vocab.get_token(id)
    }

    /// Special token bindings.
    pub fn special_tokens(&self) -> &SpecialTokens {
        self.vocab.special()
    }

    pub fn model_kind(&self) -> ModelKind {
        self.model.kind()
    }

    /// Get a reference to the vocabulary.
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn options(&self) -> &TokenizerOptions {
        &self.options
    }

    /// Normalize, split into words and segment each word.
    fn segment(&self, text: &str) -> Result<Vec<u32>> {
        // Check text size limit
        if text.len() > self.options.max_input_bytes {
            return Err(TokenizerError::InputTooLarge {
                len: text.len(),
                max: self.options.max_input_bytes,
            });
        }

        let normalized = self.normalizer.normalize(text);
        let mut ids = Vec::with_capacity(normalized.len() / 2);
        self.splitter
            .for_each_word(&normalized, |word| self.model.segment_word(word, &mut ids));
        Ok(ids)
    }

    /// Token string of an ID produced by segmentation.
    fn piece(&self, id: u32) -> &str {
        self.vocab
            .get_token(id)
            .unwrap_or_else(|| self.vocab.unk_token())
    }
}

impl std::str::FromStr for Tokenizer {
    type Err = TokenizerError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::builder().from_json(s)
    }
}

impl std::fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tokenizer")
            .field("model", &self.model.kind())
            .field("vocab_size", &self.vocab.len())
            .field("decoder", &self.decoder)
            .field("options", &self.options)
            .finish()
    }
}

/// Result of encoding text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    /// Token IDs
    pub ids: Vec<u32>,
    /// Token strings, one per ID
    pub tokens: Vec<String>,
    /// 1 for injected sequence markers, 0 for content tokens
    pub special_tokens_mask: Vec<u32>,
}

impl Encoding {
    /// Get the number of tokens.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Check if the encoding is empty.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get_ids(&self) -> &[u32] {
        &self.ids
    }

    /// Get the tokens as strings.
    pub fn get_tokens(&self) -> &[String] {
        &self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORDPIECE: &str = r###"{
        "added_tokens": [
            {"id": 0, "content": "[UNK]", "special": true},
            {"id": 1, "content": "[CLS]", "special": true},
            {"id": 2, "content": "[SEP]", "special": true}
        ],
        "normalizer": {"type": "BertNormalizer", "lowercase": true},
        "model": {
            "type": "WordPiece",
            "unk_token": "[UNK]",
            "vocab": {"[UNK]": 0, "[CLS]": 1, "[SEP]": 2, "un": 3, "##able": 4,
                      "##fit": 5, "hi": 6, "the": 7, "##re": 8}
        }
    }"###;

    fn tokenizer() -> Tokenizer {
        WORDPIECE.parse().unwrap()
    }

    #[test]
    fn test_tokenize() {
        let tokenizer = tokenizer();
        assert_eq!(tokenizer.tokenize("Unfit  THERE").unwrap(), vec!["un", "##fit", "the", "##re"]);
        assert_eq!(tokenizer.tokenize("unworkable hi").unwrap(), vec!["[UNK]", "hi"]);
        assert!(tokenizer.tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_encode_with_special_tokens() {
        let tokenizer = tokenizer();

        let plain = tokenizer.encode("hi", false).unwrap();
        let marked = tokenizer.encode("hi", true).unwrap();
        assert_eq!(plain.ids, vec![6]);
        assert_eq!(marked.ids, vec![1, 6, 2]);
        assert_eq!(marked.tokens, vec!["[CLS]", "hi", "[SEP]"]);
        assert_eq!(marked.special_tokens_mask, vec![1, 0, 1]);
        assert_eq!(
            marked.len(),
            plain.len() + tokenizer.special_tokens().marker_count()
        );
        assert_eq!(tokenizer.decode(&marked.ids), tokenizer.decode(&plain.ids));
    }

    #[test]
    fn test_decode() {
        let tokenizer = tokenizer();
        assert_eq!(tokenizer.decode(&[1, 3, 5, 7, 8, 2]), "unfit there");
        // unknown stays visible, out-of-range IDs render as unknown
        assert_eq!(tokenizer.decode(&[0, 6, 999]), "[UNK] hi [UNK]");
        assert_eq!(tokenizer.decode(&[]), "");
    }

    #[test]
    fn test_conversions() {
        let tokenizer = tokenizer();
        assert_eq!(tokenizer.convert_tokens_to_ids(&["un", "##fit", "nope"]), vec![3, 5, 0]);
        assert_eq!(
            tokenizer.convert_ids_to_tokens(&[3, 5]).unwrap(),
            vec!["un", "##fit"]
        );
        assert!(matches!(
            tokenizer.convert_ids_to_tokens(&[3, 42]),
            Err(TokenizerError::OutOfRange(42))
        ));
        assert_eq!(
            tokenizer.convert_tokens_to_text(&["[CLS]", "un", "##fit", "[UNK]", "[SEP]"]),
            "unfit [UNK]"
        );
    }

    #[test]
    fn test_input_limit() {
        let tokenizer = Tokenizer::builder()
            .max_input_bytes(4)
            .from_json(WORDPIECE)
            .unwrap();
        assert!(tokenizer.tokenize("hi").is_ok());
        assert!(matches!(
            tokenizer.encode("hi hi", false),
            Err(TokenizerError::InputTooLarge { len: 5, max: 4 })
        ));
    }

    #[test]
    fn test_accessors() {
        let tokenizer = tokenizer();
        assert_eq!(tokenizer.vocab_size(), 9);
        assert_eq!(tokenizer.model_kind(), ModelKind::WordPiece);
        assert_eq!(tokenizer.token_to_id("##fit"), Some(5));
        assert_eq!(tokenizer.token_to_id("fit"), None);
        assert_eq!(tokenizer.id_to_token(6), Some("hi"));
        assert_eq!(tokenizer.id_to_token(60), None);
        assert_eq!(tokenizer.normalize("  HÉ\tthere "), "he there");
        assert_eq!(tokenizer.options(), &TokenizerOptions::default());
    }

    #[test]
    fn test_tokenizer_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Tokenizer>();
    }
}
