//! Batch operations.
//!
//! Items are processed independently on rayon; indexed `collect` keeps the
//! results in input order. Calls run on the dedicated pool when one is
//! configured, otherwise on the global pool.

use super::{Encoding, Tokenizer};
use rayon::prelude::*;
use subword_core::Result;

impl Tokenizer {
    /// Tokenize every text, reporting failures per item.
    pub fn batch_tokenize<S>(&self, texts: &[S]) -> Vec<Result<Vec<String>>>
    where
        S: AsRef<str> + Sync,
    {
        self.install(|| {
            texts
                .par_iter()
                .map(|text| self.tokenize(text.as_ref()))
                .collect()
        })
    }

    /// Tokenize every text, failing on the first bad item in input order.
    pub fn try_batch_tokenize<S>(&self, texts: &[S]) -> Result<Vec<Vec<String>>>
    where
        S: AsRef<str> + Sync,
    {
        self.batch_tokenize(texts).into_iter().collect()
    }

    /// Encode a batch of texts (parallelized).
    ///
    /// Fails on the first bad item in input order.
    pub fn encode_batch<S>(&self, texts: &[S], add_special_tokens: bool) -> Result<Vec<Encoding>>
    where
        S: AsRef<str> + Sync,
    {
        let encodings: Vec<Result<Encoding>> = self.install(|| {
            texts
                .par_iter()
                .map(|text| self.encode(text.as_ref(), add_special_tokens))
                .collect()
        });
        encodings.into_iter().collect()
    }

    /// Decode a batch of ID sequences (parallelized).
    pub fn decode_batch<I>(&self, sequences: &[I]) -> Vec<String>
    where
        I: AsRef<[u32]> + Sync,
    {
        self.install(|| {
            sequences
                .par_iter()
                .map(|ids| self.decode(ids.as_ref()))
                .collect()
        })
    }

    fn install<R, F>(&self, op: F) -> R
    where
        R: Send,
        F: FnOnce() -> R + Send,
    {
        match &self.pool {
            Some(pool) => pool.install(op),
            None => op(),
        }
    }
}
