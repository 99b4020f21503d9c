//! CLI commands for the subword tokenizer.

pub mod benchmark;
pub mod decode;
pub mod encode;
pub mod tokenize;

pub use benchmark::BenchmarkCommand;
pub use decode::DecodeCommand;
pub use encode::EncodeCommand;
pub use tokenize::TokenizeCommand;

use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use subword_tokenizer::Tokenizer;

/// Load a tokenizer, attaching the path to any error.
pub(crate) fn load_tokenizer(path: &str) -> Result<Tokenizer> {
    tracing::debug!(path, "loading tokenizer");
    Tokenizer::from_file(Path::new(path))
        .with_context(|| format!("failed to load tokenizer from {}", path))
}

/// The input argument itself, or stdin when it is "-".
pub(crate) fn read_input(input: String) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("failed to read stdin")?;
        Ok(buffer)
    } else {
        Ok(input)
    }
}
