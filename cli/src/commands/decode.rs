//! Decode command implementation.

use clap::Parser;

/// Decode command arguments.
#[derive(Parser)]
pub struct DecodeCommand {
    /// Path to the tokenizer.json model file
    #[arg(short, long)]
    pub tokenizer: String,

    /// Token IDs to decode (comma or space separated)
    #[arg(short, long)]
    pub ids: String,

    /// Print the token strings instead of the decoded text
    #[arg(long, default_value_t = false)]
    pub tokens: bool,
}

use super::load_tokenizer;
use anyhow::{Context, Result as AnyhowResult};

pub fn run(cmd: DecodeCommand) -> AnyhowResult<()> {
    // Load tokenizer
    let tokenizer = load_tokenizer(&cmd.tokenizer)?;

    // Parse token IDs
    let ids: Vec<u32> = cmd
        .ids
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<u32>()
                .with_context(|| format!("invalid token ID {:?}", s))
        })
        .collect::<AnyhowResult<Vec<_>>>()?;

    if cmd.tokens {
        let tokens = tokenizer.convert_ids_to_tokens(&ids)?;
        println!("{}", tokens.join(" "));
    } else {
        println!("{}", tokenizer.decode(&ids));
    }

    Ok(())
}
