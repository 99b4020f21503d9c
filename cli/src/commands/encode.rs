//! Encode command implementation.

use clap::Parser;

/// Encode command arguments.
#[derive(Parser)]
pub struct EncodeCommand {
    /// Path to the tokenizer.json model file
    #[arg(short, long)]
    pub tokenizer: String,

    /// Text to encode ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Add special tokens (BOS, EOS)
    #[arg(short, long, default_value_t = false)]
    pub special_tokens: bool,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<String>,
}

use super::{load_tokenizer, read_input};
use anyhow::Result as AnyhowResult;

pub fn run(cmd: EncodeCommand) -> AnyhowResult<()> {
    // Load tokenizer
    let tokenizer = load_tokenizer(&cmd.tokenizer)?;
    let input_text = read_input(cmd.input)?;

    // Encode text
    let encoding = tokenizer.encode(&input_text, cmd.special_tokens)?;

    // Output
    let ids_str: Vec<String> = encoding.ids.iter().map(|id| id.to_string()).collect();
    let output = ids_str.join(" ");

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &output)?;
            println!("Encoded {} tokens to {}", encoding.len(), path);
        }
        None => {
            println!("{}", output);
        }
    }

    Ok(())
}
