//! Tokenize command implementation.

use clap::Parser;

/// Tokenize command arguments.
#[derive(Parser)]
pub struct TokenizeCommand {
    /// Path to the tokenizer.json model file
    #[arg(short, long)]
    pub tokenizer: String,

    /// Text to tokenize ("-" reads stdin)
    #[arg(short, long)]
    pub input: String,

    /// Tokenize each input line separately
    #[arg(short, long, default_value_t = false)]
    pub lines: bool,
}

use super::{load_tokenizer, read_input};
use anyhow::Result as AnyhowResult;

pub fn run(cmd: TokenizeCommand) -> AnyhowResult<()> {
    let tokenizer = load_tokenizer(&cmd.tokenizer)?;
    let input_text = read_input(cmd.input)?;

    if cmd.lines {
        let lines: Vec<&str> = input_text.lines().collect();
        for tokens in tokenizer.try_batch_tokenize(&lines)? {
            println!("{}", tokens.join(" "));
        }
    } else {
        let tokens = tokenizer.tokenize(&input_text)?;
        println!("{}", tokens.join(" "));
    }

    Ok(())
}
