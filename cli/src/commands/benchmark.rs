//! Benchmark command implementation.

use clap::Parser;

/// Benchmark command arguments.
#[derive(Parser)]
pub struct BenchmarkCommand {
    /// Path to the tokenizer.json model file
    #[arg(short, long)]
    pub tokenizer: String,

    /// Path to input text file for benchmarking
    #[arg(short, long)]
    pub input: String,

    /// Number of iterations to run
    #[arg(short = 'n', long, default_value_t = 100)]
    pub iterations: usize,

    /// Encode the file line by line as one batch
    #[arg(short, long, default_value_t = false)]
    pub batch: bool,

    /// Worker threads for batch mode (rayon default if not specified)
    #[arg(long)]
    pub threads: Option<usize>,
}

use anyhow::{Context, Result as AnyhowResult};
use std::fs;
use std::path::Path;
use std::time::Instant;
use subword_tokenizer::Tokenizer;

pub fn run(cmd: BenchmarkCommand) -> AnyhowResult<()> {
    // Load tokenizer
    let mut builder = Tokenizer::builder();
    if let Some(threads) = cmd.threads {
        builder = builder.num_threads(threads);
    }
    let tokenizer = builder
        .from_file(Path::new(&cmd.tokenizer))
        .with_context(|| format!("failed to load tokenizer from {}", cmd.tokenizer))?;

    // Read input text
    let text = fs::read_to_string(&cmd.input)
        .with_context(|| format!("failed to read {}", cmd.input))?;
    let lines: Vec<&str> = text.lines().collect();
    let iterations = cmd.iterations.max(1);

    println!("Benchmarking encoding...");
    println!("  Model: {}", tokenizer.model_kind());
    println!("  Text length: {} bytes", text.len());
    println!("  Iterations: {}", iterations);
    println!();

    let encode_once = || -> AnyhowResult<usize> {
        if cmd.batch {
            let encodings = tokenizer.encode_batch(&lines, false)?;
            Ok(encodings.iter().map(|e| e.len()).sum())
        } else {
            Ok(tokenizer.encode(&text, false)?.len())
        }
    };

    // Warmup
    let token_count = encode_once()?;

    // Benchmark
    let start = Instant::now();
    for _ in 0..iterations {
        encode_once()?;
    }
    let elapsed = start.elapsed();

    let avg_time_ms = elapsed.as_secs_f64() * 1000.0 / iterations as f64;
    let tokens_per_sec = token_count as f64 * iterations as f64 / elapsed.as_secs_f64();

    println!("Results:");
    println!("  Tokens per pass: {}", token_count);
    println!("  Total time: {:.2}s", elapsed.as_secs_f64());
    println!("  Average time: {:.3}ms", avg_time_ms);
    println!("  Throughput: {:.0} tokens/s", tokens_per_sec);

    Ok(())
}
