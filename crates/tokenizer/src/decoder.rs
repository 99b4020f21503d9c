//! Detokenization: turning token strings back into text.
//!
//! Runs of byte-fallback pieces (`<0xHH>`) are first reassembled into UTF-8
//! text, invalid sequences decoding to U+FFFD. Word boundaries are then
//! restored according to the model's convention.

use std::borrow::Cow;
use subword_core::models::parse_byte_token;

/// Word-start marker of SentencePiece-style vocabularies (U+2581).
pub const DEFAULT_METASPACE_REPLACEMENT: char = '\u{2581}';

/// How pieces encode word boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoder {
    /// Pieces starting with `prefix` continue the previous word
    WordPiece { prefix: String },
    /// Pieces starting with `replacement` begin a new word
    Metaspace { replacement: char },
    /// No boundary marker: pieces are joined with single spaces
    Whitespace,
}

impl Decoder {
    /// The character the pre-tokenizer puts in front of every word, if any.
    pub fn word_prefix(&self) -> Option<char> {
        match self {
            Decoder::WordPiece { .. } | Decoder::Whitespace => None,
            Decoder::Metaspace { replacement } => Some(*replacement),
        }
    }

    /// Join pieces into text.
    pub fn decode<S: AsRef<str>>(&self, tokens: &[S]) -> String {
        let pieces = reassemble_bytes(tokens);
        let mut out = String::new();

        for (i, piece) in pieces.iter().enumerate() {
            match self {
                Decoder::WordPiece { prefix } => match piece.strip_prefix(prefix.as_str()) {
                    Some(rest) if !prefix.is_empty() => out.push_str(rest),
                    _ => {
                        if i > 0 {
                            out.push(' ');
                        }
                        out.push_str(piece);
                    }
                },
                Decoder::Metaspace { replacement } => match piece.strip_prefix(*replacement) {
                    Some(rest) => {
                        if i > 0 {
                            out.push(' ');
                        }
                        out.push_str(rest);
                    }
                    None => out.push_str(piece),
                },
                Decoder::Whitespace => {
                    if i > 0 {
                        out.push(' ');
                    }
                    out.push_str(piece);
                }
            }
        }

        out
    }
}

/// Collapse each run of byte pieces into the text it encodes.
fn reassemble_bytes<S: AsRef<str>>(tokens: &[S]) -> Vec<Cow<'_, str>> {
    let mut pieces = Vec::with_capacity(tokens.len());
    let mut bytes = Vec::new();

    for token in tokens {
        let token = token.as_ref();
        match parse_byte_token(token) {
            Some(byte) => bytes.push(byte),
            None => {
                flush_bytes(&mut bytes, &mut pieces);
                pieces.push(Cow::Borrowed(token));
            }
        }
    }
    flush_bytes(&mut bytes, &mut pieces);

    pieces
}

fn flush_bytes(bytes: &mut Vec<u8>, pieces: &mut Vec<Cow<'_, str>>) {
    if !bytes.is_empty() {
        pieces.push(Cow::Owned(String::from_utf8_lossy(bytes).into_owned()));
        bytes.clear();
    }
}
