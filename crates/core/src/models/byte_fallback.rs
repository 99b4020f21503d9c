//! Byte-level fallback for unknown characters.
//!
//! When enabled, a character missing from the vocabulary is emitted as its
//! UTF-8 bytes using `<0xHH>` pieces instead of the unknown token.

use crate::core::vocab::Vocabulary;

/// Byte-level fallback encoder.
#[derive(Debug, Clone)]
pub struct ByteFallback {
    /// Token ID for each byte value, when enabled and present in the vocabulary
    byte_ids: Option<Box<[Option<u32>; 256]>>,
}

impl ByteFallback {
    /// Create a fallback handler, resolving byte pieces against the vocabulary.
    pub fn new(enabled: bool, vocab: &Vocabulary) -> Self {
        if !enabled {
            return Self::disabled();
        }

        let mut byte_ids = Box::new([None; 256]);
        for (byte, slot) in byte_ids.iter_mut().enumerate() {
            *slot = vocab.get_id(&byte_token(byte as u8));
        }

        let missing = byte_ids.iter().filter(|id| id.is_none()).count();
        if missing > 0 {
            tracing::debug!(missing, "byte fallback enabled with incomplete byte pieces");
        }

        Self {
            byte_ids: Some(byte_ids),
        }
    }

    /// Disable byte fallback.
    pub fn disabled() -> Self {
        Self { byte_ids: None }
    }

    /// Check if fallback is enabled.
    pub fn is_enabled(&self) -> bool {
        self.byte_ids.is_some()
    }

    /// Encode an unknown character.
    ///
    /// Pushes one piece per UTF-8 byte when every byte piece exists, otherwise
    /// the unknown token. Returns the number of pieces pushed.
    pub fn encode_unknown(&self, ch: char, unk_id: u32, out: &mut Vec<u32>) -> usize {
        let Some(byte_ids) = &self.byte_ids else {
            out.push(unk_id);
            return 1;
        };

        let mut buf = [0u8; 4];
        let bytes = ch.encode_utf8(&mut buf).as_bytes();
        let ids: Option<Vec<u32>> = bytes.iter().map(|&b| byte_ids[b as usize]).collect();

        match ids {
            Some(ids) => {
                out.extend_from_slice(&ids);
                ids.len()
            }
            None => {
                out.push(unk_id);
                1
            }
        }
    }
}

/// The vocabulary piece for a raw byte, e.g. `<0x0A>`.
pub fn byte_token(byte: u8) -> String {
    format!("<0x{:02X}>", byte)
}

/// Parse a `<0xHH>` piece back into its byte.
pub fn parse_byte_token(token: &str) -> Option<u8> {
    let hex = token.strip_prefix("<0x")?.strip_suffix('>')?;
    if hex.len() != 2 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u8::from_str_radix(hex, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vocab::SpecialRole;

    fn vocab_with_bytes(bytes: &[u8]) -> Vocabulary {
        let mut builder = Vocabulary::builder();
        builder.add_token("<unk>", 0, None).unwrap();
        for (i, &b) in bytes.iter().enumerate() {
            builder.add_token(&byte_token(b), i as u32 + 1, None).unwrap();
        }
        builder.bind_role(SpecialRole::Unk, "<unk>").unwrap();
        builder.build().unwrap()
    }

    #[test]
    fn test_byte_fallback_disabled() {
        let vocab = vocab_with_bytes(&[0x61]);
        let fallback = ByteFallback::new(false, &vocab);
        let mut out = Vec::new();

        assert_eq!(fallback.encode_unknown('a', vocab.unk_id(), &mut out), 1);
        assert_eq!(out, vec![vocab.unk_id()]);
        assert!(!fallback.is_enabled());
    }

    #[test]
    fn test_byte_fallback_enabled() {
        // "é" is C3 A9 in UTF-8
        let vocab = vocab_with_bytes(&[0xC3, 0xA9]);
        let fallback = ByteFallback::new(true, &vocab);
        let mut out = Vec::new();

        assert_eq!(fallback.encode_unknown('é', vocab.unk_id(), &mut out), 2);
        assert_eq!(out, vec![1, 2]);
    }

    #[test]
    fn test_missing_byte_piece_uses_unk() {
        let vocab = vocab_with_bytes(&[0xC3]);
        let fallback = ByteFallback::new(true, &vocab);
        let mut out = Vec::new();

        fallback.encode_unknown('é', vocab.unk_id(), &mut out);
        assert_eq!(out, vec![0]);
    }

    #[test]
    fn test_byte_token_format() {
        assert_eq!(byte_token(0x0A), "<0x0A>");
        assert_eq!(parse_byte_token("<0xE4>"), Some(0xE4));
        assert_eq!(parse_byte_token("<0x0a>"), Some(0x0A));
        assert_eq!(parse_byte_token("<0xE>"), None);
        assert_eq!(parse_byte_token("0xE4"), None);
        assert_eq!(parse_byte_token("<0xZZ>"), None);
        // from_str_radix alone would accept a sign
        assert_eq!(parse_byte_token("<0x+A>"), None);
        assert_eq!(parse_byte_token("<0x-1>"), None);
    }
}
