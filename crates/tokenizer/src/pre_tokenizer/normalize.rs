//! Text normalization applied before segmentation.
//!
//! This module provides Unicode normalization (NFC, NFD, NFKC, NFKD) together
//! with the case, accent and whitespace handling configured by the model.
//! Steps always run in the same order so that normalizing twice gives the
//! same result as normalizing once:
//!
//! 1. control character cleanup
//! 2. Unicode normalization form
//! 3. lowercasing
//! 4. accent stripping (followed by the normalization form again)
//! 5. spacing around CJK ideographs
//! 6. whitespace collapsing
//!
//! CJK spacing comes after the form because compatibility mappings can
//! produce ideographs (U+2F00 KANGXI RADICAL ONE becomes U+4E00).

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationForm {
    /// Canonical composition
    NFC,
    /// Canonical decomposition
    NFD,
    /// Compatibility composition
    NFKC,
    /// Compatibility decomposition
    NFKD,
    /// No normalization
    #[default]
    None,
}

/// Normalizer settings, as resolved from the model configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizerConfig {
    /// Unicode normalization form
    pub form: NormalizationForm,
    /// Lowercase the text
    pub lowercase: bool,
    /// Remove combining marks after decomposition
    pub strip_accents: bool,
    /// Drop control characters and map whitespace characters to spaces
    pub clean_text: bool,
    /// Surround CJK ideographs with spaces so each becomes its own word
    pub handle_chinese_chars: bool,
}

impl NormalizerConfig {
    /// BERT-style settings: clean text, split CJK, lowercase and strip accents.
    pub fn bert(lowercase: bool) -> Self {
        Self {
            form: NormalizationForm::None,
            lowercase,
            strip_accents: lowercase,
            clean_text: true,
            handle_chinese_chars: true,
        }
    }
}

/// Text normalizer.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    /// Create a new normalizer.
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Create an NFC normalizer with no other steps.
    pub fn nfc() -> Self {
        Self::new(NormalizerConfig {
            form: NormalizationForm::NFC,
            ..Default::default()
        })
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize text.
    pub fn normalize(&self, text: &str) -> String {
        let config = &self.config;
        let mut text = text.to_string();

        if config.clean_text {
            text = clean_text(&text);
        }
        text = apply_form(&text, config.form);
        if config.lowercase {
            text = text.to_lowercase();
        }
        if config.strip_accents {
            let stripped: String = text.nfd().filter(|&c| !is_combining_mark(c)).collect();
            text = apply_form(&stripped, config.form);
        }
        if config.handle_chinese_chars {
            text = pad_chinese_chars(&text);
        }

        collapse_whitespace(&text)
    }
}

fn apply_form(text: &str, form: NormalizationForm) -> String {
    match form {
        NormalizationForm::NFC => text.nfc().collect(),
        NormalizationForm::NFD => text.nfd().collect(),
        NormalizationForm::NFKC => text.nfkc().collect(),
        NormalizationForm::NFKD => text.nfkd().collect(),
        NormalizationForm::None => text.to_string(),
    }
}

/// Drop NUL, U+FFFD and control characters; map other whitespace to ' '.
fn clean_text(text: &str) -> String {
    text.chars()
        .filter(|&c| c != '\0' && c != '\u{FFFD}')
        .filter_map(|c| {
            if c.is_whitespace() {
                Some(' ')
            } else if c.is_control() {
                None
            } else {
                Some(c)
            }
        })
        .collect()
}

fn pad_chinese_chars(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if is_chinese_char(c) {
            out.push(' ');
            out.push(c);
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

/// CJK Unified Ideographs blocks, as used by BERT.
fn is_chinese_char(c: char) -> bool {
    matches!(
        c as u32,
        0x4E00..=0x9FFF
            | 0x3400..=0x4DBF
            | 0x20000..=0x2A6DF
            | 0x2A700..=0x2B73F
            | 0x2B740..=0x2B81F
            | 0x2B820..=0x2CEAF
            | 0xF900..=0xFAFF
            | 0x2F800..=0x2FA1F
    )
}

/// Runs of whitespace become one ASCII space; leading and trailing whitespace is removed.
fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
