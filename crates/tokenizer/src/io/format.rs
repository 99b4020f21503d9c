//! Format definitions for `tokenizer.json`.
//!
//! These structures mirror the HuggingFace `tokenizer.json` layout closely
//! enough to deserialize it with serde. They are validated and turned into
//! runtime types by [`super::load`]. Fields the engine does not use are
//! ignored during deserialization.

use serde::Deserialize;

/// Top level of a `tokenizer.json` file.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenizerFile {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub added_tokens: Vec<AddedTokenRecord>,
    #[serde(default)]
    pub normalizer: Option<NormalizerRecord>,
    /// Only the metaspace replacement is read from here
    #[serde(default)]
    pub pre_tokenizer: Option<serde_json::Value>,
    #[serde(default)]
    pub post_processor: Option<PostProcessorRecord>,
    #[serde(default)]
    pub decoder: Option<DecoderRecord>,
    #[serde(default)]
    pub model: Option<ModelRecord>,
}

/// An `added_tokens` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct AddedTokenRecord {
    pub id: u32,
    pub content: String,
    #[serde(default)]
    pub special: bool,
}

/// The `model` section.
///
/// `vocab` is kept untyped because its shape depends on `type`: an object
/// `token -> id` for WordPiece and BPE, an array of `[piece, score]` for
/// Unigram.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelRecord {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub vocab: Option<serde_json::Value>,
    #[serde(default)]
    pub merges: Option<Vec<MergeRecord>>,
    #[serde(default)]
    pub unk_token: Option<String>,
    #[serde(default)]
    pub unk_id: Option<u32>,
    #[serde(default)]
    pub continuing_subword_prefix: Option<String>,
    #[serde(default)]
    pub max_input_chars_per_word: Option<usize>,
    #[serde(default)]
    pub byte_fallback: Option<bool>,
}

/// A merge rule, either `"a b"` or `["a", "b"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum MergeRecord {
    Joined(String),
    Pair(String, String),
}

impl MergeRecord {
    /// Split into the left and right parts.
    pub fn parts(&self) -> Option<(&str, &str)> {
        match self {
            MergeRecord::Joined(s) => s.split_once(' '),
            MergeRecord::Pair(a, b) => Some((a, b)),
        }
    }
}

/// A Unigram vocabulary entry: `[piece, score]`.
#[derive(Debug, Clone, Deserialize)]
pub struct ScoredPiece(pub String, pub f64);

/// Pattern of a `Replace` normalizer or decoder.
#[derive(Debug, Clone, Deserialize)]
pub enum ReplacePattern {
    String(String),
    Regex(String),
}

fn yes() -> bool {
    true
}

/// The `normalizer` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum NormalizerRecord {
    BertNormalizer {
        #[serde(default = "yes")]
        clean_text: bool,
        #[serde(default = "yes")]
        handle_chinese_chars: bool,
        #[serde(default)]
        strip_accents: Option<bool>,
        #[serde(default = "yes")]
        lowercase: bool,
    },
    Sequence {
        normalizers: Vec<NormalizerRecord>,
    },
    NFC,
    NFD,
    NFKC,
    NFKD,
    Lowercase,
    StripAccents,
    /// Whitespace is always trimmed, so this is a no-op
    Strip {
        #[serde(default = "yes")]
        left: bool,
        #[serde(default = "yes")]
        right: bool,
    },
    /// Accepted only as the metaspace prefixing step
    Prepend {
        prepend: String,
    },
    /// Accepted only as the metaspace space replacement
    Replace {
        pattern: ReplacePattern,
        content: String,
    },
}

/// A `[token, id]` pair used by the BERT and RoBERTa processors.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRef(pub String, pub u32);

/// The `post_processor` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum PostProcessorRecord {
    BertProcessing {
        sep: TokenRef,
        cls: TokenRef,
    },
    RobertaProcessing {
        sep: TokenRef,
        cls: TokenRef,
    },
    TemplateProcessing {
        single: Vec<TemplatePiece>,
    },
    Sequence {
        processors: Vec<PostProcessorRecord>,
    },
    /// Offsets only; nothing to inject
    ByteLevel {},
}

/// One element of a template.
#[derive(Debug, Clone, Deserialize)]
pub enum TemplatePiece {
    SpecialToken { id: String },
    Sequence { id: String },
}

/// The `decoder` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum DecoderRecord {
    WordPiece {
        #[serde(default)]
        prefix: Option<String>,
    },
    Metaspace {
        #[serde(default)]
        replacement: Option<String>,
    },
    Sequence {
        decoders: Vec<DecoderRecord>,
    },
    Replace {
        pattern: ReplacePattern,
        content: String,
    },
    /// Byte pieces are always reassembled
    ByteFallback {},
    Fuse {},
    Strip {},
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_record_shapes() {
        let merges: Vec<MergeRecord> = serde_json::from_str(r#"["l o", ["lo", "w"]]"#).unwrap();
        assert_eq!(merges[0].parts(), Some(("l", "o")));
        assert_eq!(merges[1].parts(), Some(("lo", "w")));

        let bad = MergeRecord::Joined("low".to_string());
        assert_eq!(bad.parts(), None);
    }

    #[test]
    fn test_normalizer_records() {
        let record: NormalizerRecord = serde_json::from_str(
            r#"{"type": "Sequence", "normalizers": [{"type": "NFKC"}, {"type": "Lowercase"}]}"#,
        )
        .unwrap();
        match record {
            NormalizerRecord::Sequence { normalizers } => assert_eq!(normalizers.len(), 2),
            other => panic!("unexpected normalizer: {:?}", other),
        }

        let bert: NormalizerRecord =
            serde_json::from_str(r#"{"type": "BertNormalizer", "strip_accents": null}"#).unwrap();
        assert!(matches!(
            bert,
            NormalizerRecord::BertNormalizer {
                clean_text: true,
                lowercase: true,
                strip_accents: None,
                ..
            }
        ));

        assert!(serde_json::from_str::<NormalizerRecord>(r#"{"type": "Precompiled"}"#).is_err());
    }

    #[test]
    fn test_post_processor_records() {
        let record: PostProcessorRecord = serde_json::from_str(
            r#"{
                "type": "TemplateProcessing",
                "single": [
                    {"SpecialToken": {"id": "[CLS]", "type_id": 0}},
                    {"Sequence": {"id": "A", "type_id": 0}},
                    {"SpecialToken": {"id": "[SEP]", "type_id": 0}}
                ],
                "pair": [],
                "special_tokens": {}
            }"#,
        )
        .unwrap();
        match record {
            PostProcessorRecord::TemplateProcessing { single } => assert_eq!(single.len(), 3),
            other => panic!("unexpected post processor: {:?}", other),
        }

        let bert: PostProcessorRecord = serde_json::from_str(
            r#"{"type": "BertProcessing", "sep": ["[SEP]", 102], "cls": ["[CLS]", 101]}"#,
        )
        .unwrap();
        assert!(matches!(bert, PostProcessorRecord::BertProcessing { .. }));
    }

    #[test]
    fn test_model_record_ignores_unknown_fields() {
        let record: ModelRecord = serde_json::from_str(
            r#"{"type": "BPE", "dropout": null, "unk_token": "<unk>", "fuse_unk": true,
                "byte_fallback": null, "vocab": {}, "merges": []}"#,
        )
        .unwrap();
        assert_eq!(record.kind.as_deref(), Some("BPE"));
        assert_eq!(record.byte_fallback, None);
        assert_eq!(record.merges, Some(vec![]));
    }
}
