//! Load functionality for `tokenizer.json` model files.
//!
//! Loading is all-or-nothing: the file is deserialized into the
//! [`super::format`] structures, validated, and only then turned into the
//! runtime vocabulary, model, normalizer settings and decoder.

use super::format::{
    AddedTokenRecord, DecoderRecord, MergeRecord, ModelRecord, NormalizerRecord,
    PostProcessorRecord, ReplacePattern, ScoredPiece, TemplatePiece, TokenizerFile,
};
use crate::decoder::{Decoder, DEFAULT_METASPACE_REPLACEMENT};
use crate::pre_tokenizer::normalize::{NormalizationForm, NormalizerConfig};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;
use std::sync::Arc;
use subword_core::models::wordpiece::{
    DEFAULT_CONTINUATION_PREFIX, DEFAULT_MAX_INPUT_CHARS_PER_WORD,
};
use subword_core::{
    Bpe, MergeRules, Model, ModelKind, Result, SpecialRole, TokenizerError, Unigram, Vocabulary,
    VocabularyBuilder, WordPiece,
};
use tracing::{debug, info};

/// Everything a tokenizer needs, as read from one model file.
#[derive(Debug, Clone)]
pub struct ModelParts {
    pub vocab: Arc<Vocabulary>,
    pub model: Model,
    pub normalizer: NormalizerConfig,
    pub decoder: Decoder,
}

/// Conventional names for roles the post processor does not bind.
const ROLE_CONVENTIONS: &[(SpecialRole, &[&str])] = &[
    (SpecialRole::Bos, &["[CLS]", "<s>"]),
    (SpecialRole::Eos, &["[SEP]", "</s>"]),
    (SpecialRole::Cls, &["[CLS]", "<cls>"]),
    (SpecialRole::Sep, &["[SEP]", "<sep>"]),
    (SpecialRole::Pad, &["[PAD]", "<pad>"]),
    (SpecialRole::Mask, &["[MASK]", "<mask>"]),
];

/// Tokenizer loader - turns `tokenizer.json` into [`ModelParts`].
pub struct TokenizerLoader;

impl TokenizerLoader {
    /// Load a model file from disk.
    ///
    /// # Errors
    /// `NotFound` if the file does not exist, `Io` for other read failures,
    /// `Json`/`Parse` for malformed content and `UnsupportedModel` for an
    /// unknown `model.type`.
    pub fn load(path: &Path) -> Result<ModelParts> {
        let file = File::open(path).map_err(|err| match err.kind() {
            ErrorKind::NotFound => TokenizerError::NotFound {
                path: path.to_path_buf(),
            },
            _ => TokenizerError::Io {
                path: path.to_path_buf(),
                err,
            },
        })?;

        let reader = BufReader::new(file);
        let data: TokenizerFile = serde_json::from_reader(reader)?;
        let parts = Self::deserialize(data)?;

        info!(
            path = %path.display(),
            model = %parts.model.kind(),
            vocab_size = parts.vocab.len(),
            "loaded tokenizer model"
        );
        Ok(parts)
    }

    /// Load a model from an in-memory JSON document.
    pub fn from_str(json: &str) -> Result<ModelParts> {
        let data: TokenizerFile = serde_json::from_str(json)?;
        Self::deserialize(data)
    }

    /// Validate a deserialized file and build the runtime parts.
    fn deserialize(data: TokenizerFile) -> Result<ModelParts> {
        let model = data
            .model
            .ok_or_else(|| TokenizerError::parse("missing \"model\" section"))?;
        let kind: ModelKind = model
            .kind
            .as_deref()
            .ok_or_else(|| TokenizerError::parse("missing \"model.type\""))?
            .parse()?;

        let mut builder = match kind {
            ModelKind::WordPiece | ModelKind::Bpe => indexed_vocab(&model)?,
            ModelKind::Unigram => scored_vocab(&model)?,
        };
        add_added_tokens(&mut builder, &data.added_tokens)?;
        bind_unknown(&mut builder, kind, &model)?;
        bind_markers(&mut builder, data.post_processor.as_ref())?;

        let vocab = Arc::new(builder.build()?);
        debug!(special = ?vocab.special(), "resolved special tokens");

        let built = match kind {
            ModelKind::WordPiece => Model::WordPiece(WordPiece::new(
                vocab.clone(),
                model
                    .continuing_subword_prefix
                    .as_deref()
                    .unwrap_or(DEFAULT_CONTINUATION_PREFIX),
                model
                    .max_input_chars_per_word
                    .unwrap_or(DEFAULT_MAX_INPUT_CHARS_PER_WORD),
            )),
            ModelKind::Bpe => {
                let merges = merge_rules(&vocab, model.merges.as_deref().unwrap_or_default())?;
                debug!(merges = merges.len(), "parsed merge rules");
                Model::Bpe(Bpe::new(
                    vocab.clone(),
                    merges,
                    model.byte_fallback.unwrap_or(false),
                ))
            }
            ModelKind::Unigram => Model::Unigram(Unigram::new(
                vocab.clone(),
                model.byte_fallback.unwrap_or(false),
            )),
        };

        let (normalizer, space_markers) = match &data.normalizer {
            Some(record) => normalizer_config(record)?,
            None => (NormalizerConfig::default(), Vec::new()),
        };
        let decoder = resolve_decoder(
            data.decoder.as_ref(),
            data.pre_tokenizer.as_ref(),
            &space_markers,
            &built,
        )?;
        check_space_markers(&space_markers, &decoder)?;
        debug!(?normalizer, ?decoder, "resolved text pipeline");

        Ok(ModelParts {
            vocab,
            model: built,
            normalizer,
            decoder,
        })
    }
}

fn vocab_section(model: &ModelRecord) -> Result<serde_json::Value> {
    model
        .vocab
        .clone()
        .ok_or_else(|| TokenizerError::parse("missing \"model.vocab\""))
}

/// WordPiece/BPE vocabulary: an object mapping tokens to IDs.
fn indexed_vocab(model: &ModelRecord) -> Result<VocabularyBuilder> {
    let entries: HashMap<String, u32> = serde_json::from_value(vocab_section(model)?)
        .map_err(|e| TokenizerError::parse(format!("invalid \"model.vocab\": {}", e)))?;

    // Sorted so that duplicate-ID errors are reported deterministically
    let mut entries: Vec<(String, u32)> = entries.into_iter().collect();
    entries.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

    let mut builder = VocabularyBuilder::with_capacity(entries.len());
    for (token, id) in &entries {
        builder.add_token(token, *id, None)?;
    }
    Ok(builder)
}

/// Unigram vocabulary: an array of `[piece, score]`, ID = position.
fn scored_vocab(model: &ModelRecord) -> Result<VocabularyBuilder> {
    let pieces: Vec<ScoredPiece> = serde_json::from_value(vocab_section(model)?)
        .map_err(|e| TokenizerError::parse(format!("invalid \"model.vocab\": {}", e)))?;

    let mut builder = VocabularyBuilder::with_capacity(pieces.len());
    for (id, ScoredPiece(piece, score)) in pieces.iter().enumerate() {
        if !score.is_finite() {
            return Err(TokenizerError::parse(format!(
                "piece {:?} has a non-finite score",
                piece
            )));
        }
        builder.add_token(piece, id as u32, Some(*score))?;
    }
    Ok(builder)
}

fn add_added_tokens(builder: &mut VocabularyBuilder, added: &[AddedTokenRecord]) -> Result<()> {
    for token in added {
        if token.special {
            builder.add_special_token(&token.content, token.id)?;
        } else if builder.get_id(&token.content) != Some(token.id) {
            builder.add_token(&token.content, token.id, None)?;
        }
    }
    Ok(())
}

fn bind_unknown(builder: &mut VocabularyBuilder, kind: ModelKind, model: &ModelRecord) -> Result<()> {
    match (kind, &model.unk_token, model.unk_id) {
        (ModelKind::Unigram, _, Some(id)) => builder.bind_role_id(SpecialRole::Unk, id),
        (_, Some(token), _) => builder.bind_role(SpecialRole::Unk, token).map(|_| ()),
        _ => Err(TokenizerError::parse(format!(
            "{} model does not declare an unknown token",
            kind
        ))),
    }
}

/// Bind start/end markers from the post processor, then fill the remaining
/// roles from conventional special token names.
fn bind_markers(
    builder: &mut VocabularyBuilder,
    post_processor: Option<&PostProcessorRecord>,
) -> Result<()> {
    let explicit = post_processor.is_some();
    if let Some(record) = post_processor {
        bind_post_processor(builder, record)?;
    }

    for &(role, names) in ROLE_CONVENTIONS {
        if builder.has_role(role) {
            continue;
        }
        // The post processor is authoritative for sequence markers
        if explicit && matches!(role, SpecialRole::Bos | SpecialRole::Eos) {
            continue;
        }
        let found = names.iter().find(|name| builder.is_special(name));
        if let Some(name) = found {
            builder.bind_role(role, name)?;
        }
    }
    Ok(())
}

fn bind_post_processor(builder: &mut VocabularyBuilder, record: &PostProcessorRecord) -> Result<()> {
    match record {
        PostProcessorRecord::BertProcessing { sep, cls }
        | PostProcessorRecord::RobertaProcessing { sep, cls } => {
            bind_checked(builder, SpecialRole::Bos, &cls.0, Some(cls.1))?;
            bind_checked(builder, SpecialRole::Cls, &cls.0, Some(cls.1))?;
            bind_checked(builder, SpecialRole::Eos, &sep.0, Some(sep.1))?;
            bind_checked(builder, SpecialRole::Sep, &sep.0, Some(sep.1))?;
        }
        PostProcessorRecord::TemplateProcessing { single } => {
            let sequence = single
                .iter()
                .position(|piece| matches!(piece, TemplatePiece::Sequence { .. }))
                .ok_or_else(|| TokenizerError::parse("template has no sequence slot"))?;
            let special = |piece: &TemplatePiece| match piece {
                TemplatePiece::SpecialToken { id } => Some(id.clone()),
                TemplatePiece::Sequence { .. } => None,
            };

            if let Some(bos) = single[..sequence].iter().find_map(special) {
                bind_checked(builder, SpecialRole::Bos, &bos, None)?;
            }
            if let Some(eos) = single[sequence + 1..].iter().find_map(special) {
                bind_checked(builder, SpecialRole::Eos, &eos, None)?;
            }
        }
        PostProcessorRecord::Sequence { processors } => {
            for processor in processors {
                bind_post_processor(builder, processor)?;
            }
        }
        PostProcessorRecord::ByteLevel {} => {}
    }
    Ok(())
}

fn bind_checked(
    builder: &mut VocabularyBuilder,
    role: SpecialRole,
    token: &str,
    expected_id: Option<u32>,
) -> Result<()> {
    let id = builder.bind_role(role, token)?;
    match expected_id {
        Some(expected) if expected != id => Err(TokenizerError::parse(format!(
            "post processor binds {:?} to ID {}, vocabulary has {}",
            token, expected, id
        ))),
        _ => Ok(()),
    }
}

fn merge_rules(vocab: &Vocabulary, records: &[MergeRecord]) -> Result<MergeRules> {
    let pairs = records
        .iter()
        .enumerate()
        .map(|(rank, record)| {
            record.parts().ok_or_else(|| {
                TokenizerError::parse(format!("malformed merge rule at rank {}: {:?}", rank, record))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    MergeRules::from_token_pairs(vocab, pairs)
}

/// Fold a normalizer record into flags.
///
/// Steps run in a fixed order regardless of their order in a `Sequence`.
/// Also returns the characters `Prepend`/`Replace` put in place of spaces;
/// the word splitter inserts those itself, so they must match the decoder.
fn normalizer_config(record: &NormalizerRecord) -> Result<(NormalizerConfig, Vec<char>)> {
    let mut config = NormalizerConfig::default();
    let mut space_markers = Vec::new();
    apply_normalizer(&mut config, &mut space_markers, record)?;
    Ok((config, space_markers))
}

fn apply_normalizer(
    config: &mut NormalizerConfig,
    space_markers: &mut Vec<char>,
    record: &NormalizerRecord,
) -> Result<()> {
    match record {
        NormalizerRecord::BertNormalizer {
            clean_text,
            handle_chinese_chars,
            strip_accents,
            lowercase,
        } => {
            config.clean_text |= *clean_text;
            config.handle_chinese_chars |= *handle_chinese_chars;
            config.lowercase |= *lowercase;
            config.strip_accents |= strip_accents.unwrap_or(*lowercase);
        }
        NormalizerRecord::Sequence { normalizers } => {
            for normalizer in normalizers {
                apply_normalizer(config, space_markers, normalizer)?;
            }
        }
        NormalizerRecord::NFC => config.form = NormalizationForm::NFC,
        NormalizerRecord::NFD => config.form = NormalizationForm::NFD,
        NormalizerRecord::NFKC => config.form = NormalizationForm::NFKC,
        NormalizerRecord::NFKD => config.form = NormalizationForm::NFKD,
        NormalizerRecord::Lowercase => config.lowercase = true,
        NormalizerRecord::StripAccents => config.strip_accents = true,
        NormalizerRecord::Strip { .. } => {}
        NormalizerRecord::Prepend { prepend } => match single_char(prepend) {
            Some(marker) => space_markers.push(marker),
            None => {
                return Err(TokenizerError::parse(format!(
                    "unsupported Prepend normalizer {:?}",
                    prepend
                )))
            }
        },
        NormalizerRecord::Replace { pattern, content } => match (pattern, single_char(content)) {
            (ReplacePattern::String(from), Some(marker)) if from == " " => {
                space_markers.push(marker)
            }
            _ => {
                return Err(TokenizerError::parse(format!(
                    "unsupported Replace normalizer {:?} -> {:?}",
                    pattern, content
                )))
            }
        },
    }
    Ok(())
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Pick the detokenization convention: the `decoder` section, then a
/// metaspace pre-tokenizer, then the model's natural convention.
///
/// Without explicit configuration, BPE and Unigram models only get the
/// metaspace convention when their vocabulary actually carries the marker.
fn resolve_decoder(
    record: Option<&DecoderRecord>,
    pre_tokenizer: Option<&serde_json::Value>,
    space_markers: &[char],
    model: &Model,
) -> Result<Decoder> {
    if let Some(record) = record {
        if let Some(decoder) = decoder_from_record(record)? {
            return Ok(decoder);
        }
    }
    if let Some(replacement) = pre_tokenizer.and_then(metaspace_replacement) {
        return Ok(Decoder::Metaspace { replacement });
    }

    let decoder = match model {
        Model::WordPiece(m) => Decoder::WordPiece {
            prefix: m.continuing_subword_prefix().to_string(),
        },
        Model::Bpe(_) | Model::Unigram(_) => match space_markers.first() {
            Some(&replacement) => Decoder::Metaspace { replacement },
            None if has_word_marker(model.vocab(), DEFAULT_METASPACE_REPLACEMENT) => {
                Decoder::Metaspace {
                    replacement: DEFAULT_METASPACE_REPLACEMENT,
                }
            }
            None => Decoder::Whitespace,
        },
    };
    debug!(?decoder, "no decoder configured, using model default");
    Ok(decoder)
}

/// Whether any regular token starts with `marker`.
fn has_word_marker(vocab: &Vocabulary, marker: char) -> bool {
    vocab
        .tokens()
        .any(|token| !token.special && token.content.starts_with(marker))
}

fn check_space_markers(space_markers: &[char], decoder: &Decoder) -> Result<()> {
    match space_markers
        .iter()
        .find(|&&marker| decoder.word_prefix() != Some(marker))
    {
        Some(marker) => Err(TokenizerError::parse(format!(
            "normalizer replaces spaces with {:?}, which the decoder does not treat as a word boundary",
            marker
        ))),
        None => Ok(()),
    }
}

fn decoder_from_record(record: &DecoderRecord) -> Result<Option<Decoder>> {
    let decoder = match record {
        DecoderRecord::WordPiece { prefix } => Some(Decoder::WordPiece {
            prefix: prefix
                .clone()
                .unwrap_or_else(|| DEFAULT_CONTINUATION_PREFIX.to_string()),
        }),
        DecoderRecord::Metaspace { replacement } => Some(Decoder::Metaspace {
            replacement: replacement_char(replacement.as_deref())?,
        }),
        // Replace("▁", " ") is how SentencePiece BPE models spell Metaspace
        DecoderRecord::Replace { pattern, content } => match pattern {
            ReplacePattern::String(from) if content == " " => Some(Decoder::Metaspace {
                replacement: replacement_char(Some(from))?,
            }),
            _ => None,
        },
        DecoderRecord::Sequence { decoders } => {
            let mut found = None;
            for decoder in decoders {
                if let Some(decoder) = decoder_from_record(decoder)? {
                    found = Some(decoder);
                    break;
                }
            }
            found
        }
        DecoderRecord::ByteFallback {} | DecoderRecord::Fuse {} | DecoderRecord::Strip {} => None,
    };
    Ok(decoder)
}

fn replacement_char(replacement: Option<&str>) -> Result<char> {
    match replacement {
        None => Ok(DEFAULT_METASPACE_REPLACEMENT),
        Some(s) => single_char(s).ok_or_else(|| {
            TokenizerError::parse(format!("metaspace replacement {:?} is not one character", s))
        }),
    }
}

/// Replacement character of a `Metaspace` pre-tokenizer, also inside a `Sequence`.
fn metaspace_replacement(value: &serde_json::Value) -> Option<char> {
    match value.get("type")?.as_str()? {
        "Metaspace" => value
            .get("replacement")
            .and_then(|r| r.as_str())
            .map_or(Some(DEFAULT_METASPACE_REPLACEMENT), single_char),
        "Sequence" => value
            .get("pretokenizers")?
            .as_array()?
            .iter()
            .find_map(metaspace_replacement),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WORDPIECE: &str = r###"{
        "version": "1.0",
        "added_tokens": [
            {"id": 0, "content": "[PAD]", "special": true},
            {"id": 1, "content": "[UNK]", "special": true},
            {"id": 2, "content": "[CLS]", "special": true},
            {"id": 3, "content": "[SEP]", "special": true}
        ],
        "normalizer": {"type": "BertNormalizer", "lowercase": true},
        "pre_tokenizer": {"type": "BertPreTokenizer"},
        "post_processor": null,
        "decoder": {"type": "WordPiece", "prefix": "##", "cleanup": true},
        "model": {
            "type": "WordPiece",
            "unk_token": "[UNK]",
            "continuing_subword_prefix": "##",
            "max_input_chars_per_word": 100,
            "vocab": {"[PAD]": 0, "[UNK]": 1, "[CLS]": 2, "[SEP]": 3, "un": 4, "##fit": 5}
        }
    }"###;

    #[test]
    fn test_load_wordpiece() {
        let parts = TokenizerLoader::from_str(WORDPIECE).unwrap();
        assert_eq!(parts.model.kind(), ModelKind::WordPiece);
        assert_eq!(parts.vocab.len(), 6);

        let special = parts.vocab.special();
        assert_eq!(special.unk, 1);
        assert_eq!(special.pad, Some(0));
        assert_eq!(special.bos, Some(2));
        assert_eq!(special.eos, Some(3));
        assert_eq!(special.cls, Some(2));
        assert_eq!(special.sep, Some(3));

        assert!(parts.normalizer.lowercase && parts.normalizer.strip_accents);
        assert_eq!(
            parts.decoder,
            Decoder::WordPiece {
                prefix: "##".to_string()
            }
        );
    }

    #[test]
    fn test_load_bpe_with_template() {
        let json = r#"{
            "added_tokens": [
                {"id": 0, "content": "<unk>", "special": true},
                {"id": 1, "content": "<s>", "special": true},
                {"id": 2, "content": "</s>", "special": true}
            ],
            "post_processor": {
                "type": "TemplateProcessing",
                "single": [
                    {"SpecialToken": {"id": "<s>", "type_id": 0}},
                    {"Sequence": {"id": "A", "type_id": 0}}
                ]
            },
            "model": {
                "type": "BPE",
                "unk_token": "<unk>",
                "byte_fallback": false,
                "vocab": {"<unk>": 0, "<s>": 1, "</s>": 2, "l": 3, "o": 4, "w": 5, "lo": 6, "low": 7},
                "merges": ["l o", ["lo", "w"]]
            }
        }"#;
        let parts = TokenizerLoader::from_str(json).unwrap();

        let special = parts.vocab.special();
        assert_eq!(special.bos, Some(1));
        // the template has no end marker, so "</s>" is not bound
        assert_eq!(special.eos, None);
        // no decoder and no word marker in the vocabulary
        assert_eq!(parts.decoder, Decoder::Whitespace);
        match &parts.model {
            Model::Bpe(bpe) => assert_eq!(bpe.merges().len(), 2),
            other => panic!("unexpected model: {:?}", other.kind()),
        }
    }

    #[test]
    fn test_load_unigram() {
        let json = r#"{
            "model": {
                "type": "Unigram",
                "unk_id": 0,
                "vocab": [["<unk>", 0.0], ["<s>", 0.0], ["</s>", 0.0], ["▁un", -1.0], ["fit", -0.5]]
            },
            "added_tokens": [
                {"id": 0, "content": "<unk>", "special": true},
                {"id": 1, "content": "<s>", "special": true},
                {"id": 2, "content": "</s>", "special": true}
            ],
            "normalizer": {"type": "Sequence", "normalizers": [{"type": "NFKC"}]},
            "decoder": {"type": "Metaspace", "replacement": "▁", "prepend_scheme": "always"}
        }"#;
        let parts = TokenizerLoader::from_str(json).unwrap();

        assert_eq!(parts.model.kind(), ModelKind::Unigram);
        assert_eq!(parts.vocab.score_of(4), Some(-0.5));
        assert_eq!(parts.vocab.special().bos, Some(1));
        assert_eq!(parts.vocab.special().eos, Some(2));
        assert_eq!(parts.normalizer.form, NormalizationForm::NFKC);
    }

    #[test]
    fn test_sentencepiece_style_decoder_sequence() {
        let json = r#"{
            "normalizer": {"type": "Sequence", "normalizers": [
                {"type": "Prepend", "prepend": "▁"},
                {"type": "Replace", "pattern": {"String": " "}, "content": "▁"}
            ]},
            "decoder": {"type": "Sequence", "decoders": [
                {"type": "Replace", "pattern": {"String": "▁"}, "content": " "},
                {"type": "ByteFallback"},
                {"type": "Fuse"},
                {"type": "Strip", "content": " ", "start": 1, "stop": 0}
            ]},
            "model": {"type": "BPE", "unk_token": "<unk>", "byte_fallback": true,
                      "vocab": {"<unk>": 0, "▁": 1}, "merges": []}
        }"#;
        let parts = TokenizerLoader::from_str(json).unwrap();
        assert_eq!(
            parts.decoder,
            Decoder::Metaspace {
                replacement: '\u{2581}'
            }
        );
    }

    #[test]
    fn test_default_decoder_follows_vocabulary() {
        let marked = r#"{"model": {"type": "BPE", "unk_token": "<unk>",
            "vocab": {"<unk>": 0, "▁": 1, "a": 2, "▁a": 3}, "merges": ["▁ a"]}}"#;
        assert_eq!(
            TokenizerLoader::from_str(marked).unwrap().decoder,
            Decoder::Metaspace {
                replacement: DEFAULT_METASPACE_REPLACEMENT
            }
        );

        // a special token carrying the marker does not count
        let special_only = r#"{"model": {"type": "Unigram", "unk_id": 0,
            "vocab": [["<unk>", 0.0], ["▁<pad>", 0.0], ["a", -1.0]]},
            "added_tokens": [{"id": 1, "content": "▁<pad>", "special": true}]}"#;
        assert_eq!(
            TokenizerLoader::from_str(special_only).unwrap().decoder,
            Decoder::Whitespace
        );

        // the normalizer's space replacement names the marker
        let replaced = r#"{"normalizer": {"type": "Replace", "pattern": {"String": " "}, "content": "_"},
            "model": {"type": "BPE", "unk_token": "<unk>",
            "vocab": {"<unk>": 0, "_a": 1}, "merges": []}}"#;
        assert_eq!(
            TokenizerLoader::from_str(replaced).unwrap().decoder,
            Decoder::Metaspace { replacement: '_' }
        );
    }

    #[test]
    fn test_space_replacement_must_match_decoder() {
        let wordpiece = r#"{"normalizer": {"type": "Replace", "pattern": {"String": " "}, "content": "▁"},
            "model": {"type": "WordPiece", "unk_token": "[UNK]", "vocab": {"[UNK]": 0, "▁a": 1}}}"#;
        assert!(TokenizerLoader::from_str(wordpiece)
            .unwrap_err()
            .is_parse_error());

        let mismatched = r#"{"normalizer": {"type": "Sequence", "normalizers": [
                {"type": "Prepend", "prepend": "_"}
            ]},
            "decoder": {"type": "Metaspace", "replacement": "▁"},
            "model": {"type": "BPE", "unk_token": "<unk>", "vocab": {"<unk>": 0}, "merges": []}}"#;
        assert!(TokenizerLoader::from_str(mismatched)
            .unwrap_err()
            .is_parse_error());
    }

    #[test]
    fn test_load_errors() {
        let unsupported = r#"{"model": {"type": "WordLevel", "vocab": {}, "unk_token": "x"}}"#;
        assert!(matches!(
            TokenizerLoader::from_str(unsupported),
            Err(TokenizerError::UnsupportedModel(name)) if name == "WordLevel"
        ));

        let no_vocab = r#"{"model": {"type": "WordPiece", "unk_token": "[UNK]"}}"#;
        assert!(TokenizerLoader::from_str(no_vocab)
            .unwrap_err()
            .is_parse_error());

        let no_unk = r#"{"model": {"type": "BPE", "vocab": {"a": 0}, "merges": []}}"#;
        assert!(TokenizerLoader::from_str(no_unk).unwrap_err().is_parse_error());

        let bad_merge = r#"{"model": {"type": "BPE", "unk_token": "<unk>",
            "vocab": {"<unk>": 0, "a": 1}, "merges": ["a b"]}}"#;
        assert!(TokenizerLoader::from_str(bad_merge)
            .unwrap_err()
            .is_parse_error());

        let duplicate_id = r#"{"model": {"type": "WordPiece", "unk_token": "[UNK]",
            "vocab": {"[UNK]": 0, "a": 0}}}"#;
        assert!(TokenizerLoader::from_str(duplicate_id)
            .unwrap_err()
            .is_parse_error());

        let conflicting_added = r#"{"model": {"type": "WordPiece", "unk_token": "[UNK]",
            "vocab": {"[UNK]": 0, "a": 1}},
            "added_tokens": [{"id": 1, "content": "[CLS]", "special": true}]}"#;
        assert!(TokenizerLoader::from_str(conflicting_added)
            .unwrap_err()
            .is_parse_error());

        let unknown_normalizer = r#"{"normalizer": {"type": "Precompiled"},
            "model": {"type": "WordPiece", "unk_token": "[UNK]", "vocab": {"[UNK]": 0}}}"#;
        assert!(TokenizerLoader::from_str(unknown_normalizer)
            .unwrap_err()
            .is_parse_error());

        assert!(matches!(
            TokenizerLoader::from_str("{not json"),
            Err(TokenizerError::Json(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = TokenizerLoader::load(Path::new("/nonexistent/tokenizer.json")).unwrap_err();
        assert!(matches!(err, TokenizerError::NotFound { .. }));
    }
}
