use crate::*;
use crate::config::{check_unit_interval, DEFAULT_PRUNER_MODEL};
use crate::result::savings_pct;
use crate::similarity::{self, EmbeddingSimilarity};
use std::collections::HashMap;

// ========== Config ==========

#[test]
fn test_unicode_mode_parse() {
    assert_eq!("NFC".parse::<UnicodeMode>().unwrap(), UnicodeMode::Canonical);
    assert_eq!("canonical".parse::<UnicodeMode>().unwrap(), UnicodeMode::Canonical);
    assert_eq!(" nfkc ".parse::<UnicodeMode>().unwrap(), UnicodeMode::Compatibility);
    assert_eq!("Compatibility".parse::<UnicodeMode>().unwrap(), UnicodeMode::Compatibility);
}

#[test]
fn test_unicode_mode_unknown() {
    let err = "NFD".parse::<UnicodeMode>().unwrap_err();
    assert!(matches!(err, CompressError::InvalidConfiguration(_)));
}

#[test]
fn test_preset_llm() {
    let c = PipelinePreset::Llm.config();
    assert_eq!(c.unicode_mode, UnicodeMode::Compatibility);
    assert!(c.remove_zero_width && c.strip_combining_marks && c.collapse_elongation);
    assert!(c.collapse_repeated_emoji && c.normalize_punctuation && c.collapse_whitespace);
    assert!(c.alias_urls && c.alias_emails && c.alias_numbers);
    assert!(!c.lowercase);
}

#[test]
fn test_preset_light() {
    let c = PipelinePreset::Light.config();
    assert_eq!(c.unicode_mode, UnicodeMode::Canonical);
    assert!(c.collapse_elongation && c.collapse_whitespace);
    assert!(!c.remove_zero_width && !c.normalize_punctuation && !c.any_aliasing());
}

#[test]
fn test_preset_storage() {
    let c = PipelinePreset::Storage.config();
    assert_eq!(c, NormalizationConfig::default().with_unicode_mode(UnicodeMode::Canonical));
}

#[test]
fn test_preset_rule_stage() {
    let c = PipelinePreset::RuleStage.config();
    assert!(!c.any_aliasing());
    assert!(!c.lowercase);
    assert_eq!(c.with_aliasing(true), PipelinePreset::Llm.config());
}

#[test]
fn test_normalization_config_json() {
    let json = r#"{"unicode_mode":"compatibility","lowercase":true}"#;
    let c: NormalizationConfig = serde_json::from_str(json).unwrap();
    assert_eq!(c.unicode_mode, UnicodeMode::Compatibility);
    assert!(c.lowercase);
    assert!(!c.collapse_whitespace);
}

#[test]
fn test_pipeline_config_default() {
    let c = PipelineConfig::default();
    assert_eq!(c.redundancy_factor, 0.85);
    assert_eq!(c.target_ratio, 0.5);
    assert_eq!(c.generative_mode, GenerativeMode::Auto);
    assert!(c.validate().is_ok());
}

#[test]
fn test_pipeline_config_from_json() {
    let json = r#"{"redundancy_factor":0.7,"generative_mode":"never"}"#;
    let c = PipelineConfig::from_json(json).unwrap();
    assert_eq!(c.redundancy_factor, 0.7);
    assert_eq!(c.generative_mode, GenerativeMode::Never);
    assert_eq!(c.target_ratio, 0.5);
}

#[test]
fn test_pipeline_config_rejects_out_of_range() {
    let err = PipelineConfig::from_json(r#"{"redundancy_factor":1.5}"#).unwrap_err();
    assert!(matches!(err, CompressError::InvalidConfiguration(_)));
    let err = PipelineConfig::from_json(r#"{"target_ratio":0.0}"#).unwrap_err();
    assert!(matches!(err, CompressError::InvalidConfiguration(_)));
}

#[test]
fn test_pipeline_config_pruner_model() {
    let c = PipelineConfig::from_json(r#"{"pruner_model":"microsoft/phi-2"}"#).unwrap();
    assert_eq!(c.pruner_model, "microsoft/phi-2");
    assert_eq!(PipelineConfig::default().pruner_model, DEFAULT_PRUNER_MODEL);
    let err = PipelineConfig::from_json(r#"{"pruner_model":"  "}"#).unwrap_err();
    assert!(matches!(err, CompressError::InvalidConfiguration(_)));
}

#[test]
fn test_pipeline_config_bad_json() {
    let err = PipelineConfig::from_json("{not json").unwrap_err();
    assert!(matches!(err, CompressError::Serialization(_)));
}

#[test]
fn test_unit_interval() {
    assert!(check_unit_interval("x", 1.0).is_ok());
    assert!(check_unit_interval("x", 0.01).is_ok());
    assert!(check_unit_interval("x", 0.0).is_err());
    assert!(check_unit_interval("x", f64::NAN).is_err());
}

// ========== Errors ==========

#[test]
fn test_error_display() {
    let e = CompressError::unavailable(StageKind::Generative, "no client");
    assert_eq!(e.to_string(), "generative backend unavailable: no client");
    assert_eq!(e.stage(), Some(StageKind::Generative));
}

#[test]
fn test_error_call_failed_source() {
    use std::error::Error;
    let e = CompressError::call_failed(StageKind::Extractive, anyhow::anyhow!("timeout"));
    assert!(e.to_string().contains("timeout"));
    assert!(e.source().is_some());
}

// ========== PrunedText ==========

#[test]
fn test_pruned_text_plain() {
    assert_eq!(PrunedText::plain("kept").into_text(), "kept");
}

#[test]
fn test_pruned_text_structured_json() {
    let json = r#"{"compressed_prompt":"kept","origin_tokens":10}"#;
    let p: PrunedText = serde_json::from_str(json).unwrap();
    assert_eq!(p.retained_text(), "kept");
    assert!(matches!(p, PrunedText::Structured { origin_tokens: Some(10), .. }));
}

#[test]
fn test_pruned_text_string_json() {
    let p: PrunedText = serde_json::from_str(r#""kept""#).unwrap();
    assert_eq!(p, PrunedText::plain("kept"));
}

// ========== Tokens ==========

#[test]
fn test_heuristic_counter() {
    let c = HeuristicTokenCounter::new();
    assert_eq!(c.count("").unwrap(), 0);
    assert_eq!(c.count("abcd").unwrap(), 1);
    assert_eq!(c.count("abcde").unwrap(), 2);
}

#[test]
fn test_heuristic_counter_counts_chars_not_bytes() {
    let c = HeuristicTokenCounter::new();
    assert_eq!(c.count("\u{00e9}\u{00e9}\u{00e9}\u{00e9}").unwrap(), 1);
}

#[test]
fn test_heuristic_counter_bad_ratio_falls_back() {
    let c = HeuristicTokenCounter::with_chars_per_token(0.0);
    assert_eq!(c, HeuristicTokenCounter::new());
}

// ========== Similarity ==========

#[test]
fn test_cosine_identical() {
    let a = vec![1.0, 2.0, 3.0];
    assert!((similarity::cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
}

#[test]
fn test_cosine_orthogonal() {
    assert!(similarity::cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
}

#[test]
fn test_cosine_zero_vector() {
    assert_eq!(similarity::cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
}

#[test]
fn test_normalize_vector() {
    let mut v = vec![3.0, 4.0];
    similarity::normalize_vector(&mut v);
    assert!((v[0] - 0.6).abs() < 1e-6);
    assert!((v[1] - 0.8).abs() < 1e-6);
}

struct LetterEmbedder;

impl Embedder for LetterEmbedder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut v = vec![0.0; 26];
        for c in text.chars().filter(|c| c.is_ascii_alphabetic()) {
            v[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        Ok(v)
    }
}

#[test]
fn test_embedding_similarity_same_text() {
    let s = EmbeddingSimilarity::new(LetterEmbedder);
    let score = s.similarity("hello world", "hello world").unwrap();
    assert!((score - 1.0).abs() < 1e-5);
}

#[test]
fn test_embedding_similarity_disjoint() {
    let s = EmbeddingSimilarity::new(LetterEmbedder);
    assert!(s.similarity("aaa", "zzz").unwrap().abs() < 1e-6);
}

struct RaggedEmbedder;

impl Embedder for RaggedEmbedder {
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(vec![1.0; text.len()])
    }
}

#[test]
fn test_embedding_similarity_dimension_mismatch() {
    let s = EmbeddingSimilarity::new(RaggedEmbedder);
    assert!(s.similarity("ab", "abc").is_err());
}

// ========== Result ==========

fn sample_result(before: usize, after: usize) -> CompressionResult {
    CompressionResult::new(
        StageOutputs {
            original: "original".into(),
            rule: "rule".into(),
            extractive: "extractive".into(),
            final_output: "final".into(),
        },
        TokenCounts { before, after_rule: before, after_extractive: after, after_final: after },
        false,
        Some(0.9),
        None,
    )
}

#[test]
fn test_savings_pct() {
    assert_eq!(savings_pct(200, 120), 40.0);
    assert_eq!(savings_pct(3, 2), 33.33);
    assert_eq!(savings_pct(100, 100), 0.0);
    assert_eq!(savings_pct(0, 0), 0.0);
}

#[test]
fn test_savings_pct_negative_when_output_grows() {
    assert_eq!(savings_pct(100, 110), -10.0);
}

#[test]
fn test_result_fields() {
    let r = sample_result(200, 120);
    assert_eq!(r.original_prompt(), "original");
    assert_eq!(r.rule_output(), "rule");
    assert_eq!(r.extractive_output(), "extractive");
    assert_eq!(r.final_output(), "final");
    assert_eq!(r.tokens_before(), 200);
    assert_eq!(r.tokens_after_final(), 120);
    assert_eq!(r.savings_pct(), 40.0);
    assert!((r.ratio() - 0.6).abs() < 1e-9);
    assert_eq!(r.similarity(), Some(0.9));
}

#[test]
fn test_result_empty_metadata_dropped() {
    let r = CompressionResult::new(
        StageOutputs::default(),
        TokenCounts::default(),
        false,
        None,
        Some(HashMap::new()),
    );
    assert!(r.metadata().is_none());
    assert_eq!(r.ratio(), 1.0);
}

#[test]
fn test_result_json_roundtrip() {
    let r = sample_result(10, 5);
    let line = r.to_json_line().unwrap();
    assert!(!line.contains('\n'));
    let back = CompressionResult::from_json(&line).unwrap();
    assert_eq!(back, r);
}

#[test]
fn test_result_run_ids_unique() {
    assert_ne!(sample_result(1, 1).run_id(), sample_result(1, 1).run_id());
}
