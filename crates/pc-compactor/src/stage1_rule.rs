//! Stage 1: Rule-based cleanup — meaning-preserving canonicalisation.

use crate::normalize;
use pc_core::{NormalizationConfig, PipelinePreset};
use regex::Regex;
use std::sync::LazyLock;
use tracing::info;

/// Word counts around the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WordStats {
    pub words_before: usize,
    pub words_after: usize,
}

/// Filler phrase → replacement. Opt-in; rewrites wording, not meaning.
pub fn default_filler_rewrites() -> Vec<(&'static str, &'static str)> {
    vec![
        ("I would like you to", ""),
        ("could you", ""),
        ("would you", ""),
        ("please", ""),
        ("kindly", ""),
        ("make sure to", "ensure"),
        ("ensure that", "ensure"),
        ("provide me with", "provide"),
    ]
}

static FILLER_PAIRS: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    default_filler_rewrites()
        .into_iter()
        .map(|(phrase, replacement)| {
            let pattern = format!(r"(?i)\b{}\b", regex::escape(phrase));
            (Regex::new(&pattern).unwrap(), replacement)
        })
        .collect()
});

/// Drop politeness fillers and shorten stock phrasings.
pub fn strip_filler_phrases(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let mut result = text.to_string();
    for (re, replacement) in FILLER_PAIRS.iter() {
        result = re.replace_all(&result, *replacement).into_owned();
    }
    normalize::collapse_whitespace(&result)
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Rule-based stage.
#[derive(Debug, Clone)]
pub struct RuleStage {
    config: NormalizationConfig,
    strip_fillers: bool,
}

impl RuleStage {
    pub fn new() -> Self {
        Self {
            config: PipelinePreset::RuleStage.config(),
            strip_fillers: false,
        }
    }

    pub fn with_filler_stripping(mut self, enabled: bool) -> Self {
        self.strip_fillers = enabled;
        self
    }

    pub fn config(&self) -> &NormalizationConfig {
        &self.config
    }

    pub fn compress(&self, text: &str) -> String {
        self.compress_with_stats(text).0
    }

    /// The stage's rewrite without the metric record.
    pub fn canonicalize(&self, text: &str) -> String {
        let result = normalize::normalize(text, &self.config);
        if self.strip_fillers {
            strip_filler_phrases(&result)
        } else {
            result
        }
    }

    pub fn compress_with_stats(&self, text: &str) -> (String, WordStats) {
        let words_before = word_count(text);
        let result = self.canonicalize(text);
        let stats = WordStats { words_before, words_after: word_count(&result) };
        info!(words_before = stats.words_before, words_after = stats.words_after, "rule stage");
        (result, stats)
    }
}

impl Default for RuleStage {
    fn default() -> Self {
        Self::new()
    }
}
