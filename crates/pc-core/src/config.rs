use crate::error::{CompressError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_REDUNDANCY_FACTOR: f64 = 0.85;
pub const DEFAULT_TARGET_RATIO: f64 = 0.5;
pub const DEFAULT_PRUNER_MODEL: &str = "TinyLlama/TinyLlama-1.1B-Chat-v1.0";
pub const DEFAULT_INSTRUCTION_SEPARATOR: &str = "Now, here is the text to summarize:";

/// Unicode normalization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnicodeMode {
    /// NFC: composes accents, keeps compatibility variants distinct.
    #[default]
    Canonical,
    /// NFKC: additionally folds full-width forms, ligatures and the like.
    Compatibility,
}

impl fmt::Display for UnicodeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Canonical => write!(f, "NFC"),
            Self::Compatibility => write!(f, "NFKC"),
        }
    }
}

impl FromStr for UnicodeMode {
    type Err = CompressError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "nfc" | "canonical" => Ok(Self::Canonical),
            "nfkc" | "compatibility" => Ok(Self::Compatibility),
            other => Err(CompressError::invalid(format!("unknown normalization mode: {other}"))),
        }
    }
}

/// Which normalization passes run, and in which unicode form.
///
/// Every flag is independent; the order the passes run in is fixed by the
/// normalizer and cannot be changed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub unicode_mode: UnicodeMode,
    pub remove_zero_width: bool,
    pub strip_combining_marks: bool,
    pub collapse_elongation: bool,
    pub collapse_repeated_emoji: bool,
    pub normalize_punctuation: bool,
    pub collapse_whitespace: bool,
    pub alias_urls: bool,
    pub alias_emails: bool,
    pub alias_numbers: bool,
    pub lowercase: bool,
}

impl NormalizationConfig {
    pub fn with_unicode_mode(mut self, mode: UnicodeMode) -> Self {
        self.unicode_mode = mode;
        self
    }

    pub fn with_aliasing(mut self, enabled: bool) -> Self {
        self.alias_urls = enabled;
        self.alias_emails = enabled;
        self.alias_numbers = enabled;
        self
    }

    pub fn with_lowercase(mut self, enabled: bool) -> Self {
        self.lowercase = enabled;
        self
    }

    pub fn with_zero_width_removal(mut self, enabled: bool) -> Self {
        self.remove_zero_width = enabled;
        self
    }

    pub fn with_combining_mark_stripping(mut self, enabled: bool) -> Self {
        self.strip_combining_marks = enabled;
        self
    }

    pub fn any_aliasing(&self) -> bool {
        self.alias_urls || self.alias_emails || self.alias_numbers
    }
}

/// Named normalization bundles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelinePreset {
    /// Aggressive cleanup for model ingestion.
    Llm,
    /// Moderate cleanup for human-readable text.
    Light,
    /// Canonical unicode only.
    Storage,
    /// `Llm` without aliasing or lowercasing; nothing but canonicalisation.
    RuleStage,
}

impl PipelinePreset {
    pub fn config(self) -> NormalizationConfig {
        match self {
            Self::Llm => NormalizationConfig {
                unicode_mode: UnicodeMode::Compatibility,
                remove_zero_width: true,
                strip_combining_marks: true,
                collapse_elongation: true,
                collapse_repeated_emoji: true,
                normalize_punctuation: true,
                collapse_whitespace: true,
                alias_urls: true,
                alias_emails: true,
                alias_numbers: true,
                lowercase: false,
            },
            Self::Light => NormalizationConfig {
                unicode_mode: UnicodeMode::Canonical,
                collapse_elongation: true,
                collapse_whitespace: true,
                ..NormalizationConfig::default()
            },
            Self::Storage => NormalizationConfig {
                unicode_mode: UnicodeMode::Canonical,
                ..NormalizationConfig::default()
            },
            Self::RuleStage => Self::Llm.config().with_aliasing(false).with_lowercase(false),
        }
    }
}

impl From<PipelinePreset> for NormalizationConfig {
    fn from(preset: PipelinePreset) -> Self {
        preset.config()
    }
}

/// Whether the generative stage may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerativeMode {
    /// Let the decision policy decide from measured token counts.
    #[default]
    Auto,
    Always,
    Never,
}

impl fmt::Display for GenerativeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Always => write!(f, "always"),
            Self::Never => write!(f, "never"),
        }
    }
}

/// Orchestrator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Residual ratio above which the generative rewrite is attempted.
    pub redundancy_factor: f64,
    /// Fraction of the input the extractive pruner is asked to retain.
    pub target_ratio: f64,
    /// Handed to the [`PrunerLoader`](crate::PrunerLoader) on first use.
    pub pruner_model: String,
    pub instruction_separator: String,
    pub generative_mode: GenerativeMode,
    pub strip_filler_phrases: bool,
    pub score_similarity: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            redundancy_factor: DEFAULT_REDUNDANCY_FACTOR,
            target_ratio: DEFAULT_TARGET_RATIO,
            pruner_model: DEFAULT_PRUNER_MODEL.into(),
            instruction_separator: DEFAULT_INSTRUCTION_SEPARATOR.into(),
            generative_mode: GenerativeMode::Auto,
            strip_filler_phrases: false,
            score_similarity: true,
        }
    }
}

impl PipelineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_unit_interval("redundancy_factor", self.redundancy_factor)?;
        check_unit_interval("target_ratio", self.target_ratio)?;
        if self.pruner_model.trim().is_empty() {
            return Err(CompressError::invalid("pruner_model must not be empty"));
        }
        if self.instruction_separator.is_empty() {
            return Err(CompressError::invalid("instruction_separator must not be empty"));
        }
        Ok(())
    }
}

/// Accept values in (0, 1].
pub fn check_unit_interval(name: &str, value: f64) -> Result<f64> {
    if value.is_nan() || value <= 0.0 || value > 1.0 {
        return Err(CompressError::invalid(format!("{name} must be in (0, 1], got {value}")));
    }
    Ok(value)
}
