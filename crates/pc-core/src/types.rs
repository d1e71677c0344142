use serde::{Deserialize, Serialize};
use std::fmt;

/// Pipeline stage (or collaborator) a value or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageKind {
    Rule,
    Extractive,
    Generative,
    TokenCounter,
    Similarity,
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rule => write!(f, "rule"),
            Self::Extractive => write!(f, "extractive"),
            Self::Generative => write!(f, "generative"),
            Self::TokenCounter => write!(f, "token counter"),
            Self::Similarity => write!(f, "similarity"),
        }
    }
}

/// Response of an importance pruner.
///
/// Backends either hand back the retained text directly or a structured
/// payload carrying it next to their own accounting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrunedText {
    Structured {
        #[serde(alias = "compressed_prompt")]
        retained_text: String,
        #[serde(default)]
        origin_tokens: Option<usize>,
        #[serde(default, alias = "compressed_tokens")]
        retained_tokens: Option<usize>,
    },
    PlainText(String),
}

impl PrunedText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self::PlainText(text.into())
    }

    pub fn structured(retained_text: impl Into<String>) -> Self {
        Self::Structured {
            retained_text: retained_text.into(),
            origin_tokens: None,
            retained_tokens: None,
        }
    }

    pub fn retained_text(&self) -> &str {
        match self {
            Self::PlainText(text) => text,
            Self::Structured { retained_text, .. } => retained_text,
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Self::PlainText(text) => text,
            Self::Structured { retained_text, .. } => retained_text,
        }
    }
}

impl From<String> for PrunedText {
    fn from(text: String) -> Self {
        Self::PlainText(text)
    }
}

/// A single rewrite call: directive plus the content it applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewriteRequest {
    pub system: String,
    pub content: String,
}

impl RewriteRequest {
    /// Flatten into the single-prompt form most completion APIs accept.
    pub fn to_prompt(&self) -> String {
        format!(
            "{}\n\n--- TEXT CONTENT START ---\n{}\n--- TEXT CONTENT END ---",
            self.system, self.content
        )
    }
}
