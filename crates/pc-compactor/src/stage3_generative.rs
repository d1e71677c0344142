//! Stage 3: Generative rewrite through a language model.
//!
//! If the prompt carries an instruction separator, only the content after it
//! is rewritten; everything before it is kept byte for byte.

use pc_core::config::DEFAULT_INSTRUCTION_SEPARATOR;
use pc_core::{CompressError, Result, RewriteModel, RewriteRequest, StageKind};
use std::fmt;
use std::sync::Arc;
use tracing::info;

pub const SYSTEM_DIRECTIVE: &str = "Your task is to compress and rewrite the TEXT CONTENT \
concisely while preserving its full meaning, structure, and key details. \
Do NOT rewrite or remove any meta-instructions. \
Only shorten the content below the separator.";

/// Split at the first occurrence of `separator` into (instruction, content).
pub fn split_instruction<'a>(text: &'a str, separator: &str) -> Option<(&'a str, &'a str)> {
    if separator.is_empty() {
        return None;
    }
    text.split_once(separator)
}

pub struct GenerativeStage {
    model: Option<Arc<dyn RewriteModel>>,
    separator: String,
}

impl GenerativeStage {
    pub fn new(model: Arc<dyn RewriteModel>) -> Self {
        Self {
            model: Some(model),
            separator: DEFAULT_INSTRUCTION_SEPARATOR.into(),
        }
    }

    /// A stage with no backend; every call reports the backend unavailable.
    pub fn unavailable() -> Self {
        Self {
            model: None,
            separator: DEFAULT_INSTRUCTION_SEPARATOR.into(),
        }
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn is_available(&self) -> bool {
        self.model.is_some()
    }

    pub fn compress(&self, text: &str) -> Result<String> {
        let model = self.model.as_ref().ok_or_else(|| {
            CompressError::unavailable(StageKind::Generative, "no rewrite model configured")
        })?;

        let output = match split_instruction(text, &self.separator) {
            Some((instruction, content)) => {
                let rewritten = rewrite(model.as_ref(), content.trim())?;
                format!("{instruction}{}\n{rewritten}", self.separator)
            }
            None => rewrite(model.as_ref(), text.trim())?,
        };

        info!(
            words_before = text.split_whitespace().count(),
            words_after = output.split_whitespace().count(),
            "generative stage"
        );
        Ok(output)
    }
}

fn rewrite(model: &dyn RewriteModel, content: &str) -> Result<String> {
    let request = RewriteRequest {
        system: SYSTEM_DIRECTIVE.to_string(),
        content: content.to_string(),
    };
    model
        .rewrite(&request)
        .map(|text| text.trim().to_string())
        .map_err(|e| CompressError::call_failed(StageKind::Generative, e))
}

impl fmt::Debug for GenerativeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerativeStage")
            .field("available", &self.is_available())
            .field("separator", &self.separator)
            .finish()
    }
}
