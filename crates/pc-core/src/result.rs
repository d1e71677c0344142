//! Write-once record of a single pipeline run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use uuid::Uuid;

/// Token counts taken at each stage boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenCounts {
    pub before: usize,
    pub after_rule: usize,
    pub after_extractive: usize,
    pub after_final: usize,
}

/// Text as it left each stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageOutputs {
    pub original: String,
    pub rule: String,
    pub extractive: String,
    pub final_output: String,
}

/// Percentage of tokens saved, rounded to 2 decimals. 0.0 for empty input.
pub fn savings_pct(tokens_before: usize, tokens_final: usize) -> f64 {
    if tokens_before == 0 {
        return 0.0;
    }
    let saved = tokens_before as f64 - tokens_final as f64;
    round2(saved / tokens_before as f64 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Snapshot of one compression run. Owns copies of every intermediate text
/// and is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressionResult {
    run_id: Uuid,
    timestamp: DateTime<Utc>,
    original_prompt: String,
    rule_output: String,
    extractive_output: String,
    final_output: String,
    tokens: TokenCounts,
    generative_used: bool,
    savings_pct: f64,
    similarity: Option<f32>,
    metadata: Option<HashMap<String, Value>>,
}

impl CompressionResult {
    pub fn new(
        outputs: StageOutputs,
        tokens: TokenCounts,
        generative_used: bool,
        similarity: Option<f32>,
        metadata: Option<HashMap<String, Value>>,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            original_prompt: outputs.original,
            rule_output: outputs.rule,
            extractive_output: outputs.extractive,
            final_output: outputs.final_output,
            savings_pct: savings_pct(tokens.before, tokens.after_final),
            tokens,
            generative_used,
            similarity,
            metadata: metadata.filter(|m| !m.is_empty()),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn original_prompt(&self) -> &str {
        &self.original_prompt
    }

    pub fn rule_output(&self) -> &str {
        &self.rule_output
    }

    pub fn extractive_output(&self) -> &str {
        &self.extractive_output
    }

    pub fn final_output(&self) -> &str {
        &self.final_output
    }

    pub fn tokens(&self) -> TokenCounts {
        self.tokens
    }

    pub fn tokens_before(&self) -> usize {
        self.tokens.before
    }

    pub fn tokens_after_rule(&self) -> usize {
        self.tokens.after_rule
    }

    pub fn tokens_after_extractive(&self) -> usize {
        self.tokens.after_extractive
    }

    pub fn tokens_after_final(&self) -> usize {
        self.tokens.after_final
    }

    pub fn generative_used(&self) -> bool {
        self.generative_used
    }

    pub fn savings_pct(&self) -> f64 {
        self.savings_pct
    }

    pub fn similarity(&self) -> Option<f32> {
        self.similarity
    }

    pub fn metadata(&self) -> Option<&HashMap<String, Value>> {
        self.metadata.as_ref()
    }

    /// final / before; 1.0 when there was nothing to compress.
    pub fn ratio(&self) -> f64 {
        if self.tokens.before == 0 {
            return 1.0;
        }
        self.tokens.after_final as f64 / self.tokens.before as f64
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Single-line JSON, for appending to a regression log.
    pub fn to_json_line(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
