//! Compression pipeline — orchestrates the three stages.

use crate::decision::{
    compression_ratio, should_use_generative_stage, validate_redundancy_factor,
};
use crate::stage1_rule::RuleStage;
use crate::stage2_extractive::ExtractiveStage;
use crate::stage3_generative::GenerativeStage;
use pc_core::{
    CompressError, CompressionResult, GenerativeMode, ImportancePruner, PipelineConfig,
    PrunerLoader, Result, RewriteModel, SimilarityScorer, StageKind, StageOutputs, TokenCounter,
    TokenCounts,
};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where a single run is. Transitions only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Init,
    RuleDone,
    ExtractiveDone,
    GenerativeDone,
    Skipped,
    Finalized,
}

impl PipelineState {
    pub fn can_advance_to(self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Init, RuleDone)
                | (RuleDone, ExtractiveDone)
                | (ExtractiveDone, GenerativeDone)
                | (ExtractiveDone, Skipped)
                | (GenerativeDone, Finalized)
                | (Skipped, Finalized)
        )
    }
}

struct RunState(PipelineState);

impl RunState {
    fn advance(&mut self, next: PipelineState) {
        debug_assert!(self.0.can_advance_to(next), "illegal transition {:?} -> {:?}", self.0, next);
        debug!(from = ?self.0, to = ?next, "pipeline transition");
        self.0 = next;
    }
}

/// The main compactor pipeline.
pub struct CompactorPipeline {
    config: PipelineConfig,
    counter: Arc<dyn TokenCounter>,
    rule: RuleStage,
    extractive: ExtractiveStage,
    generative: GenerativeStage,
    similarity: Option<Arc<dyn SimilarityScorer>>,
}

impl CompactorPipeline {
    pub fn builder(counter: Arc<dyn TokenCounter>) -> PipelineBuilder {
        PipelineBuilder::new(counter)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn extractive(&self) -> &ExtractiveStage {
        &self.extractive
    }

    pub fn generative(&self) -> &GenerativeStage {
        &self.generative
    }

    /// Compress with the configured redundancy factor.
    pub fn compress(&self, prompt: &str) -> Result<CompressionResult> {
        self.run(prompt, self.config.redundancy_factor, HashMap::new())
    }

    /// Compress with a per-call redundancy factor.
    pub fn compress_with_factor(
        &self,
        prompt: &str,
        redundancy_factor: f64,
    ) -> Result<CompressionResult> {
        self.run(prompt, redundancy_factor, HashMap::new())
    }

    /// Compress and attach caller metadata to the record.
    pub fn compress_with_metadata(
        &self,
        prompt: &str,
        metadata: HashMap<String, Value>,
    ) -> Result<CompressionResult> {
        self.run(prompt, self.config.redundancy_factor, metadata)
    }

    /// Apply the generative mode and, in `Auto`, the decision policy.
    pub fn should_rewrite(
        &self,
        tokens_before: usize,
        tokens_after_extractive: usize,
        redundancy_factor: f64,
    ) -> bool {
        match self.config.generative_mode {
            GenerativeMode::Always => true,
            GenerativeMode::Never => false,
            GenerativeMode::Auto => should_use_generative_stage(
                tokens_before,
                tokens_after_extractive,
                redundancy_factor,
            ),
        }
    }

    fn count(&self, text: &str) -> Result<usize> {
        self.counter
            .count(text)
            .map_err(|e| CompressError::call_failed(StageKind::TokenCounter, e))
    }

    fn run(
        &self,
        prompt: &str,
        redundancy_factor: f64,
        mut metadata: HashMap<String, Value>,
    ) -> Result<CompressionResult> {
        let redundancy_factor = validate_redundancy_factor(redundancy_factor)?;
        let mut state = RunState(PipelineState::Init);
        let tokens_before = self.count(prompt)?;

        let rule_output = self.rule.compress(prompt);
        state.advance(PipelineState::RuleDone);
        let after_rule = self.count(&rule_output)?;

        let extractive_output = self.extractive.compress(&rule_output);
        state.advance(PipelineState::ExtractiveDone);
        let after_extractive = self.count(&extractive_output)?;

        let generative_used =
            self.should_rewrite(tokens_before, after_extractive, redundancy_factor);
        let (final_output, after_final) = if generative_used {
            let rewritten = self.generative.compress(&extractive_output)?;
            state.advance(PipelineState::GenerativeDone);
            let tokens = self.count(&rewritten)?;
            (rewritten, tokens)
        } else {
            state.advance(PipelineState::Skipped);
            (extractive_output.clone(), after_extractive)
        };
        state.advance(PipelineState::Finalized);

        let similarity = self.score(prompt, &final_output);

        metadata.insert(
            "generative_mode".into(),
            Value::from(self.config.generative_mode.to_string()),
        );
        metadata.insert("redundancy_factor".into(), Value::from(redundancy_factor));
        metadata.insert(
            "compression_ratio".into(),
            compression_ratio(tokens_before, after_extractive).map_or(Value::Null, Value::from),
        );
        metadata.insert(
            "extractive_available".into(),
            Value::from(self.extractive.handle().is_active()),
        );

        let result = CompressionResult::new(
            StageOutputs {
                original: prompt.to_string(),
                rule: rule_output,
                extractive: extractive_output,
                final_output,
            },
            TokenCounts {
                before: tokens_before,
                after_rule,
                after_extractive,
                after_final,
            },
            generative_used,
            similarity,
            Some(metadata),
        );

        info!(
            tokens_before,
            after_rule,
            after_extractive,
            after_final,
            generative_used,
            savings_pct = result.savings_pct(),
            "prompt compressed"
        );
        Ok(result)
    }

    fn score(&self, original: &str, compressed: &str) -> Option<f32> {
        if !self.config.score_similarity {
            return None;
        }
        let scorer = self.similarity.as_ref()?;
        match scorer.similarity(original, compressed) {
            Ok(score) => Some(score),
            Err(e) => {
                warn!(error = %e, "similarity scoring failed");
                None
            }
        }
    }
}

impl fmt::Debug for CompactorPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompactorPipeline")
            .field("config", &self.config)
            .field("rule", &self.rule)
            .field("extractive", &self.extractive)
            .field("generative", &self.generative)
            .field("similarity", &self.similarity.is_some())
            .finish()
    }
}

enum PrunerSource {
    None,
    Loader(Arc<dyn PrunerLoader>),
    Ready(Arc<dyn ImportancePruner>),
}

/// Wires collaborators into a [`CompactorPipeline`].
pub struct PipelineBuilder {
    config: PipelineConfig,
    counter: Arc<dyn TokenCounter>,
    pruner: PrunerSource,
    rewrite: Option<Arc<dyn RewriteModel>>,
    similarity: Option<Arc<dyn SimilarityScorer>>,
}

impl PipelineBuilder {
    pub fn new(counter: Arc<dyn TokenCounter>) -> Self {
        Self {
            config: PipelineConfig::default(),
            counter,
            pruner: PrunerSource::None,
            rewrite: None,
            similarity: None,
        }
    }

    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Load the pruner lazily on the first run.
    pub fn pruner_loader(mut self, loader: Arc<dyn PrunerLoader>) -> Self {
        self.pruner = PrunerSource::Loader(loader);
        self
    }

    pub fn pruner(mut self, pruner: Arc<dyn ImportancePruner>) -> Self {
        self.pruner = PrunerSource::Ready(pruner);
        self
    }

    pub fn rewrite_model(mut self, model: Arc<dyn RewriteModel>) -> Self {
        self.rewrite = Some(model);
        self
    }

    pub fn similarity(mut self, scorer: Arc<dyn SimilarityScorer>) -> Self {
        self.similarity = Some(scorer);
        self
    }

    pub fn build(self) -> Result<CompactorPipeline> {
        self.config.validate()?;
        let config = self.config;
        let rule = RuleStage::new().with_filler_stripping(config.strip_filler_phrases);

        let extractive = match self.pruner {
            PrunerSource::None => ExtractiveStage::disabled(),
            PrunerSource::Loader(loader) => ExtractiveStage::new(loader),
            PrunerSource::Ready(pruner) => ExtractiveStage::with_pruner(pruner),
        }
        .with_model(config.pruner_model.clone())
        .with_target_ratio(config.target_ratio);

        // The generative stage sees rule-stage output, so the separator must be
        // in the same canonical form to be found there.
        let separator = rule.canonicalize(&config.instruction_separator);
        if separator.is_empty() {
            return Err(CompressError::invalid(format!(
                "instruction_separator {:?} is empty after normalization",
                config.instruction_separator
            )));
        }
        if separator != config.instruction_separator {
            debug!(
                configured = %config.instruction_separator,
                canonical = %separator,
                "instruction separator rewritten to canonical form"
            );
        }

        let generative = match self.rewrite {
            Some(model) => GenerativeStage::new(model),
            None => GenerativeStage::unavailable(),
        }
        .with_separator(separator);

        debug!(
            pruner_model = %config.pruner_model,
            generative_mode = %config.generative_mode,
            redundancy_factor = config.redundancy_factor,
            target_ratio = config.target_ratio,
            rewrite_available = generative.is_available(),
            "pipeline built"
        );

        Ok(CompactorPipeline {
            counter: self.counter,
            rule,
            extractive,
            generative,
            similarity: self.similarity,
            config,
        })
    }
}
