//! Prompt Compactor — staged prompt compression engine.
//!
//! Stages:
//! 1. Rule-based cleanup (unicode, elongation, punctuation, whitespace)
//! 2. Extractive pruning — importance-based span removal
//! 3. Generative rewrite — only when pruning left the prompt verbose

pub mod decision;
pub mod normalize;
pub mod pipeline;
pub mod stage1_rule;
pub mod stage2_extractive;
pub mod stage3_generative;

pub use decision::should_use_generative_stage;
pub use normalize::{normalize, normalize_preset};
pub use pipeline::{CompactorPipeline, PipelineBuilder, PipelineState};
pub use stage1_rule::RuleStage;
pub use stage2_extractive::{ExtractiveStage, PrunerHandle};
pub use stage3_generative::GenerativeStage;
