//! Shared types for the prompt compactor: errors, configuration, collaborator
//! contracts and the compression result record.

pub mod config;
pub mod error;
pub mod result;
pub mod similarity;
pub mod tokens;
pub mod traits;
pub mod types;

pub use config::{GenerativeMode, NormalizationConfig, PipelineConfig, PipelinePreset, UnicodeMode};
pub use error::{CompressError, Result};
pub use result::{CompressionResult, StageOutputs, TokenCounts};
pub use tokens::HeuristicTokenCounter;
pub use traits::{
    Embedder, ImportancePruner, PrunerLoader, RewriteModel, SimilarityScorer, TokenCounter,
};
pub use types::{PrunedText, RewriteRequest, StageKind};

#[cfg(test)]
mod tests;
