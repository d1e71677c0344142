//! Collaborator contracts. Implementations live outside this workspace
//! (model runtimes, HTTP clients); tests use in-process doubles.

use crate::types::{PrunedText, RewriteRequest};
use anyhow::Result;
use std::sync::Arc;

/// Counts tokens the way the target model would.
pub trait TokenCounter: Send + Sync {
    /// Deterministic for a given text and model configuration.
    fn count(&self, text: &str) -> Result<usize>;
}

/// Extractive, importance-based pruning backend.
pub trait ImportancePruner: Send + Sync {
    /// Keep roughly `target_ratio` of the input's most important content.
    fn prune(&self, text: &str, target_ratio: f64) -> Result<PrunedText>;
}

/// Acquires a pruner. Called at most once per extractive stage.
pub trait PrunerLoader: Send + Sync {
    /// Load the pruner for `model`, a model id or local path.
    fn load(&self, model: &str) -> Result<Arc<dyn ImportancePruner>>;
}

impl<F> PrunerLoader for F
where
    F: Fn(&str) -> Result<Arc<dyn ImportancePruner>> + Send + Sync,
{
    fn load(&self, model: &str) -> Result<Arc<dyn ImportancePruner>> {
        self(model)
    }
}

/// Generative rewrite backend: single request, single response.
pub trait RewriteModel: Send + Sync {
    fn rewrite(&self, request: &RewriteRequest) -> Result<String>;
}

/// Semantic similarity between two texts, in [-1, 1].
pub trait SimilarityScorer: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> Result<f32>;
}

/// Text embedding backend.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Vec<f32>>;
}
