//! Stage 2: Extractive pruning — importance-based span removal.
//!
//! The pruner is acquired on first use. If acquisition fails the stage stays
//! disabled and passes text through unchanged; a failed call only affects
//! that call.

use pc_core::config::{DEFAULT_PRUNER_MODEL, DEFAULT_TARGET_RATIO};
use pc_core::{CompressError, ImportancePruner, PrunerLoader, Result, StageKind};
use std::fmt;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

/// Resolved pruner state.
#[derive(Clone)]
pub enum PrunerHandle {
    Active(Arc<dyn ImportancePruner>),
    Disabled,
}

impl PrunerHandle {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active(_))
    }
}

impl fmt::Debug for PrunerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active(_) => write!(f, "Active"),
            Self::Disabled => write!(f, "Disabled"),
        }
    }
}

pub struct ExtractiveStage {
    loader: Option<Arc<dyn PrunerLoader>>,
    handle: OnceLock<PrunerHandle>,
    model: String,
    target_ratio: f64,
}

impl ExtractiveStage {
    /// Lazily load the pruner through `loader` on first use.
    pub fn new(loader: Arc<dyn PrunerLoader>) -> Self {
        Self {
            loader: Some(loader),
            handle: OnceLock::new(),
            model: DEFAULT_PRUNER_MODEL.into(),
            target_ratio: DEFAULT_TARGET_RATIO,
        }
    }

    /// Use an already constructed pruner.
    pub fn with_pruner(pruner: Arc<dyn ImportancePruner>) -> Self {
        Self {
            loader: None,
            handle: OnceLock::from(PrunerHandle::Active(pruner)),
            model: DEFAULT_PRUNER_MODEL.into(),
            target_ratio: DEFAULT_TARGET_RATIO,
        }
    }

    /// A stage that always passes text through.
    pub fn disabled() -> Self {
        Self {
            loader: None,
            handle: OnceLock::from(PrunerHandle::Disabled),
            model: DEFAULT_PRUNER_MODEL.into(),
            target_ratio: DEFAULT_TARGET_RATIO,
        }
    }

    /// Model the loader is asked for. Has no effect once the pruner is resolved.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_target_ratio(mut self, target_ratio: f64) -> Self {
        self.target_ratio = target_ratio;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn target_ratio(&self) -> f64 {
        self.target_ratio
    }

    /// Resolve the pruner, loading it if this is the first use.
    pub fn handle(&self) -> &PrunerHandle {
        self.handle.get_or_init(|| {
            let Some(loader) = &self.loader else {
                return PrunerHandle::Disabled;
            };
            match loader.load(&self.model) {
                Ok(pruner) => {
                    info!(
                        model = %self.model,
                        target_ratio = self.target_ratio,
                        "extractive pruner ready"
                    );
                    PrunerHandle::Active(pruner)
                }
                Err(e) => {
                    warn!(
                        model = %self.model,
                        error = %e,
                        "extractive pruner failed to load; stage disabled"
                    );
                    PrunerHandle::Disabled
                }
            }
        })
    }

    pub fn is_available(&self) -> bool {
        self.handle().is_active()
    }

    /// Prune `text`, surfacing unavailability and call failures.
    pub fn try_compress(&self, text: &str) -> Result<String> {
        match self.handle() {
            PrunerHandle::Disabled => Err(CompressError::unavailable(
                StageKind::Extractive,
                "pruner not loaded",
            )),
            PrunerHandle::Active(pruner) => pruner
                .prune(text, self.target_ratio)
                .map(|pruned| pruned.into_text())
                .map_err(|e| CompressError::call_failed(StageKind::Extractive, e)),
        }
    }

    /// Prune `text`; any failure yields the input unchanged.
    pub fn compress(&self, text: &str) -> String {
        match self.try_compress(text) {
            Ok(pruned) => pruned,
            Err(e @ CompressError::BackendCallFailed { .. }) => {
                warn!(error = %e, "extractive call failed; passing input through");
                text.to_string()
            }
            Err(e) => {
                debug!(error = %e, "extractive stage disabled; passing input through");
                text.to_string()
            }
        }
    }
}

impl fmt::Debug for ExtractiveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractiveStage")
            .field("handle", &self.handle.get())
            .field("model", &self.model)
            .field("target_ratio", &self.target_ratio)
            .finish()
    }
}
