//! Whether a generative rewrite is worth paying for.
//!
//! A high residual ratio after extractive pruning means the pruner found
//! little to drop, which marks verbose text a rewrite can still shorten.

use pc_core::config::{check_unit_interval, DEFAULT_REDUNDANCY_FACTOR};
use pc_core::Result;
use tracing::debug;

/// after / before, or `None` when there was nothing to compress.
pub fn compression_ratio(tokens_before: usize, tokens_after_extractive: usize) -> Option<f64> {
    if tokens_before == 0 {
        return None;
    }
    Some(tokens_after_extractive as f64 / tokens_before as f64)
}

/// True when the residual ratio exceeds `redundancy_factor`.
pub fn should_use_generative_stage(
    tokens_before: usize,
    tokens_after_extractive: usize,
    redundancy_factor: f64,
) -> bool {
    let Some(ratio) = compression_ratio(tokens_before, tokens_after_extractive) else {
        return false;
    };
    debug!(ratio, redundancy_factor, "compression ratio");
    ratio > redundancy_factor
}

/// [`should_use_generative_stage`] with the default factor (0.85).
pub fn should_use_generative_stage_default(
    tokens_before: usize,
    tokens_after_extractive: usize,
) -> bool {
    should_use_generative_stage(tokens_before, tokens_after_extractive, DEFAULT_REDUNDANCY_FACTOR)
}

/// Reject factors outside (0, 1].
pub fn validate_redundancy_factor(redundancy_factor: f64) -> Result<f64> {
    check_unit_interval("redundancy_factor", redundancy_factor)
}
