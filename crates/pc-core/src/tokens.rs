//! Built-in token counters.

use crate::traits::TokenCounter;

/// Character-based estimate (~4 chars per token for English text).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicTokenCounter {
    chars_per_token: f32,
}

impl HeuristicTokenCounter {
    pub fn new() -> Self {
        Self { chars_per_token: 4.0 }
    }

    pub fn with_chars_per_token(chars_per_token: f32) -> Self {
        let chars_per_token = if chars_per_token.is_finite() && chars_per_token > 0.0 {
            chars_per_token
        } else {
            4.0
        };
        Self { chars_per_token }
    }

    pub fn estimate(&self, text: &str) -> usize {
        let chars = text.chars().count();
        (chars as f32 / self.chars_per_token).ceil() as usize
    }
}

impl Default for HeuristicTokenCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCounter for HeuristicTokenCounter {
    fn count(&self, text: &str) -> anyhow::Result<usize> {
        Ok(self.estimate(text))
    }
}

#[cfg(feature = "tiktoken")]
pub use bpe::BpeTokenCounter;

#[cfg(feature = "tiktoken")]
mod bpe {
    use crate::traits::TokenCounter;
    use anyhow::{anyhow, Context};
    use tiktoken_rs::{cl100k_base, get_bpe_from_model, o200k_base, CoreBPE};
    use tracing::debug;

    /// Exact BPE counts for OpenAI-family encodings.
    pub struct BpeTokenCounter {
        bpe: CoreBPE,
    }

    impl BpeTokenCounter {
        /// Accepts a model name ("gpt-4o") or an encoding name ("cl100k_base").
        pub fn new(model_or_encoding: &str) -> anyhow::Result<Self> {
            let lower = model_or_encoding.to_ascii_lowercase();
            let bpe = match get_bpe_from_model(&lower) {
                Ok(b) => b,
                Err(_) => {
                    debug!(encoding = %lower, "not a known model name, trying encoding");
                    match lower.as_str() {
                        "o200k_base" => o200k_base().context("load o200k_base")?,
                        "cl100k_base" => cl100k_base().context("load cl100k_base")?,
                        _ => return Err(anyhow!("Unsupported model/encoding: {model_or_encoding}")),
                    }
                }
            };
            Ok(Self { bpe })
        }
    }

    impl TokenCounter for BpeTokenCounter {
        fn count(&self, text: &str) -> anyhow::Result<usize> {
            Ok(self.bpe.encode_ordinary(text).len())
        }
    }
}
