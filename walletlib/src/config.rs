use serde::{Deserialize, Serialize};

pub const DEFAULT_PROGRESS_CHUNK_SIZE: usize = 100_000;

/// Tuning knobs for the aggregation engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AggregateConfig {
    /// Size of the dedicated rayon pool; `None` runs on the global pool.
    #[serde(default)]
    pub threads: Option<usize>,
    /// Payments per chunk for `sum_payments_with_progress`.
    #[serde(default = "default_progress_chunk_size")]
    pub progress_chunk_size: usize,
}

fn default_progress_chunk_size() -> usize {
    DEFAULT_PROGRESS_CHUNK_SIZE
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            threads: None,
            progress_chunk_size: DEFAULT_PROGRESS_CHUNK_SIZE,
        }
    }
}
