//! Progress reporting for batches (current index / total).

/// Emitted before each item of a batch starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    /// 1-based position of the item about to be fetched.
    pub index: usize,
    pub total: usize,
    pub url: String,
}

impl BatchProgress {
    /// Fraction of items finished before this one, in [0.0, 1.0].
    pub fn fraction_done(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.index.saturating_sub(1) as f64 / self.total as f64).min(1.0)
    }
}
