//! Splitting a run into trial batches.
//!
//! Each batch is a contiguous range of trial indices simulated by one Rayon task into its own
//! partial histogram. Trial `i` always draws from the same RNG stream, so the split never
//! changes the result.

use std::ops::Range;

/// Batches planned per worker thread so threads that finish early can steal more work.
pub const BATCHES_PER_WORKER: usize = 4;

/// Trial indices `[start, end)` handled by one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrialBatch {
    pub start: usize,
    pub end: usize,
}

impl TrialBatch {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn indices(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Plan batches covering `0..trials` for `workers` threads. Sizes differ by at most one,
/// larger batches first. No batch is ever empty.
///
/// # Example
/// ```
/// # use nshot::parallel::plan_batches;
/// let batches = plan_batches(10, 1);
/// let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
/// assert_eq!(sizes, vec![3, 3, 2, 2]);
/// ```
pub fn plan_batches(trials: usize, workers: usize) -> Vec<TrialBatch> {
    let count = workers
        .max(1)
        .saturating_mul(BATCHES_PER_WORKER)
        .min(trials);
    if count == 0 {
        return Vec::new();
    }
    let (base, extra) = (trials / count, trials % count);
    (0..count)
        .scan(0, |start, i| {
            let batch = TrialBatch {
                start: *start,
                end: *start + base + usize::from(i < extra),
            };
            *start = batch.end;
            Some(batch)
        })
        .collect()
}
