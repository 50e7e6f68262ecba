//! Rayon thread pool configuration for simulation workloads.
//!
//! Use [WorkerPool::install] to run a batch with a fixed number of threads, or rely on
//! Rayon's default (all CPU cores).

use rayon::{ThreadPoolBuildError, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};

/// Configures how many worker threads are used for parallel batch execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerPool {
    /// Number of worker threads. If 0, use Rayon default (num_cpus).
    pub workers: usize,
}

impl WorkerPool {
    /// Use all available CPU cores (Rayon default).
    pub fn default_workers() -> Self {
        Self::default()
    }

    /// Use exactly `n` worker threads.
    pub fn with_workers(n: usize) -> Self {
        Self { workers: n }
    }

    /// Run a closure with this worker count. If [workers](WorkerPool::workers) is 0, uses the
    /// global Rayon pool. Otherwise builds a temporary pool with that many threads.
    pub fn install<F, R>(&self, f: F) -> Result<R, ThreadPoolBuildError>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        if self.workers == 0 {
            Ok(f())
        } else {
            let pool = ThreadPoolBuilder::new().num_threads(self.workers).build()?;
            Ok(pool.install(f))
        }
    }

    /// Thread count the pool will actually use.
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            rayon::current_num_threads()
        } else {
            self.workers
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_pool_runs_with_requested_threads() {
        let pool = WorkerPool::with_workers(2);
        let threads = pool
            .install(rayon::current_num_threads)
            .expect("pool should build");
        assert_eq!(threads, 2);
        assert_eq!(pool.effective_workers(), 2);
    }

    #[test]
    fn default_pool_uses_global() {
        let value = WorkerPool::default_workers()
            .install(|| 41 + 1)
            .expect("global pool");
        assert_eq!(value, 42);
    }
}
