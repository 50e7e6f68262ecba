pub mod batch;
pub mod pool;

pub use batch::{plan_batches, TrialBatch, BATCHES_PER_WORKER};
pub use pool::WorkerPool;
