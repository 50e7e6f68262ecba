//! Monte Carlo estimation of casts-to-kill: batch aggregation and the summary reported to
//! the CLI and HTTP layers.

pub mod monte_carlo;
pub mod summary;

pub use monte_carlo::{
    build_trial_params, run_simulation, run_trials, run_trials_cancellable,
    run_trials_sequential, Distribution, RunConfig,
};
pub use summary::{expected_casts, percentages, summarize, Summary, SummaryRow};
