use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::combat::{
    calc_dmg_percent, percent_to_multiplier, simulate_once_with, ExpiringStacks, NoTrace,
    PeriodicParams, Rng, TrialOutcome, TrialParams,
};
use crate::data::{MonsterRecord, SkillRecord};
use crate::error::{Result, SimError};
use crate::parallel::{plan_batches, TrialBatch, WorkerPool};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunConfig {
    pub trials: usize,
    pub seed: u64,
    pub pool: WorkerPool,
}

impl RunConfig {
    pub fn new(trials: usize, seed: u64) -> Self {
        Self {
            trials,
            seed,
            pool: WorkerPool::default(),
        }
    }

    pub fn with_pool(self, pool: WorkerPool) -> Self {
        Self { pool, ..self }
    }
}

/// Cast count -> number of trials that needed exactly that many casts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Distribution {
    pub counts: BTreeMap<u32, u64>,
    /// Trials recorded, always the sum of `counts`.
    pub trials: u64,
    /// Trials that hit the event budget without a kill. They are still counted under their
    /// cast count in `counts`.
    pub unfinished: u64,
}

impl Distribution {
    pub fn record(&mut self, outcome: TrialOutcome) {
        *self.counts.entry(outcome.casts).or_insert(0) += 1;
        self.trials += 1;
        if !outcome.killed {
            self.unfinished += 1;
        }
    }

    /// Adds another partial histogram into self.
    pub fn merge_from(&mut self, other: &Distribution) {
        for (&casts, &count) in &other.counts {
            *self.counts.entry(casts).or_insert(0) += count;
        }
        self.trials += other.trials;
        self.unfinished += other.unfinished;
    }

    pub fn min_casts(&self) -> Option<u32> {
        self.counts.keys().next().copied()
    }

    pub fn max_casts(&self) -> Option<u32> {
        self.counts.keys().next_back().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.trials == 0
    }
}

/// Turn data-table selections into validated trial parameters.
pub fn build_trial_params(
    player_min: u32,
    player_max: u32,
    monster: &MonsterRecord,
    skill: &SkillRecord,
    skill_level: u32,
    periodic: Option<PeriodicParams>,
) -> Result<TrialParams> {
    if !skill.level_in_range(skill_level) {
        return Err(SimError::SkillLevelOutOfRange {
            skill: skill.id.clone(),
            level: skill_level,
            min: skill.min_level,
            max: skill.max_level,
        });
    }
    let percent = calc_dmg_percent(skill, skill_level)?;
    TrialParams::new(
        player_min,
        player_max,
        monster.hp,
        monster.weapon_def,
        percent_to_multiplier(percent),
        skill.hits,
        skill.latency,
        periodic,
    )
}

/// Estimate the cast-count distribution for one monster/skill selection.
pub fn run_simulation(
    player_min: u32,
    player_max: u32,
    monster: &MonsterRecord,
    skill: &SkillRecord,
    skill_level: u32,
    periodic: Option<PeriodicParams>,
    config: &RunConfig,
) -> Result<Distribution> {
    let params = build_trial_params(player_min, player_max, monster, skill, skill_level, periodic)?;
    info!(
        monster = %monster.id,
        skill = %skill.id,
        skill_level,
        venom = periodic.is_some(),
        "simulating"
    );
    run_trials(&params, config)
}

/// Run `config.trials` trials across the worker pool.
pub fn run_trials(params: &TrialParams, config: &RunConfig) -> Result<Distribution> {
    run_trials_inner(params, config, None, true)
}

/// Single-threaded variant. Produces the same distribution as [run_trials] for a given seed.
pub fn run_trials_sequential(params: &TrialParams, config: &RunConfig) -> Result<Distribution> {
    run_trials_inner(params, config, None, false)
}

/// Like [run_trials] but checks `cancel` between trials and stops with
/// [SimError::Cancelled] once it is set.
pub fn run_trials_cancellable(
    params: &TrialParams,
    config: &RunConfig,
    cancel: &AtomicBool,
) -> Result<Distribution> {
    run_trials_inner(params, config, Some(cancel), true)
}

fn run_trials_inner(
    params: &TrialParams,
    config: &RunConfig,
    cancel: Option<&AtomicBool>,
    parallel: bool,
) -> Result<Distribution> {
    if config.trials == 0 {
        return Err(SimError::ZeroTrials);
    }
    params.validate()?;

    let started = Instant::now();
    let seed = config.seed;
    let distribution = if parallel {
        config.pool.install(|| {
            plan_batches(config.trials, rayon::current_num_threads())
                .par_iter()
                .map(|&batch| run_batch(params, seed, batch, cancel))
                .try_reduce(Distribution::default, |mut left, right| {
                    left.merge_from(&right);
                    Ok(left)
                })
        })??
    } else {
        let whole = TrialBatch {
            start: 0,
            end: config.trials,
        };
        run_batch(params, seed, whole, cancel)?
    };

    let elapsed_ms = started.elapsed().as_millis() as u64;
    info!(
        trials = distribution.trials,
        distinct = distribution.counts.len(),
        workers = if parallel { config.pool.effective_workers() } else { 1 },
        elapsed_ms,
        "run complete"
    );
    if distribution.unfinished > 0 {
        warn!(
            unfinished = distribution.unfinished,
            "trials exhausted the event budget; inputs deal too little damage"
        );
    }
    Ok(distribution)
}

fn run_batch(
    params: &TrialParams,
    seed: u64,
    batch: TrialBatch,
    cancel: Option<&AtomicBool>,
) -> Result<Distribution> {
    let mut partial = Distribution::default();
    let mut stacks = ExpiringStacks::new(params.max_stack());

    for index in batch.indices() {
        if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
            debug!(start = batch.start, end = batch.end, index, "batch cancelled");
            return Err(SimError::Cancelled);
        }
        let mut rng = Rng::for_trial(seed, index as u64);
        let outcome = simulate_once_with(params, &mut rng, &mut stacks, &mut NoTrace);
        partial.record(outcome);
    }

    debug!(start = batch.start, end = batch.end, "batch done");
    Ok(partial)
}
