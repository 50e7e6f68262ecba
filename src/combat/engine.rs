//! Single-trial timeline: skill casts every `latency_ms` starting at t = 0, venom ticks every
//! `tick_interval_ms` starting at one interval. Events resolve in time order, casts first on ties.
//! Timestamps saturate at `u64::MAX`; the event budget still ends the trial.

use serde::Serialize;

use crate::combat::formula::{skill_hit_damage, tick_damage};
use crate::combat::params::TrialParams;
use crate::combat::rng::Rng;
use crate::combat::stacking::ExpiringStacks;

/// Hard cap on processed events per trial. Degenerate inputs stop here instead of spinning.
pub const MAX_EVENTS: u32 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TrialOutcome {
    /// Skill casts executed before hit points reached zero (or the budget ran out).
    pub casts: u32,
    /// False when [MAX_EVENTS] was exhausted with the target still alive.
    pub killed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimelineEvent {
    Cast {
        time_ms: u64,
        cast: u32,
        hits_landed: u32,
        damage: i64,
        procs: u32,
        stacks: usize,
        hp_after: i64,
    },
    Tick {
        time_ms: u64,
        stacks: usize,
        damage: i64,
        hp_after: i64,
    },
}

/// Receives every resolved event of a trial. The batch path uses [NoTrace].
pub trait TimelineObserver {
    fn record(&mut self, event: TimelineEvent);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoTrace;

impl TimelineObserver for NoTrace {
    #[inline(always)]
    fn record(&mut self, _event: TimelineEvent) {}
}

#[derive(Debug, Default, Clone)]
pub struct TraceCollector {
    pub events: Vec<TimelineEvent>,
}

impl TimelineObserver for TraceCollector {
    fn record(&mut self, event: TimelineEvent) {
        self.events.push(event);
    }
}

/// Run one trial with a fresh stack collection. `params` must already be validated.
pub fn simulate_once(params: &TrialParams, rng: &mut Rng) -> TrialOutcome {
    let mut stacks = ExpiringStacks::new(params.max_stack());
    simulate_once_with(params, rng, &mut stacks, &mut NoTrace)
}

/// Run one trial and return every resolved event alongside the outcome.
pub fn simulate_traced(params: &TrialParams, rng: &mut Rng) -> (TrialOutcome, Vec<TimelineEvent>) {
    let mut stacks = ExpiringStacks::new(params.max_stack());
    let mut trace = TraceCollector::default();
    let outcome = simulate_once_with(params, rng, &mut stacks, &mut trace);
    (outcome, trace.events)
}

/// Trial loop over a caller-owned stack buffer, reset on entry so it can be reused.
pub fn simulate_once_with<O: TimelineObserver>(
    params: &TrialParams,
    rng: &mut Rng,
    stacks: &mut ExpiringStacks,
    observer: &mut O,
) -> TrialOutcome {
    debug_assert!(params.validate().is_ok(), "trial params must be validated");
    stacks.reset(params.max_stack());

    let periodic = params.periodic.as_ref();
    let mut hp = i64::try_from(params.hit_points).unwrap_or(i64::MAX);
    let mut casts = 0u32;
    let mut next_cast = 0u64;
    let mut next_tick = periodic.map_or(u64::MAX, |venom| venom.tick_interval_ms);
    let mut events = 0u32;

    while hp > 0 && events < MAX_EVENTS {
        events += 1;

        match periodic {
            Some(venom) if next_tick < next_cast => {
                let now = next_tick;
                stacks.prune(now);
                let live = stacks.count();
                let damage = if live > 0 {
                    let roll = rng.next_f64() * (venom.dmg_max - venom.dmg_min) + venom.dmg_min;
                    tick_damage(roll, live)
                } else {
                    0
                };
                hp -= damage;
                observer.record(TimelineEvent::Tick {
                    time_ms: now,
                    stacks: live,
                    damage,
                    hp_after: hp,
                });
                next_tick = next_tick.saturating_add(venom.tick_interval_ms);
            }
            _ => {
                let now = next_cast;
                casts += 1;
                let mut hits_landed = 0u32;
                let mut cast_damage = 0i64;
                let mut procs = 0u32;

                for _ in 0..params.hits {
                    let atk = rng.range_inclusive(params.player_min, params.player_max);
                    let damage = skill_hit_damage(atk, params.weapon_defense, params.multiplier);
                    hp -= damage;
                    hits_landed += 1;
                    cast_damage += damage;

                    // the killing hit still rolls for a proc
                    if let Some(venom) = periodic {
                        stacks.prune(now);
                        if rng.chance(venom.success_rate) {
                            stacks.push(now.saturating_add(venom.duration_ms));
                            procs += 1;
                        }
                    }
                    if hp <= 0 {
                        break;
                    }
                }

                observer.record(TimelineEvent::Cast {
                    time_ms: now,
                    cast: casts,
                    hits_landed,
                    damage: cast_damage,
                    procs,
                    stacks: stacks.count(),
                    hp_after: hp,
                });
                next_cast = next_cast.saturating_add(params.latency_ms);
            }
        }
    }

    TrialOutcome {
        casts,
        killed: hp <= 0,
    }
}
