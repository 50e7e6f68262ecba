pub mod engine;
pub mod formula;
pub mod params;
pub mod rng;
pub mod stacking;

pub use engine::{
    simulate_once, simulate_once_with, simulate_traced, NoTrace, TimelineEvent, TimelineObserver,
    TraceCollector, TrialOutcome, MAX_EVENTS,
};
pub use formula::{
    calc_dmg_percent, calc_periodic_params, percent_to_multiplier, skill_hit_damage, tick_damage,
    weapon_attack_estimate, DAGGER_MAX_MULTIPLIER, DEFENSE_FACTOR,
};
pub use params::{PeriodicParams, PlayerStats, TrialParams};
pub use rng::Rng;
pub use stacking::ExpiringStacks;
