//! Errors surfaced by the simulation core.
//!
//! Every variant except [`SimError::Cancelled`] and [`SimError::ThreadPool`] describes a
//! configuration problem and is raised before any trial runs.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid attack range: min {min} exceeds max {max}")]
    InvalidAttackRange { min: u32, max: u32 },

    #[error("target hit points must be positive")]
    NonPositiveHitPoints,

    #[error("trial count must be positive")]
    ZeroTrials,

    #[error("skill must hit at least once per cast")]
    ZeroHits,

    #[error("cast latency must be positive")]
    ZeroLatency,

    #[error("skill `{0}` deals fixed damage and has no percentage formula")]
    FixedDamageSkill(String),

    #[error("skill `{skill}` level {level} outside [{min}, {max}]")]
    SkillLevelOutOfRange {
        skill: String,
        level: u32,
        min: u32,
        max: u32,
    },

    #[error("invalid {field}: {value}")]
    InvalidParameter { field: &'static str, value: f64 },

    #[error("simulation cancelled")]
    Cancelled,

    #[error("failed to build worker pool")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl SimError {
    /// True for errors the caller can fix by changing its inputs.
    pub fn is_configuration(&self) -> bool {
        !matches!(self, Self::Cancelled | Self::ThreadPool(_))
    }
}
