//! Skill table records: attack skills plus the venom passive whose metadata drives the
//! damage-over-time effect.

use serde::{Deserialize, Serialize};

/// `dmg_percent` value marking a skill whose damage does not scale with a percentage.
pub const FIXED_DAMAGE_SENTINEL: f64 = -1.0;

/// Skill id carrying the periodic-effect metadata.
pub const VENOM_SKILL_ID: &str = "venom";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DamagePercent {
    Formula { base: f64, per_level: f64 },
    /// Only [FIXED_DAMAGE_SENTINEL] is meaningful; anything else is rejected by validation.
    /// Tables may write the sentinel as `-1` or `-1.0`.
    Fixed(f64),
}

impl Default for DamagePercent {
    fn default() -> Self {
        Self::Fixed(FIXED_DAMAGE_SENTINEL)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub dmg_percent: DamagePercent,
    #[serde(default = "default_hits")]
    pub hits: u32,
    /// Milliseconds between casts.
    #[serde(default)]
    pub latency: u64,
    #[serde(default = "default_min_level")]
    pub min_level: u32,
    pub max_level: u32,
    pub default_level: u32,
    #[serde(default)]
    pub metadata: Option<VenomMetadata>,
}

fn default_hits() -> u32 {
    1
}

fn default_min_level() -> u32 {
    1
}

impl SkillRecord {
    pub fn is_attack(&self) -> bool {
        self.kind.eq_ignore_ascii_case("attack")
    }

    pub fn is_fixed_damage(&self) -> bool {
        matches!(self.dmg_percent, DamagePercent::Fixed(_))
    }

    pub fn level_in_range(&self, level: u32) -> bool {
        (self.min_level..=self.max_level).contains(&level)
    }

    /// Level used for calculation from possibly-missing user input: default when absent,
    /// clamped into `[min_level, max_level]` otherwise.
    pub fn clamp_level(&self, requested: Option<u32>) -> u32 {
        let level = match requested {
            Some(level) if level > 0 => level,
            _ => self.default_level,
        };
        level.clamp(self.min_level, self.max_level.max(self.min_level))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearCoeff {
    pub base: f64,
    pub per_level: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SuccessRateCoeff {
    pub base_percent: f64,
    pub per_ceil_step_percent: f64,
    pub ceil_divisor: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DurationCoeff {
    pub base: u64,
    pub per_ceil_step: u64,
    pub ceil_divisor: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DmgCoefficients {
    pub max_main_stat_coeff: f64,
    pub min_main_stat_coeff: f64,
    pub secondary_stat_coeff: f64,
}

/// Periodic-effect descriptor (the venom skill's `metadata` block).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VenomMetadata {
    pub basic_attack: LinearCoeff,
    pub success_rate: SuccessRateCoeff,
    pub duration_ms: DurationCoeff,
    pub max_stack: u32,
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    pub dmg_coefficients: DmgCoefficients,
}

fn default_tick_interval() -> u64 {
    1000
}
