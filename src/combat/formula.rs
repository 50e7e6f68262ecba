//! Damage formulas for skill hits and venom ticks, plus the level-scaled derivations
//! shown alongside them.
//!
//! Everything here is pure: randomness is drawn by the caller and passed in.

use crate::combat::params::{PeriodicParams, PlayerStats};
use crate::data::skill::{DamagePercent, SkillRecord, VenomMetadata};
use crate::error::{Result, SimError};

/// Share of target weapon defense subtracted from each attack roll.
pub const DEFENSE_FACTOR: f64 = 0.55;

/// Dagger main-stat multiplier used by the weapon-attack estimate.
pub const DAGGER_MAX_MULTIPLIER: f64 = 4.2;

/// `max(1, floor((atk - 0.55 * def) * multiplier))`.
#[inline]
pub fn skill_hit_damage(atk: u32, weapon_defense: f64, multiplier: f64) -> i64 {
    let raw = ((f64::from(atk) - DEFENSE_FACTOR * weapon_defense) * multiplier).floor();
    (raw as i64).max(1)
}

/// One shared roll scaled by the live stack count. Zero stacks deal nothing.
#[inline]
pub fn tick_damage(roll: f64, stacks: usize) -> i64 {
    if stacks == 0 {
        return 0;
    }
    ((roll * stacks as f64).floor() as i64).max(1)
}

/// Skill damage percentage at `level` (e.g. 400.0 for 400%).
///
/// Fixed-damage skills have no percentage; asking for one is a usage error.
pub fn calc_dmg_percent(skill: &SkillRecord, level: u32) -> Result<f64> {
    match skill.dmg_percent {
        DamagePercent::Formula { base, per_level } => Ok(base + per_level * f64::from(level)),
        DamagePercent::Fixed(_) => Err(SimError::FixedDamageSkill(skill.id.clone())),
    }
}

/// Convert a damage percentage into the fractional multiplier the hit formula takes.
pub fn percent_to_multiplier(percent: f64) -> f64 {
    percent / 100.0
}

/// Derive per-level venom parameters from the effect metadata and the player's stats.
pub fn calc_periodic_params(
    meta: &VenomMetadata,
    level: u32,
    stats: PlayerStats,
) -> Result<PeriodicParams> {
    if meta.success_rate.ceil_divisor == 0 {
        return Err(SimError::InvalidParameter {
            field: "success_rate.ceil_divisor",
            value: 0.0,
        });
    }
    if meta.duration_ms.ceil_divisor == 0 {
        return Err(SimError::InvalidParameter {
            field: "duration_ms.ceil_divisor",
            value: 0.0,
        });
    }

    let basic_attack = meta.basic_attack.base + meta.basic_attack.per_level * f64::from(level);
    let success_steps = level.div_ceil(meta.success_rate.ceil_divisor);
    let success_rate = (meta.success_rate.base_percent
        + meta.success_rate.per_ceil_step_percent * f64::from(success_steps))
        / 100.0;
    let duration_steps = level.div_ceil(meta.duration_ms.ceil_divisor);
    let duration_ms = meta
        .duration_ms
        .per_ceil_step
        .checked_mul(u64::from(duration_steps))
        .and_then(|extra| extra.checked_add(meta.duration_ms.base))
        .ok_or(SimError::InvalidParameter {
            field: "duration_ms",
            value: meta.duration_ms.per_ceil_step as f64,
        })?;

    let c = &meta.dmg_coefficients;
    let main = f64::from(stats.strength) + f64::from(stats.luk);
    let dex = f64::from(stats.dex);
    let dmg_max = (c.max_main_stat_coeff * main + dex * c.secondary_stat_coeff) / 100.0 * basic_attack;
    let dmg_min = (c.min_main_stat_coeff * main + dex * c.secondary_stat_coeff) / 100.0 * basic_attack;

    Ok(PeriodicParams {
        basic_attack,
        success_rate,
        duration_ms,
        max_stack: meta.max_stack as usize,
        tick_interval_ms: meta.tick_interval_ms,
        dmg_min,
        dmg_max,
    })
}

/// Rough weapon attack implied by the displayed max attack for a dagger user.
/// `None` when there is nothing to divide by.
pub fn weapon_attack_estimate(stats: PlayerStats, max_attack: u32) -> Option<u32> {
    let denom = f64::from(stats.luk) * DAGGER_MAX_MULTIPLIER
        + f64::from(stats.dex)
        + f64::from(stats.strength);
    if denom == 0.0 || max_attack == 0 {
        return None;
    }
    Some((f64::from(max_attack) * 100.0 / denom).round() as u32)
}
