//! Immutable per-run inputs to the trial simulator.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Player primary stats. `int` is carried for completeness; no formula reads it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStats {
    #[serde(default, rename = "str")]
    pub strength: u32,
    #[serde(default)]
    pub dex: u32,
    #[serde(default)]
    pub int: u32,
    #[serde(default)]
    pub luk: u32,
}

/// Derived damage-over-time parameters for one effect level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PeriodicParams {
    pub basic_attack: f64,
    /// Proc probability per hit, 0..=1.
    pub success_rate: f64,
    pub duration_ms: u64,
    pub max_stack: usize,
    pub tick_interval_ms: u64,
    /// Per-stack per-tick damage bounds.
    pub dmg_min: f64,
    pub dmg_max: f64,
}

impl PeriodicParams {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.success_rate) {
            return Err(SimError::InvalidParameter {
                field: "success_rate",
                value: self.success_rate,
            });
        }
        if self.max_stack == 0 {
            return Err(SimError::InvalidParameter {
                field: "max_stack",
                value: 0.0,
            });
        }
        if self.tick_interval_ms == 0 {
            return Err(SimError::InvalidParameter {
                field: "tick_interval_ms",
                value: 0.0,
            });
        }
        for (field, value) in [("dmg_min", self.dmg_min), ("dmg_max", self.dmg_max)] {
            if !value.is_finite() || value < 0.0 {
                return Err(SimError::InvalidParameter { field, value });
            }
        }
        if self.dmg_min > self.dmg_max {
            return Err(SimError::InvalidParameter {
                field: "dmg_min",
                value: self.dmg_min,
            });
        }
        Ok(())
    }
}

/// Everything one trial needs. Construct with [TrialParams::new] (validated) or build the
/// struct directly and call [TrialParams::validate] before simulating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrialParams {
    pub player_min: u32,
    pub player_max: u32,
    pub hit_points: u64,
    pub weapon_defense: f64,
    /// Fractional skill multiplier, e.g. 4.0 for 400%.
    pub multiplier: f64,
    pub hits: u32,
    pub latency_ms: u64,
    pub periodic: Option<PeriodicParams>,
}

impl TrialParams {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        player_min: u32,
        player_max: u32,
        hit_points: u64,
        weapon_defense: f64,
        multiplier: f64,
        hits: u32,
        latency_ms: u64,
        periodic: Option<PeriodicParams>,
    ) -> Result<Self> {
        let params = Self {
            player_min,
            player_max,
            hit_points,
            weapon_defense,
            multiplier,
            hits,
            latency_ms,
            periodic,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> Result<()> {
        if self.player_min > self.player_max {
            return Err(SimError::InvalidAttackRange {
                min: self.player_min,
                max: self.player_max,
            });
        }
        if self.hit_points == 0 {
            return Err(SimError::NonPositiveHitPoints);
        }
        if !self.weapon_defense.is_finite() || self.weapon_defense < 0.0 {
            return Err(SimError::InvalidParameter {
                field: "weapon_defense",
                value: self.weapon_defense,
            });
        }
        if !self.multiplier.is_finite() || self.multiplier < 0.0 {
            return Err(SimError::InvalidParameter {
                field: "multiplier",
                value: self.multiplier,
            });
        }
        if self.hits == 0 {
            return Err(SimError::ZeroHits);
        }
        if self.latency_ms == 0 {
            return Err(SimError::ZeroLatency);
        }
        if let Some(periodic) = &self.periodic {
            periodic.validate()?;
        }
        Ok(())
    }

    pub fn max_stack(&self) -> usize {
        self.periodic.map_or(0, |p| p.max_stack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn venom() -> PeriodicParams {
        PeriodicParams {
            basic_attack: 80.0,
            success_rate: 0.5,
            duration_ms: 6000,
            max_stack: 3,
            tick_interval_ms: 1000,
            dmg_min: 100.0,
            dmg_max: 200.0,
        }
    }

    #[test]
    fn rejects_inverted_attack_range() {
        let err = TrialParams::new(10, 5, 100, 0.0, 1.0, 1, 500, None).unwrap_err();
        assert!(matches!(err, SimError::InvalidAttackRange { min: 10, max: 5 }));
    }

    #[test]
    fn rejects_zero_hp_hits_and_latency() {
        assert!(matches!(
            TrialParams::new(1, 2, 0, 0.0, 1.0, 1, 500, None),
            Err(SimError::NonPositiveHitPoints)
        ));
        assert!(matches!(
            TrialParams::new(1, 2, 10, 0.0, 1.0, 0, 500, None),
            Err(SimError::ZeroHits)
        ));
        assert!(matches!(
            TrialParams::new(1, 2, 10, 0.0, 1.0, 1, 0, None),
            Err(SimError::ZeroLatency)
        ));
    }

    #[test]
    fn rejects_bad_periodic_params() {
        let mut bad = venom();
        bad.success_rate = 1.5;
        assert!(TrialParams::new(1, 2, 10, 0.0, 1.0, 1, 500, Some(bad)).is_err());

        let mut bad = venom();
        bad.dmg_min = 300.0;
        assert!(TrialParams::new(1, 2, 10, 0.0, 1.0, 1, 500, Some(bad)).is_err());

        let mut bad = venom();
        bad.max_stack = 0;
        assert!(TrialParams::new(1, 2, 10, 0.0, 1.0, 1, 500, Some(bad)).is_err());
    }

    #[test]
    fn accepts_valid_params() {
        let params = TrialParams::new(100, 200, 5000, 30.0, 4.0, 2, 600, Some(venom()))
            .expect("params should be valid");
        assert_eq!(params.max_stack(), 3);
    }
}
