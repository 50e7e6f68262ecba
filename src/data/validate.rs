use std::collections::HashSet;
use std::fmt;

use crate::data::data_registry::DataRegistry;
use crate::data::skill::{DamagePercent, FIXED_DAMAGE_SENTINEL};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ValidationSeverity {
    Error,
    Warning,
}

impl ValidationSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

impl fmt::Display for ValidationSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDiagnostic {
    pub severity: ValidationSeverity,
    pub context: String,
    pub message: String,
}

impl fmt::Display for ValidationDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.context, self.message)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn push(
        &mut self,
        severity: ValidationSeverity,
        context: impl Into<String>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ValidationDiagnostic {
            severity,
            context: context.into(),
            message: message.into(),
        });
    }

    pub fn error(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.push(ValidationSeverity::Error, context, message);
    }

    pub fn warning(&mut self, context: impl Into<String>, message: impl Into<String>) {
        self.push(ValidationSeverity::Warning, context, message);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|diag| diag.severity == ValidationSeverity::Error)
    }
}

/// Check the monster and skill tables for entries the simulator would reject or misuse.
pub fn validate_tables(registry: &DataRegistry) -> ValidationReport {
    let mut report = ValidationReport::default();

    let mut seen = HashSet::new();
    for monster in registry.monsters() {
        let ctx = format!("monster {}", monster.id);
        if monster.id.trim().is_empty() {
            report.error(&ctx, "missing id");
        } else if !seen.insert(monster.id.as_str()) {
            report.error(&ctx, "duplicate id");
        }
        if monster.hp == 0 {
            report.error(&ctx, "hp must be positive");
        }
        if !monster.weapon_def.is_finite() || monster.weapon_def < 0.0 {
            report.error(&ctx, format!("invalid weapon_def {}", monster.weapon_def));
        }
    }

    let mut seen = HashSet::new();
    for skill in registry.skills() {
        let ctx = format!("skill {}", skill.id);
        if skill.id.trim().is_empty() {
            report.error(&ctx, "missing id");
        } else if !seen.insert(skill.id.as_str()) {
            report.error(&ctx, "duplicate id");
        }
        if skill.min_level > skill.max_level {
            report.error(&ctx, "min_level exceeds max_level");
        } else if !skill.level_in_range(skill.default_level) {
            report.error(&ctx, "default_level outside [min_level, max_level]");
        }
        if let DamagePercent::Fixed(value) = skill.dmg_percent {
            if value != FIXED_DAMAGE_SENTINEL {
                report.error(
                    &ctx,
                    format!("dmg_percent must be an object or {FIXED_DAMAGE_SENTINEL}, got {value}"),
                );
            }
        }
        if skill.is_attack() {
            if skill.hits == 0 {
                report.error(&ctx, "hits must be positive");
            }
            if skill.latency == 0 {
                report.error(&ctx, "latency must be positive");
            }
            if skill.is_fixed_damage() {
                report.warning(&ctx, "fixed-damage skill cannot be simulated");
            }
        }
        if let Some(meta) = &skill.metadata {
            if meta.success_rate.ceil_divisor == 0 || meta.duration_ms.ceil_divisor == 0 {
                report.error(&ctx, "ceil_divisor must be positive");
            }
            if meta.max_stack == 0 {
                report.error(&ctx, "max_stack must be positive");
            }
            if meta.tick_interval_ms == 0 {
                report.error(&ctx, "tick_interval_ms must be positive");
            }
            let c = &meta.dmg_coefficients;
            if c.min_main_stat_coeff > c.max_main_stat_coeff {
                report.error(&ctx, "min_main_stat_coeff exceeds max_main_stat_coeff");
            }
        }
    }

    if registry.venom_skill().and_then(|s| s.metadata.as_ref()).is_none() {
        report.warning("skills", "no venom metadata; damage-over-time is unavailable");
    }
    if registry.default_attack_skill().is_none() {
        report.error("skills", "no attack skills");
    }

    report
}
