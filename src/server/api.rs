use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::combat::{
    calc_dmg_percent, calc_periodic_params, weapon_attack_estimate, PeriodicParams, PlayerStats,
};
use crate::config::{ConfigError, MAX_SIMULATION_COUNT};
use crate::data::{DataError, DataRegistry, MonsterRecord, SkillRecord};
use crate::error::SimError;
use crate::estimator::{run_simulation, summarize, Summary};
use crate::server::AppState;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid request body: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error(transparent)]
    Sim(#[from] SimError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ApiError {
    pub fn status(&self) -> (u16, &'static str) {
        match self {
            Self::Parse(_) | Self::Validation(_) => (400, "Bad Request"),
            Self::Data(DataError::UnknownMonster(_) | DataError::UnknownSkill(_)) => {
                (404, "Not Found")
            }
            Self::Data(DataError::NotAnAttackSkill(_) | DataError::MissingVenom) => {
                (400, "Bad Request")
            }
            Self::Sim(err) if err.is_configuration() => (400, "Bad Request"),
            _ => (500, "Internal Server Error"),
        }
    }
}

pub fn health_payload() -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serde_json::json!({
        "status": "ok",
        "service": "nshot-api",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

pub fn monsters_payload(registry: &DataRegistry) -> Result<String, serde_json::Error> {
    let list: Vec<&MonsterRecord> = registry.monsters().iter().collect();
    serde_json::to_string_pretty(&serde_json::json!({ "monsters": list }))
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillListItem {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_en: Option<String>,
    pub hits: u32,
    pub latency: u64,
    pub min_level: u32,
    pub max_level: u32,
    pub default_level: u32,
    /// Damage percent at the default level; null for fixed-damage skills.
    pub dmg_percent: Option<f64>,
}

impl From<&SkillRecord> for SkillListItem {
    fn from(skill: &SkillRecord) -> Self {
        Self {
            id: skill.id.clone(),
            name: skill.name.clone(),
            name_en: skill.name_en.clone(),
            hits: skill.hits,
            latency: skill.latency,
            min_level: skill.min_level,
            max_level: skill.max_level,
            default_level: skill.default_level,
            dmg_percent: calc_dmg_percent(skill, skill.default_level).ok(),
        }
    }
}

pub fn skills_payload(registry: &DataRegistry) -> Result<String, serde_json::Error> {
    let list: Vec<SkillListItem> = registry.attack_skills().map(SkillListItem::from).collect();
    serde_json::to_string_pretty(&serde_json::json!({ "skills": list }))
}

/// Query parameters as `(key, value)` pairs; keys without `=` get an empty value.
fn query_pairs(path: &str) -> Vec<(&str, &str)> {
    path.split_once('?')
        .map(|(_, query)| query)
        .unwrap_or("")
        .split('&')
        .filter(|p| !p.is_empty())
        .map(|p| p.split_once('=').unwrap_or((p, "")))
        .collect()
}

fn query_u32(pairs: &[(&str, &str)], key: &str) -> Result<Option<u32>, ApiError> {
    match pairs.iter().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
        None => Ok(None),
        Some((_, value)) => value
            .trim()
            .parse::<u32>()
            .map(Some)
            .map_err(|_| ApiError::Validation(format!("{key} must be a non-negative integer"))),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VenomInfoResponse {
    pub level: u32,
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<PeriodicParams>,
}

/// GET /api/venom?level=&str=&dex=&luk= : derived venom parameters for display.
pub fn venom_payload(registry: &DataRegistry, path: &str) -> Result<String, ApiError> {
    let pairs = query_pairs(path);
    let level = query_u32(&pairs, "level")?.unwrap_or(0);
    let stats = PlayerStats {
        strength: query_u32(&pairs, "str")?.unwrap_or(0),
        dex: query_u32(&pairs, "dex")?.unwrap_or(0),
        int: query_u32(&pairs, "int")?.unwrap_or(0),
        luk: query_u32(&pairs, "luk")?.unwrap_or(0),
    };

    let params = if level > 0 {
        Some(calc_periodic_params(registry.venom_metadata()?, level, stats)?)
    } else {
        None
    };
    let response = VenomInfoResponse {
        level,
        enabled: params.is_some(),
        params,
    };
    Ok(serde_json::to_string_pretty(&response)?)
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimulateRequest {
    pub monster: String,
    #[serde(default)]
    pub skill: Option<String>,
    #[serde(default)]
    pub skill_level: Option<u32>,
    pub atk_min: u32,
    pub atk_max: u32,
    #[serde(default)]
    pub venom_level: Option<u32>,
    #[serde(flatten)]
    pub stats: PlayerStats,
    #[serde(default)]
    pub sims: Option<usize>,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SimulateResponse {
    pub status: &'static str,
    pub monster: String,
    pub skill: String,
    pub skill_level: u32,
    pub dmg_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venom: Option<PeriodicParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon_attack: Option<u32>,
    pub summary: Summary,
    pub seed: u64,
}

/// POST /api/simulate. Input is sanitized here the way a form would before reaching the core.
pub fn simulate_payload(body: &str, state: &AppState) -> Result<String, ApiError> {
    let req: SimulateRequest = serde_json::from_str(body)?;
    if req.atk_min == 0 || req.atk_max == 0 || req.atk_min > req.atk_max {
        return Err(ApiError::Validation(
            "attack range must be positive with atk_min <= atk_max".to_string(),
        ));
    }

    let registry = &state.registry;
    let monster = registry.monster(&req.monster)?;
    let skill = match req.skill.as_deref() {
        Some(name) => registry.attack_skill(name)?,
        None => registry
            .default_attack_skill()
            .ok_or_else(|| ApiError::Validation("no attack skills available".to_string()))?,
    };
    let skill_level = skill.clamp_level(req.skill_level);
    let dmg_percent = calc_dmg_percent(skill, skill_level)?;

    let venom = match req.venom_level {
        Some(level) if level > 0 => Some(calc_periodic_params(
            registry.venom_metadata()?,
            level,
            req.stats,
        )?),
        _ => None,
    };

    let sims = req
        .sims
        .map(|n| n.clamp(1, MAX_SIMULATION_COUNT));
    let run = state.config.run_config(sims, req.seed)?;
    let distribution = run_simulation(
        req.atk_min,
        req.atk_max,
        monster,
        skill,
        skill_level,
        venom,
        &run,
    )?;

    let response = SimulateResponse {
        status: "ok",
        monster: monster.id.clone(),
        skill: skill.id.clone(),
        skill_level,
        dmg_percent,
        venom,
        weapon_attack: weapon_attack_estimate(req.stats, req.atk_max),
        summary: summarize(&distribution),
        seed: run.seed,
    };
    Ok(serde_json::to_string_pretty(&response)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_pairs_split() {
        let pairs = query_pairs("/api/venom?level=10&str=4&flag");
        assert_eq!(pairs, vec![("level", "10"), ("str", "4"), ("flag", "")]);
        assert!(query_pairs("/api/venom").is_empty());
    }

    #[test]
    fn query_u32_rejects_garbage() {
        let pairs = query_pairs("/x?level=abc");
        assert!(matches!(
            query_u32(&pairs, "level"),
            Err(ApiError::Validation(_))
        ));
        assert_eq!(query_u32(&pairs, "dex").ok(), Some(None));
    }

    #[test]
    fn error_status_mapping() {
        assert_eq!(
            ApiError::Data(DataError::UnknownMonster("x".into())).status().0,
            404
        );
        assert_eq!(ApiError::Sim(SimError::ZeroHits).status().0, 400);
        assert_eq!(ApiError::Sim(SimError::Cancelled).status().0, 500);
    }
}
