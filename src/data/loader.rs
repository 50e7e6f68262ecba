//! Load monster and skill tables from JSON and resolve entries by id or name.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::data::monster::MonsterRecord;
use crate::data::skill::SkillRecord;

pub const MONSTERS_FILE: &str = "monsters.json";
pub const SKILLS_FILE: &str = "skills.json";

/// Tables compiled into the binary, used when no data directory is available.
pub const BUNDLED_MONSTERS: &str = include_str!("../../data/monsters.json");
pub const BUNDLED_SKILLS: &str = include_str!("../../data/skills.json");

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unknown monster `{0}`")]
    UnknownMonster(String),

    #[error("unknown skill `{0}`")]
    UnknownSkill(String),

    #[error("skill `{0}` is not an attack skill")]
    NotAnAttackSkill(String),

    #[error("skill table has no `venom` metadata")]
    MissingVenom,
}

/// Normalize a string for lookup: lowercase, collapse spaces/underscores/hyphens.
pub fn normalize_lookup(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() || c == '_' || c == '-' { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, DataError> {
    let raw = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_json(&raw, path)
}

fn parse_json<T: DeserializeOwned>(raw: &str, path: &Path) -> Result<T, DataError> {
    serde_json::from_str(raw).map_err(|source| DataError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_monsters(path: &Path) -> Result<Vec<MonsterRecord>, DataError> {
    load_json(path)
}

pub fn load_skills(path: &Path) -> Result<Vec<SkillRecord>, DataError> {
    load_json(path)
}

pub fn bundled_monsters() -> Result<Vec<MonsterRecord>, DataError> {
    parse_json(BUNDLED_MONSTERS, Path::new("<bundled>/monsters.json"))
}

pub fn bundled_skills() -> Result<Vec<SkillRecord>, DataError> {
    parse_json(BUNDLED_SKILLS, Path::new("<bundled>/skills.json"))
}

/// Find a monster by id, falling back to a unique name match.
pub fn resolve_monster<'a>(monsters: &'a [MonsterRecord], name_or_id: &str) -> Option<&'a MonsterRecord> {
    let normalized = normalize_lookup(name_or_id);
    if let Some(m) = monsters.iter().find(|m| normalize_lookup(&m.id) == normalized) {
        return Some(m);
    }
    let mut by_name = monsters
        .iter()
        .filter(|m| normalize_lookup(&m.name) == normalized);
    match (by_name.next(), by_name.next()) {
        (Some(m), None) => Some(m),
        _ => None,
    }
}

/// Find a skill by id, or by its English name.
pub fn resolve_skill<'a>(skills: &'a [SkillRecord], name_or_id: &str) -> Option<&'a SkillRecord> {
    let normalized = normalize_lookup(name_or_id);
    skills.iter().find(|s| normalize_lookup(&s.id) == normalized).or_else(|| {
        skills.iter().find(|s| {
            s.name_en
                .as_deref()
                .is_some_and(|name| normalize_lookup(name) == normalized)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_separators() {
        assert_eq!(normalize_lookup("  Savage   Blow "), "savage_blow");
        assert_eq!(normalize_lookup("savage-blow"), "savage_blow");
        assert_eq!(normalize_lookup("SAVAGE_BLOW"), "savage_blow");
    }

    #[test]
    fn bundled_tables_parse() {
        let monsters = bundled_monsters().expect("bundled monsters parse");
        let skills = bundled_skills().expect("bundled skills parse");
        assert!(!monsters.is_empty());
        assert!(skills.iter().any(SkillRecord::is_attack));
        assert!(skills.iter().any(|s| s.metadata.is_some()));
    }

    #[test]
    fn resolve_by_id_and_name() {
        let monsters = bundled_monsters().expect("bundled monsters parse");
        let first = &monsters[0];
        assert_eq!(resolve_monster(&monsters, &first.id), Some(first));
        assert_eq!(resolve_monster(&monsters, &first.name.to_uppercase()), Some(first));
        assert!(resolve_monster(&monsters, "no such monster").is_none());

        let skills = bundled_skills().expect("bundled skills parse");
        assert_eq!(
            resolve_skill(&skills, "Savage Blow").map(|s| s.id.as_str()),
            Some("savage_blow")
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let err = load_monsters(Path::new("/nonexistent/monsters.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/monsters.json"));
    }
}
