//! Startup-loaded data cache (DataRegistry) for the CLI and server.
//! Load once, pass via Arc to handlers to avoid re-reading tables on every request.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::data::loader::{
    bundled_monsters, bundled_skills, load_monsters, load_skills, resolve_monster, resolve_skill,
    DataError, MONSTERS_FILE, SKILLS_FILE,
};
use crate::data::monster::MonsterRecord;
use crate::data::skill::{SkillRecord, VenomMetadata, VENOM_SKILL_ID};

/// Read-only monster and skill tables.
#[derive(Debug, Clone)]
pub struct DataRegistry {
    monsters: Vec<MonsterRecord>,
    skills: Vec<SkillRecord>,
}

impl DataRegistry {
    pub fn from_parts(monsters: Vec<MonsterRecord>, skills: Vec<SkillRecord>) -> Self {
        Self { monsters, skills }
    }

    /// Load `monsters.json` and `skills.json` from `data_dir`. A directory without a
    /// monster table falls back to the bundled tables; a present but unreadable file is an error.
    pub fn load(data_dir: &Path) -> Result<Arc<DataRegistry>, DataError> {
        let monsters_path = data_dir.join(MONSTERS_FILE);
        if !monsters_path.is_file() {
            info!(dir = %data_dir.display(), "no data tables found, using bundled tables");
            return Self::bundled().map(Arc::new);
        }
        let monsters = load_monsters(&monsters_path)?;
        let skills = load_skills(&data_dir.join(SKILLS_FILE))?;
        debug!(
            monsters = monsters.len(),
            skills = skills.len(),
            dir = %data_dir.display(),
            "loaded data tables"
        );
        Ok(Arc::new(Self::from_parts(monsters, skills)))
    }

    pub fn bundled() -> Result<DataRegistry, DataError> {
        Ok(Self::from_parts(bundled_monsters()?, bundled_skills()?))
    }

    pub fn monsters(&self) -> &[MonsterRecord] {
        &self.monsters
    }

    pub fn skills(&self) -> &[SkillRecord] {
        &self.skills
    }

    pub fn attack_skills(&self) -> impl Iterator<Item = &SkillRecord> {
        self.skills.iter().filter(|s| s.is_attack())
    }

    pub fn monster(&self, name_or_id: &str) -> Result<&MonsterRecord, DataError> {
        resolve_monster(&self.monsters, name_or_id)
            .ok_or_else(|| DataError::UnknownMonster(name_or_id.to_string()))
    }

    /// Attack skill by id or English name; passive skills are rejected.
    pub fn attack_skill(&self, name_or_id: &str) -> Result<&SkillRecord, DataError> {
        let skill = resolve_skill(&self.skills, name_or_id)
            .ok_or_else(|| DataError::UnknownSkill(name_or_id.to_string()))?;
        if !skill.is_attack() {
            return Err(DataError::NotAnAttackSkill(skill.id.clone()));
        }
        Ok(skill)
    }

    /// First attack skill in table order, the selection default.
    pub fn default_attack_skill(&self) -> Option<&SkillRecord> {
        self.attack_skills().next()
    }

    pub fn venom_skill(&self) -> Option<&SkillRecord> {
        self.skills.iter().find(|s| s.id == VENOM_SKILL_ID)
    }

    pub fn venom_metadata(&self) -> Result<&VenomMetadata, DataError> {
        self.venom_skill()
            .and_then(|s| s.metadata.as_ref())
            .ok_or(DataError::MissingVenom)
    }
}
