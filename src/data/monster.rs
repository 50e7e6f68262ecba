//! Monster table records.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterRecord {
    pub id: String,
    pub name: String,
    pub hp: u64,
    pub weapon_def: f64,
    /// Carried for display; the simulator only uses weapon defense.
    #[serde(default)]
    pub magic_def: f64,
}
