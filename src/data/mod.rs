//! Static game tables consumed by the simulator: monsters, skills and the venom metadata.

pub mod data_registry;
pub mod loader;
pub mod monster;
pub mod skill;
pub mod validate;

pub use data_registry::DataRegistry;
pub use loader::DataError;
pub use monster::MonsterRecord;
pub use skill::{DamagePercent, SkillRecord, VenomMetadata};
pub use validate::{validate_tables, ValidationReport};
