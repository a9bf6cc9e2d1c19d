//! Domain entities - Core game objects produced by the content services

mod item;
mod item_pool;
mod npc;

pub use item::{ItemDefinition, ItemRarity, ItemType, MAX_COOLDOWN_SECS};
pub use item_pool::{ItemPool, FALLBACK_POOL_THEME};
pub use npc::{clamp_intensity, NpcPersonality, PersonalityTrait, DEFAULT_ARCHETYPE};
