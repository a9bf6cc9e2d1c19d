//! Necronomicore domain types.
//!
//! Typed records for everything the content services hand to game logic:
//! generated items and their pools, NPC personalities, dialogue context, and
//! roll outcomes. Stat clamping and modifier arithmetic live here so they can
//! be tested without any I/O.

pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use entities::{
    clamp_intensity, ItemDefinition, ItemPool, ItemRarity, ItemType, NpcPersonality,
    PersonalityTrait, DEFAULT_ARCHETYPE, FALLBACK_POOL_THEME, MAX_COOLDOWN_SECS,
};
pub use error::DomainError;
pub use ids::{NpcId, PlayerId, PoolId};
pub use value_objects::{
    apply_modifiers, mood, Critical, CriticalBands, DialogContext, GamblingBand, RollModifier,
    RollResult, RunConfig, DEFAULT_THEME, FLAVOR_AI_PLACEHOLDER, FLAVOR_CRITICAL_FAILURE,
    FLAVOR_CRITICAL_SUCCESS, FLAVOR_PLAIN, RECENT_LINES_IN_PROMPT,
};
