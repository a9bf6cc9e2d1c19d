//! Value objects - Immutable objects defined by their attributes

mod dialog_context;
pub mod mood;
mod roll;
mod run_config;

pub use dialog_context::{DialogContext, RECENT_LINES_IN_PROMPT};
pub use roll::{
    apply_modifiers, Critical, CriticalBands, GamblingBand, RollModifier, RollResult,
    FLAVOR_AI_PLACEHOLDER, FLAVOR_CRITICAL_FAILURE, FLAVOR_CRITICAL_SUCCESS, FLAVOR_PLAIN,
};
pub use run_config::{RunConfig, DEFAULT_THEME};
