//! Run configuration for item pool generation

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Theme used when the run configuration omits one.
pub const DEFAULT_THEME: &str = "lovecraftian fungal dungeon";

/// Parameters of a dungeon run that shape item generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    pub difficulty: i32,
    pub floor: i32,
    pub theme: String,
    /// Any other keys the host passed along; recorded on the pool.
    pub params: BTreeMap<String, String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            difficulty: 1,
            floor: 1,
            theme: DEFAULT_THEME.to_string(),
            params: BTreeMap::new(),
        }
    }
}

impl RunConfig {
    pub fn new(difficulty: i32, floor: i32) -> Self {
        Self {
            difficulty,
            floor,
            ..Self::default()
        }
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = theme.into();
        self
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }
}
