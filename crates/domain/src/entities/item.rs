//! Item entity - Generated loot and its balance invariants
//!
//! Items come from an untrusted model response, so every stat is clamped into
//! a rarity-dependent ceiling before the item is handed to game logic:
//!
//! | Rarity    | damage / defense | healing  |
//! |-----------|------------------|----------|
//! | common    | 0..=15           | 0..=30   |
//! | uncommon  | 0..=30           | 0..=60   |
//! | rare      | 0..=50           | 0..=100  |
//! | epic      | 0..=75           | 0..=150  |
//! | legendary | 0..=100          | 0..=200  |
//! | cursed    | 0..=150          | 0..=300  |
//!
//! Cooldown is clamped to `0.0..=60.0` seconds for every tier.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Upper bound for item cooldowns, in seconds.
pub const MAX_COOLDOWN_SECS: f32 = 60.0;

/// Quality band of an item, ordered from weakest to strongest.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ItemRarity {
    #[default]
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
    /// Powerful but dangerous; carries the highest ceiling.
    Cursed,
}

impl ItemRarity {
    pub const COUNT: usize = 6;

    pub fn all() -> &'static [ItemRarity; Self::COUNT] {
        &[
            ItemRarity::Common,
            ItemRarity::Uncommon,
            ItemRarity::Rare,
            ItemRarity::Epic,
            ItemRarity::Legendary,
            ItemRarity::Cursed,
        ]
    }

    /// Position in [`ItemRarity::all`]; used to index rarity buckets.
    pub fn index(self) -> usize {
        match self {
            ItemRarity::Common => 0,
            ItemRarity::Uncommon => 1,
            ItemRarity::Rare => 2,
            ItemRarity::Epic => 3,
            ItemRarity::Legendary => 4,
            ItemRarity::Cursed => 5,
        }
    }

    /// Ceiling for damage and defense. Healing is allowed twice this.
    pub fn stat_ceiling(self) -> i32 {
        match self {
            ItemRarity::Common => 15,
            ItemRarity::Uncommon => 30,
            ItemRarity::Rare => 50,
            ItemRarity::Epic => 75,
            ItemRarity::Legendary => 100,
            ItemRarity::Cursed => 150,
        }
    }

    pub fn healing_ceiling(self) -> i32 {
        self.stat_ceiling() * 2
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemRarity::Common => "common",
            ItemRarity::Uncommon => "uncommon",
            ItemRarity::Rare => "rare",
            ItemRarity::Epic => "epic",
            ItemRarity::Legendary => "legendary",
            ItemRarity::Cursed => "cursed",
        }
    }

    /// Lenient parse for model output: unknown names become `Common`.
    pub fn from_name_lossy(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for ItemRarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemRarity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "common" => Ok(Self::Common),
            "uncommon" => Ok(Self::Uncommon),
            "rare" => Ok(Self::Rare),
            "epic" => Ok(Self::Epic),
            "legendary" => Ok(Self::Legendary),
            "cursed" => Ok(Self::Cursed),
            _ => Err(DomainError::parse(format!("Unknown item rarity: {}", s))),
        }
    }
}

/// Broad category of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ItemType {
    #[default]
    Weapon,
    Armor,
    Consumable,
    Relic,
    Artifact,
}

impl ItemType {
    pub fn all() -> &'static [ItemType] {
        &[
            ItemType::Weapon,
            ItemType::Armor,
            ItemType::Consumable,
            ItemType::Relic,
            ItemType::Artifact,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::Weapon => "weapon",
            ItemType::Armor => "armor",
            ItemType::Consumable => "consumable",
            ItemType::Relic => "relic",
            ItemType::Artifact => "artifact",
        }
    }

    /// Lenient parse for model output: unknown names become `Weapon`.
    pub fn from_name_lossy(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "weapon" => Ok(Self::Weapon),
            "armor" => Ok(Self::Armor),
            "consumable" => Ok(Self::Consumable),
            "relic" => Ok(Self::Relic),
            "artifact" => Ok(Self::Artifact),
            _ => Err(DomainError::parse(format!("Unknown item type: {}", s))),
        }
    }
}

/// A generated item.
///
/// Fields are public because the type is built at the mapping boundary from
/// model output; call [`ItemDefinition::clamp_to_rarity`] before the item is
/// treated as valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemDefinition {
    pub name: String,
    pub description: String,
    pub item_type: ItemType,
    pub rarity: ItemRarity,
    pub damage: i32,
    pub defense: i32,
    pub healing: i32,
    /// Seconds between uses
    pub cooldown: f32,
    pub effects: Vec<String>,
    pub modifiers: BTreeMap<String, f32>,
    pub flavor_text: String,
    /// Visual description for artists
    pub sprite_hint: String,
}

impl ItemDefinition {
    pub fn new(name: impl Into<String>, item_type: ItemType, rarity: ItemRarity) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            item_type,
            rarity,
            damage: 0,
            defense: 0,
            healing: 0,
            cooldown: 0.0,
            effects: Vec::new(),
            modifiers: BTreeMap::new(),
            flavor_text: String::new(),
            sprite_hint: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_damage(mut self, damage: i32) -> Self {
        self.damage = damage;
        self
    }

    pub fn with_flavor_text(mut self, flavor_text: impl Into<String>) -> Self {
        self.flavor_text = flavor_text.into();
        self
    }

    /// Clamp all stats into the bounds allowed for this item's rarity.
    ///
    /// Returns `true` if any stat was changed.
    pub fn clamp_to_rarity(&mut self) -> bool {
        let ceiling = self.rarity.stat_ceiling();
        let before = (self.damage, self.defense, self.healing, self.cooldown);

        self.damage = self.damage.clamp(0, ceiling);
        self.defense = self.defense.clamp(0, ceiling);
        self.healing = self.healing.clamp(0, self.rarity.healing_ceiling());
        self.cooldown = if self.cooldown.is_finite() {
            self.cooldown.clamp(0.0, MAX_COOLDOWN_SECS)
        } else {
            0.0
        };

        before != (self.damage, self.defense, self.healing, self.cooldown)
    }

    /// Whether every stat already lies within the rarity bounds.
    pub fn is_within_bounds(&self) -> bool {
        let ceiling = self.rarity.stat_ceiling();
        (0..=ceiling).contains(&self.damage)
            && (0..=ceiling).contains(&self.defense)
            && (0..=self.rarity.healing_ceiling()).contains(&self.healing)
            && (0.0..=MAX_COOLDOWN_SECS).contains(&self.cooldown)
    }
}
