//! NPC personality - Persona, mood, and relationship state used for dialogue

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::value_objects::mood;
use crate::{NpcId, PlayerId};

/// Archetype used when the host does not provide one.
pub const DEFAULT_ARCHETYPE: &str = "mysterious stranger";

/// A single weighted personality trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityTrait {
    pub name: String,
    /// Strength of the trait, 0.0 to 1.0
    pub intensity: f32,
    pub description: String,
}

impl PersonalityTrait {
    pub fn new(name: impl Into<String>, intensity: f32) -> Self {
        Self {
            name: name.into(),
            intensity: clamp_intensity(intensity),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Intensities outside 0..=1 (or NaN) from host data are pulled back in range.
pub fn clamp_intensity(intensity: f32) -> f32 {
    if intensity.is_nan() {
        0.0
    } else {
        intensity.clamp(0.0, 1.0)
    }
}

/// Personality profile of a registered NPC.
///
/// Mutated in place by trait updates, mood updates, and relationship deltas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpcPersonality {
    pub id: NpcId,
    pub name: String,
    pub archetype: String,
    pub traits: Vec<PersonalityTrait>,
    pub background: BTreeMap<String, String>,
    pub relationships: BTreeMap<String, i32>,
    pub current_mood: String,
    /// 0.0 (broken) to 1.0 (lucid)
    pub sanity_level: f32,
}

impl NpcPersonality {
    pub fn new(id: NpcId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            archetype: DEFAULT_ARCHETYPE.to_string(),
            traits: Vec::new(),
            background: BTreeMap::new(),
            relationships: BTreeMap::new(),
            current_mood: mood::NEUTRAL.to_string(),
            sanity_level: 1.0,
        }
    }

    pub fn with_archetype(mut self, archetype: impl Into<String>) -> Self {
        self.archetype = archetype.into();
        self
    }

    pub fn with_trait(mut self, personality_trait: PersonalityTrait) -> Self {
        self.traits.push(personality_trait);
        self
    }

    /// Update a trait's intensity by name, or append it if absent.
    pub fn upsert_trait(&mut self, name: &str, intensity: f32) {
        let intensity = clamp_intensity(intensity);
        match self.traits.iter_mut().find(|t| t.name == name) {
            Some(existing) => existing.intensity = intensity,
            None => self.traits.push(PersonalityTrait::new(name, intensity)),
        }
    }

    pub fn adjust_relationship(&mut self, player: &PlayerId, delta: i32) -> i32 {
        let score = self
            .relationships
            .entry(player.as_str().to_string())
            .or_insert(0);
        *score = score.saturating_add(delta);
        *score
    }

    pub fn relationship(&self, player: &PlayerId) -> i32 {
        self.relationships.get(player.as_str()).copied().unwrap_or(0)
    }

    /// Apply the mood heuristic for a player action.
    ///
    /// Returns `true` if the mood changed.
    pub fn react_to_action(&mut self, player_action: &str) -> bool {
        match mood::mood_for_action(player_action) {
            Some(new_mood) if self.current_mood != new_mood => {
                self.current_mood = new_mood.to_string();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hermit() -> NpcPersonality {
        NpcPersonality::new(NpcId::from("hermit"), "Old Mossback")
            .with_trait(PersonalityTrait::new("paranoid", 0.8).with_description("trusts no one"))
    }

    #[test]
    fn new_personality_uses_defaults() {
        let npc = NpcPersonality::new(NpcId::from("x"), "X");
        assert_eq!(npc.archetype, DEFAULT_ARCHETYPE);
        assert_eq!(npc.current_mood, mood::NEUTRAL);
        assert_eq!(npc.sanity_level, 1.0);
    }

    #[test]
    fn upsert_updates_existing_trait_in_place() {
        let mut npc = hermit();
        npc.upsert_trait("paranoid", 0.2);
        assert_eq!(npc.traits.len(), 1);
        assert_eq!(npc.traits[0].intensity, 0.2);
        assert_eq!(npc.traits[0].description, "trusts no one");
    }

    #[test]
    fn upsert_appends_missing_trait() {
        let mut npc = hermit();
        npc.upsert_trait("generous", 1.7);
        assert_eq!(npc.traits.len(), 2);
        assert_eq!(npc.traits[1].name, "generous");
        assert_eq!(npc.traits[1].intensity, 1.0);
    }

    #[test]
    fn relationship_accumulates_deltas() {
        let mut npc = hermit();
        let player = PlayerId::default_player();
        assert_eq!(npc.relationship(&player), 0);
        npc.adjust_relationship(&player, 5);
        npc.adjust_relationship(&player, -8);
        assert_eq!(npc.relationship(&player), -3);
    }

    #[test]
    fn hostile_actions_change_mood() {
        let mut npc = hermit();
        assert!(npc.react_to_action("player attacks the hermit"));
        assert_eq!(npc.current_mood, mood::HOSTILE);
        assert!(!npc.react_to_action("player attacks again"));
        assert!(npc.react_to_action("offers a gift"));
        assert_eq!(npc.current_mood, mood::FRIENDLY);
        assert!(!npc.react_to_action("waves"));
        assert_eq!(npc.current_mood, mood::FRIENDLY);
    }
}
