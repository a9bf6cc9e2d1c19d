//! Translation between typed records and host-side JSON mappings.
//!
//! The host speaks loosely-typed key/value mappings. This is the only place
//! they are read or produced; everything inside the engine is typed.
//! Readers are lenient: missing or mistyped keys take the documented default.

use std::collections::BTreeMap;

use necronomicore_domain::{
    clamp_intensity, DialogContext, ItemDefinition, ItemRarity, ItemType, NpcId, NpcPersonality,
    PersonalityTrait, RollModifier, RollResult, RunConfig, DEFAULT_ARCHETYPE,
};
use serde_json::{json, Map, Value};

use crate::infrastructure::json;

const RUN_CONFIG_KEYS: [&str; 3] = ["difficulty", "floor", "theme"];

// =============================================================================
// Items
// =============================================================================

pub fn item_to_mapping(item: &ItemDefinition) -> Value {
    let modifiers: Map<String, Value> = item
        .modifiers
        .iter()
        .map(|(name, value)| (name.clone(), json!(f64::from(*value))))
        .collect();

    json!({
        "name": item.name,
        "description": item.description,
        "type": item.item_type.as_str(),
        "rarity": item.rarity.as_str(),
        "damage": item.damage,
        "defense": item.defense,
        "healing": item.healing,
        "cooldown": f64::from(item.cooldown),
        "effects": item.effects,
        "modifiers": modifiers,
        "flavor_text": item.flavor_text,
        "sprite_hint": item.sprite_hint,
    })
}

/// Unknown type or rarity names fall back to weapon / common. Both may also
/// be given as their ordinal.
pub fn item_from_mapping(mapping: &Value) -> ItemDefinition {
    let item_type = match mapping.get("type") {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|i| ItemType::all().get(usize::try_from(i).ok()?).copied())
            .unwrap_or_default(),
        _ => ItemType::from_name_lossy(&json::get_string(mapping, "type", "")),
    };
    let rarity = match mapping.get("rarity") {
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|i| ItemRarity::all().get(usize::try_from(i).ok()?).copied())
            .unwrap_or_default(),
        _ => ItemRarity::from_name_lossy(&json::get_string(mapping, "rarity", "")),
    };

    let effects: Vec<String> = json::get_array(mapping, "effects")
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect();

    let modifiers: BTreeMap<String, f32> = json::get_object(mapping, "modifiers")
        .as_object()
        .map(|object| {
            object
                .iter()
                .filter_map(|(name, value)| Some((name.clone(), value.as_f64()? as f32)))
                .collect()
        })
        .unwrap_or_default();

    ItemDefinition {
        name: json::get_string(mapping, "name", "Unknown Item"),
        description: json::get_string(mapping, "description", ""),
        item_type,
        rarity,
        damage: json::get_i32(mapping, "damage", 0),
        defense: json::get_i32(mapping, "defense", 0),
        healing: json::get_i32(mapping, "healing", 0),
        cooldown: json::get_float(mapping, "cooldown", 0.0) as f32,
        effects,
        modifiers,
        flavor_text: json::get_string(mapping, "flavor_text", ""),
        sprite_hint: json::get_string(mapping, "sprite_hint", ""),
    }
}

// =============================================================================
// NPCs
// =============================================================================

pub fn personality_to_mapping(personality: &NpcPersonality) -> Value {
    let traits: Vec<Value> = personality
        .traits
        .iter()
        .map(|t| {
            json!({
                "name": t.name,
                "intensity": f64::from(t.intensity),
                "description": t.description,
            })
        })
        .collect();

    json!({
        "npc_id": personality.id.as_str(),
        "npc_name": personality.name,
        "archetype": personality.archetype,
        "current_mood": personality.current_mood,
        "sanity_level": f64::from(personality.sanity_level),
        "traits": traits,
        "background": personality.background,
        "relationships": personality.relationships,
    })
}

pub fn personality_from_mapping(mapping: &Value) -> NpcPersonality {
    let id = NpcId::new(json::get_string(mapping, "npc_id", ""));
    let mut personality = NpcPersonality::new(id, json::get_string(mapping, "npc_name", ""));
    personality.archetype = json::get_string(mapping, "archetype", DEFAULT_ARCHETYPE);
    personality.current_mood =
        json::get_string(mapping, "current_mood", &personality.current_mood);
    personality.sanity_level =
        json::get_float(mapping, "sanity_level", f64::from(personality.sanity_level)) as f32;

    personality.traits = json::get_array(mapping, "traits")
        .iter()
        .filter(|value| value.is_object())
        .map(|value| PersonalityTrait {
            name: json::get_string(value, "name", ""),
            intensity: clamp_intensity(json::get_float(value, "intensity", 0.5) as f32),
            description: json::get_string(value, "description", ""),
        })
        .collect();

    personality.background = string_map(json::get_object(mapping, "background"));

    let relationships = json::get_object(mapping, "relationships");
    if let Some(scores) = relationships.as_object() {
        personality.relationships = scores
            .keys()
            .map(|player| (player.clone(), json::get_i32(relationships, player, 0)))
            .collect();
    }

    personality
}

// =============================================================================
// Rolls
// =============================================================================

pub fn roll_to_mapping(roll: &RollResult) -> Value {
    json!({
        "value": roll.value,
        "min_range": roll.min,
        "max_range": roll.max,
        "context": roll.context,
        "flavor_text": roll.flavor_text,
        "critical_success": roll.critical_success,
        "critical_failure": roll.critical_failure,
    })
}

pub fn modifier_to_mapping(modifier: &RollModifier) -> Value {
    json!({
        "name": modifier.name,
        "flat_bonus": modifier.flat_bonus,
        "multiplier": f64::from(modifier.multiplier),
        "description": modifier.description,
    })
}

// =============================================================================
// Requests
// =============================================================================

/// `difficulty`, `floor` and `theme` are typed; every other key is kept as a
/// run parameter in its JSON text form (strings unquoted).
pub fn run_config_from_mapping(mapping: &Value) -> RunConfig {
    let defaults = RunConfig::default();
    let mut config = RunConfig {
        difficulty: json::get_i32(mapping, "difficulty", defaults.difficulty),
        floor: json::get_i32(mapping, "floor", defaults.floor),
        theme: json::get_string(mapping, "theme", &defaults.theme),
        params: BTreeMap::new(),
    };

    if let Some(object) = mapping.as_object() {
        config.params = object
            .iter()
            .filter(|(key, _)| !RUN_CONFIG_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value_text(value)))
            .collect();
    }
    config
}

pub fn dialog_context_from_mapping(mapping: &Value) -> DialogContext {
    let defaults = DialogContext::default();
    let world_flags: BTreeMap<String, bool> = json::get_object(mapping, "world_flags")
        .as_object()
        .map(|flags| {
            flags
                .iter()
                .filter_map(|(name, value)| Some((name.clone(), value.as_bool()?)))
                .collect()
        })
        .unwrap_or_default();

    DialogContext {
        location: json::get_string(mapping, "location", &defaults.location),
        recent_action: json::get_string(mapping, "recent_action", ""),
        first_encounter: json::get_bool(mapping, "first_encounter", false),
        player_sanity: json::get_i32(mapping, "player_sanity", defaults.player_sanity),
        previous_lines: json::get_array(mapping, "previous_lines")
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        world_flags,
    }
}

fn string_map(value: &Value) -> BTreeMap<String, String> {
    value
        .as_object()
        .map(|object| {
            object
                .iter()
                .map(|(key, value)| (key.clone(), value_text(value)))
                .collect()
        })
        .unwrap_or_default()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => json::stringify(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_mapping_round_trips() {
        let mut item = ItemDefinition::new("Sporeglass Dagger", ItemType::Weapon, ItemRarity::Rare)
            .with_description("Translucent and humming")
            .with_damage(42)
            .with_flavor_text("It remembers every cut.");
        item.defense = 3;
        item.healing = 7;
        item.cooldown = 1.25;
        item.effects = vec!["bleed".into(), "glow".into()];
        item.modifiers.insert("crit".into(), 0.15);
        item.sprite_hint = "thin glass blade with mycelium".into();

        let mapping = item_to_mapping(&item);
        assert_eq!(mapping["type"], "weapon");
        assert_eq!(mapping["rarity"], "rare");
        assert_eq!(item_from_mapping(&mapping), item);
    }

    #[test]
    fn item_mapping_defaults_and_ordinals() {
        let item = item_from_mapping(&json!({"type": 3, "rarity": 5, "effects": ["a", 1]}));
        assert_eq!(item.name, "Unknown Item");
        assert_eq!(item.item_type, ItemType::Relic);
        assert_eq!(item.rarity, ItemRarity::Cursed);
        assert_eq!(item.effects, vec!["a".to_string()]);

        let odd = item_from_mapping(&json!({"type": "spoon", "rarity": 99}));
        assert_eq!(odd.item_type, ItemType::Weapon);
        assert_eq!(odd.rarity, ItemRarity::Common);
    }

    #[test]
    fn personality_mapping_round_trips() {
        let mut personality = NpcPersonality::new(NpcId::new("mossback"), "Old Mossback")
            .with_archetype("fungal hermit")
            .with_trait(PersonalityTrait::new("paranoid", 0.75).with_description("trusts no one"));
        personality.current_mood = "wary".into();
        personality.sanity_level = 0.5;
        personality
            .background
            .insert("origin".into(), "the deep caves".into());
        personality.relationships.insert("player".into(), -4);

        let mapping = personality_to_mapping(&personality);
        assert_eq!(personality_from_mapping(&mapping), personality);
    }

    #[test]
    fn personality_mapping_defaults() {
        let personality = personality_from_mapping(&json!({"npc_name": "Nobody"}));
        assert_eq!(personality.archetype, "mysterious stranger");
        assert_eq!(personality.current_mood, "neutral");
        assert_eq!(personality.sanity_level, 1.0);
        assert!(personality.traits.is_empty());

        let with_trait = personality_from_mapping(&json!({"traits": [{"name": "calm"}, 7]}));
        assert_eq!(with_trait.traits.len(), 1);
        assert_eq!(with_trait.traits[0].intensity, 0.5);
    }

    #[test]
    fn run_config_keeps_extra_params() {
        let config = run_config_from_mapping(&json!({
            "difficulty": 3,
            "theme": "sunken abbey",
            "seed": 1234,
            "biome": "marsh",
        }));
        assert_eq!(config.difficulty, 3);
        assert_eq!(config.floor, 1);
        assert_eq!(config.theme, "sunken abbey");
        assert_eq!(config.params.get("seed").map(String::as_str), Some("1234"));
        assert_eq!(config.params.get("biome").map(String::as_str), Some("marsh"));
        assert!(!config.params.contains_key("difficulty"));
    }

    #[test]
    fn dialog_context_defaults() {
        let context = dialog_context_from_mapping(&json!({
            "recent_action": "offered a gift",
            "world_flags": {"bell_rung": true, "moon_full": false, "junk": 3},
        }));
        assert_eq!(context.location, "unknown");
        assert_eq!(context.player_sanity, 100);
        assert_eq!(context.recent_action, "offered a gift");
        assert_eq!(context.active_flags().collect::<Vec<_>>(), vec!["bell_rung"]);
        assert_eq!(context.world_flags.len(), 2);
    }

    #[test]
    fn roll_mapping_uses_host_keys() {
        let roll = RollResult::new(7, 1, 10, "Attack").with_flavor("Your strike connects.");
        let mapping = roll_to_mapping(&roll);
        assert_eq!(mapping["value"], 7);
        assert_eq!(mapping["min_range"], 1);
        assert_eq!(mapping["max_range"], 10);
        assert_eq!(mapping["critical_success"], false);

        let modifier = modifier_to_mapping(&RollModifier::new("luck", 2, 1.5));
        assert_eq!(modifier["flat_bonus"], 2);
        assert_eq!(modifier["multiplier"], 1.5);
    }
}
