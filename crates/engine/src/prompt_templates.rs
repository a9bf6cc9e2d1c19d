//! Prompt text for every model call the engine makes.
//!
//! Builders are pure: same input, same prompt.

use std::fmt::Write as _;

use necronomicore_domain::{DialogContext, NpcPersonality, RunConfig};

/// Location used when an environmental message has none.
pub const DEFAULT_ENVIRONMENT_LOCATION: &str = "dungeon room";

const ITEM_SCHEMA_EXAMPLE: &str = r#"[
  {
    "name": "Item Name",
    "description": "Brief description",
    "type": "weapon",
    "rarity": "common",
    "damage": 10,
    "defense": 0,
    "healing": 0,
    "cooldown": 1.0,
    "flavor_text": "Atmospheric description",
    "sprite_hint": "Visual description for artists"
  },
  {"name": "Item 2", ...}
]"#;

/// Ask for ten items as a bare JSON array in the item schema.
pub fn item_pool_prompt(config: &RunConfig) -> String {
    format!(
        "Generate a pool of items for a roguelike dungeon crawler game. \
         Theme: {theme}. Difficulty level: {difficulty}, Floor: {floor}. \
         \n\nRespond with ONLY a JSON array (no markdown, no explanation), \
         using this exact format:\n\
         {ITEM_SCHEMA_EXAMPLE}\n\n\
         Generate 10 items with varied rarities (common, uncommon, rare, epic, legendary, cursed). \
         Items should fit the Lovecraftian fungal theme \
         with names inspired by mushrooms and cosmic horror. \
         Types can be: weapon, armor, consumable, relic, or artifact.",
        theme = config.theme,
        difficulty = config.difficulty,
        floor = config.floor,
    )
}

/// Persona, situation, recent lines, then the player's words.
pub fn dialog_prompt(
    personality: &NpcPersonality,
    context: &DialogContext,
    player_input: &str,
) -> String {
    let mut prompt = String::from(
        "You are roleplaying as an NPC in a Lovecraftian horror dungeon crawler game.\n\n",
    );

    // Writing into a String cannot fail.
    let _ = writeln!(prompt, "NPC Name: {}", personality.name);
    let _ = writeln!(prompt, "Archetype: {}", personality.archetype);
    let _ = writeln!(prompt, "Current Mood: {}", personality.current_mood);
    let _ = writeln!(
        prompt,
        "Sanity Level: {}%\n",
        (personality.sanity_level * 100.0).round()
    );

    prompt.push_str("Personality Traits:\n");
    for personality_trait in &personality.traits {
        let _ = writeln!(
            prompt,
            "- {} (intensity: {:.2}): {}",
            personality_trait.name, personality_trait.intensity, personality_trait.description
        );
    }

    prompt.push_str("\nContext:\n");
    let _ = writeln!(prompt, "Location: {}", context.location);
    if !context.recent_action.is_empty() {
        let _ = writeln!(prompt, "Player recently: {}", context.recent_action);
    }
    if context.first_encounter {
        prompt.push_str("This is your first time meeting the player.\n");
    }
    let _ = writeln!(prompt, "Player sanity: {}", context.player_sanity);
    let flags: Vec<&str> = context.active_flags().collect();
    if !flags.is_empty() {
        let _ = writeln!(prompt, "World state: {}", flags.join(", "));
    }

    let recent = context.recent_lines();
    if !recent.is_empty() {
        prompt.push_str("\nPrevious dialog:\n");
        for line in recent {
            let _ = writeln!(prompt, "- {line}");
        }
    }

    prompt.push_str(
        "\nGenerate a single line of dialog that this NPC would say. \
         Stay in character. Use atmosphere and horror elements. \
         Keep response under 100 words. \
         Do not include quotation marks or character name in the response.\n",
    );

    if !player_input.is_empty() {
        let _ = writeln!(prompt, "\nPlayer said: \"{player_input}\"");
    }

    prompt
}

pub fn environmental_message_prompt(location: &str) -> String {
    let location = if location.trim().is_empty() {
        DEFAULT_ENVIRONMENT_LOCATION
    } else {
        location
    };
    format!(
        "Generate a short, cryptic environmental message for a Lovecraftian horror game. \
         Location: {location}. \
         This might be scrawled on a wall, carved into stone, or written in fungal growth. \
         Make it unsettling and atmospheric. Maximum 20 words."
    )
}
