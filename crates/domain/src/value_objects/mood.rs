//! NPC mood labels and the player-action heuristic
//!
//! Mood stays a free-form string because hosts register NPCs with any mood
//! they like. Only the two moods below are ever derived automatically.

pub const NEUTRAL: &str = "neutral";
pub const HOSTILE: &str = "hostile";
pub const FRIENDLY: &str = "friendly";

const HOSTILE_CUES: &[&str] = &["attack", "hostile"];
const FRIENDLY_CUES: &[&str] = &["help", "gift"];

/// Mood implied by a player action, if any.
///
/// Substring match, case-insensitive. Hostile cues win over friendly ones.
pub fn mood_for_action(player_action: &str) -> Option<&'static str> {
    let action = player_action.to_lowercase();
    if HOSTILE_CUES.iter().any(|cue| action.contains(cue)) {
        Some(HOSTILE)
    } else if FRIENDLY_CUES.iter().any(|cue| action.contains(cue)) {
        Some(FRIENDLY)
    } else {
        None
    }
}
