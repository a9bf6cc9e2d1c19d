//! Per-request dialogue context

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// How many prior lines are quoted back to the model.
pub const RECENT_LINES_IN_PROMPT: usize = 3;

/// Situation around a single dialogue request. Built per call, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogContext {
    pub location: String,
    pub recent_action: String,
    pub first_encounter: bool,
    pub player_sanity: i32,
    /// Earlier lines from this NPC, oldest first.
    pub previous_lines: Vec<String>,
    pub world_flags: BTreeMap<String, bool>,
}

impl Default for DialogContext {
    fn default() -> Self {
        Self {
            location: "unknown".to_string(),
            recent_action: String::new(),
            first_encounter: false,
            player_sanity: 100,
            previous_lines: Vec::new(),
            world_flags: BTreeMap::new(),
        }
    }
}

impl DialogContext {
    pub fn at(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    pub fn with_recent_action(mut self, action: impl Into<String>) -> Self {
        self.recent_action = action.into();
        self
    }

    pub fn with_previous_lines(mut self, lines: Vec<String>) -> Self {
        self.previous_lines = lines;
        self
    }

    pub fn first_encounter(mut self, first: bool) -> Self {
        self.first_encounter = first;
        self
    }

    /// The most recent prior lines, at most [`RECENT_LINES_IN_PROMPT`], oldest first.
    pub fn recent_lines(&self) -> &[String] {
        let start = self
            .previous_lines
            .len()
            .saturating_sub(RECENT_LINES_IN_PROMPT);
        &self.previous_lines[start..]
    }

    /// World flags that are set, in key order.
    pub fn active_flags(&self) -> impl Iterator<Item = &str> {
        self.world_flags
            .iter()
            .filter(|(_, set)| **set)
            .map(|(name, _)| name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_lines_keeps_last_three() {
        let ctx = DialogContext::default().with_previous_lines(
            ["one", "two", "three", "four"].iter().map(|s| s.to_string()).collect(),
        );
        assert_eq!(ctx.recent_lines(), ["two", "three", "four"]);

        let short = DialogContext::default().with_previous_lines(vec!["only".into()]);
        assert_eq!(short.recent_lines(), ["only"]);
    }

    #[test]
    fn defaults_match_host_expectations() {
        let ctx = DialogContext::default();
        assert_eq!(ctx.location, "unknown");
        assert_eq!(ctx.player_sanity, 100);
        assert!(!ctx.first_encounter);
    }
}
