//! NPC dialogue use cases.
//!
//! Keeps a registry of NPC personalities and per-NPC dialogue history, and
//! turns persona plus situation into a single spoken line via the chat API.

use std::future::Future;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use necronomicore_domain::{DialogContext, NpcId, NpcPersonality, PlayerId};

use crate::infrastructure::api_client::{ApiClient, ChatMessage, ChatOptions};
use crate::infrastructure::json;
use crate::prompt_templates::{dialog_prompt, environmental_message_prompt};

/// Line used when the model gave nothing usable.
pub const PLACEHOLDER_LINE: &str = "...";

/// Canned environmental message for any failure.
pub const FALLBACK_ENVIRONMENT_MESSAGE: &str = "The walls whisper secrets best left forgotten...";

pub struct DialogueService {
    client: Weak<ApiClient>,
    dialog_options: ChatOptions,
    environment_options: ChatOptions,
    personalities: DashMap<NpcId, NpcPersonality>,
    history: Arc<DashMap<NpcId, Vec<String>>>,
}

impl DialogueService {
    pub fn new(
        client: Weak<ApiClient>,
        dialog_options: ChatOptions,
        environment_options: ChatOptions,
    ) -> Self {
        Self {
            client,
            dialog_options,
            environment_options,
            personalities: DashMap::new(),
            history: Arc::new(DashMap::new()),
        }
    }

    // =========================================================================
    // Registry
    // =========================================================================

    /// Register or replace an NPC. The personality's id is set to `npc_id`.
    pub fn register_npc(&self, npc_id: NpcId, mut personality: NpcPersonality) {
        personality.id = npc_id.clone();
        tracing::debug!(npc_id = %npc_id, archetype = %personality.archetype, "NPC registered");
        self.personalities.insert(npc_id, personality);
    }

    pub fn is_registered(&self, npc_id: &NpcId) -> bool {
        self.personalities.contains_key(npc_id)
    }

    pub fn personality(&self, npc_id: &NpcId) -> Option<NpcPersonality> {
        self.personalities.get(npc_id).map(|p| p.clone())
    }

    /// Set a trait's intensity (clamped to 0..=1), adding the trait if new.
    ///
    /// Returns `false` for unregistered NPCs.
    pub fn update_trait(&self, npc_id: &NpcId, trait_name: &str, intensity: f32) -> bool {
        match self.personalities.get_mut(npc_id) {
            Some(mut personality) => {
                personality.upsert_trait(trait_name, intensity);
                true
            }
            None => false,
        }
    }

    /// Shift mood from a player action. Returns `true` if the mood changed.
    pub fn update_mood(&self, npc_id: &NpcId, player_action: &str) -> bool {
        let Some(mut personality) = self.personalities.get_mut(npc_id) else {
            return false;
        };
        let changed = personality.react_to_action(player_action);
        if changed {
            tracing::debug!(npc_id = %npc_id, mood = %personality.current_mood, "NPC mood changed");
        }
        changed
    }

    pub fn build_prompt(
        personality: &NpcPersonality,
        context: &DialogContext,
        player_input: &str,
    ) -> String {
        dialog_prompt(personality, context, player_input)
    }

    /// Snapshot what the prompt needs. Reads only; mood is left to [`Self::update_mood`].
    fn prepare(
        &self,
        npc_id: &NpcId,
        mut context: DialogContext,
    ) -> Option<(NpcPersonality, DialogContext)> {
        let personality = self.personality(npc_id)?;
        if context.previous_lines.is_empty() {
            context.previous_lines = self.dialog_history(npc_id);
        }
        Some((personality, context))
    }

    // =========================================================================
    // Generation
    // =========================================================================

    /// Queue a dialogue line for a registered NPC.
    ///
    /// Fails immediately, without touching the network, when the NPC is not
    /// registered. The returned future resolves once the request is drained;
    /// a successful line is appended to the NPC's history first.
    pub fn generate_dialog(
        &self,
        npc_id: &NpcId,
        player_input: &str,
        context: DialogContext,
    ) -> Result<impl Future<Output = DialogueResult> + Send + 'static, DialogueError> {
        let (personality, context) = self
            .prepare(npc_id, context)
            .ok_or_else(|| DialogueError::NpcNotRegistered(npc_id.clone()))?;
        let client = self
            .client
            .upgrade()
            .ok_or(DialogueError::ClientUnavailable)?;

        let messages = [ChatMessage::user(dialog_prompt(&personality, &context, player_input))];
        let pending = client.chat_completion(&messages, &self.dialog_options);
        let history = Arc::clone(&self.history);
        let npc_id = npc_id.clone();

        Ok(async move {
            let response = pending.await;
            if !response.success {
                return Err(DialogueError::Transport(response.error_message().to_string()));
            }

            let line = extract_line(&response.body);
            history.entry(npc_id).or_default().push(line.clone());
            Ok(line)
        })
    }

    /// Generate a line without queuing. Unknown NPCs and failures give `...`.
    pub async fn generate_dialog_immediately(
        &self,
        npc_id: &NpcId,
        player_input: &str,
        context: DialogContext,
    ) -> String {
        let Some((personality, context)) = self.prepare(npc_id, context) else {
            return PLACEHOLDER_LINE.to_string();
        };
        let Some(client) = self.client.upgrade() else {
            return PLACEHOLDER_LINE.to_string();
        };

        let messages = [ChatMessage::user(dialog_prompt(&personality, &context, player_input))];
        let response = client
            .chat_completion_immediately(&messages, &self.dialog_options)
            .await;
        if !response.success {
            return PLACEHOLDER_LINE.to_string();
        }

        let line = extract_line(&response.body);
        self.history
            .entry(npc_id.clone())
            .or_default()
            .push(line.clone());
        line
    }

    /// Queue a short scrawled message for `location`.
    ///
    /// Always resolves to a usable line.
    pub fn generate_environmental_message(
        &self,
        location: &str,
    ) -> impl Future<Output = String> + Send + 'static {
        let messages = [ChatMessage::user(environmental_message_prompt(location))];
        let pending = self
            .client
            .upgrade()
            .map(|client| client.chat_completion(&messages, &self.environment_options));

        async move {
            let Some(pending) = pending else {
                return FALLBACK_ENVIRONMENT_MESSAGE.to_string();
            };
            let response = pending.await;
            if !response.success {
                return FALLBACK_ENVIRONMENT_MESSAGE.to_string();
            }
            json::chat_content(&response.body)
                .unwrap_or_else(|| FALLBACK_ENVIRONMENT_MESSAGE.to_string())
        }
    }

    // =========================================================================
    // Relationship and history
    // =========================================================================

    /// Adjust the NPC's score toward the player. Ignored for unknown NPCs.
    pub fn update_relationship(&self, npc_id: &NpcId, delta: i32) -> Option<i32> {
        let player = PlayerId::default_player();
        self.personalities
            .get_mut(npc_id)
            .map(|mut personality| personality.adjust_relationship(&player, delta))
    }

    /// 0 for unknown NPCs and for NPCs with no recorded score.
    pub fn relationship_score(&self, npc_id: &NpcId) -> i32 {
        self.personalities
            .get(npc_id)
            .map(|personality| personality.relationship(&PlayerId::default_player()))
            .unwrap_or(0)
    }

    pub fn dialog_history(&self, npc_id: &NpcId) -> Vec<String> {
        self.history
            .get(npc_id)
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    pub fn clear_dialog_history(&self, npc_id: &NpcId) {
        self.history.remove(npc_id);
    }
}

type DialogueResult = Result<String, DialogueError>;

fn extract_line(body: &str) -> String {
    json::chat_content(body).unwrap_or_else(|| PLACEHOLDER_LINE.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DialogueError {
    #[error("NPC not registered: {0}")]
    NpcNotRegistered(NpcId),
    #[error("Dialogue request failed: {0}")]
    Transport(String),
    #[error("API client is no longer available")]
    ClientUnavailable,
}
