//! Application state and composition.
//!
//! `App` is the surface the host game talks to. It owns the only strong
//! reference to the [`ApiClient`]; the services hold weak ones. Results of
//! asynchronous requests come back as [`AppEvent`]s on the channel returned
//! by [`App::new`].

use std::sync::Arc;
use std::time::Duration;

use necronomicore_domain::{DialogContext, NpcId, PoolId};
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::infrastructure::{
    api_client::{ApiClient, PendingResponse},
    ports::{RandomPort, Transport},
    random::SystemRandom,
    rate_limiter::RateLimiter,
    settings::Settings,
};
use crate::mapping;
use crate::use_cases::{DialogueService, ItemGenerationService, RollService};

/// Notifications delivered to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Items are in host mapping form.
    ItemPoolReady { pool_id: PoolId, items: Vec<Value> },
    DialogReady { npc_id: NpcId, text: String },
    RequestFailed(String),
}

/// Services built by [`App::initialize`].
pub struct Services {
    pub client: Arc<ApiClient>,
    pub items: Arc<ItemGenerationService>,
    pub dialogue: Arc<DialogueService>,
    pub rolls: Arc<RollService>,
}

pub struct App {
    settings: Settings,
    transport: Arc<dyn Transport>,
    random: Arc<dyn RandomPort>,
    events: mpsc::UnboundedSender<AppEvent>,
    services: Option<Services>,
}

impl App {
    pub fn new(
        settings: Settings,
        transport: Arc<dyn Transport>,
    ) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        Self::with_random(settings, transport, Arc::new(SystemRandom::new()))
    }

    pub fn with_random(
        settings: Settings,
        transport: Arc<dyn Transport>,
        random: Arc<dyn RandomPort>,
    ) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let app = Self {
            settings,
            transport,
            random,
            events,
            services: None,
        };
        (app, receiver)
    }

    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.settings.api_key = api_key.into();
        if let Some(services) = &self.services {
            services.client.set_api_key(self.settings.api_key.clone());
        }
    }

    pub fn api_key(&self) -> &str {
        &self.settings.api_key
    }

    pub fn is_initialized(&self) -> bool {
        self.services.is_some()
    }

    /// Build the client and services. Refuses to run without an API key.
    pub fn initialize(&mut self) -> Result<(), AppError> {
        if self.services.is_some() {
            tracing::info!("Already initialized");
            return Ok(());
        }
        if self.settings.api_key.is_empty() {
            tracing::error!("Cannot initialize without an API key");
            self.emit(AppEvent::RequestFailed("API key not set".to_string()));
            return Err(AppError::MissingApiKey);
        }

        self.transport.set_timeout(self.settings.timeout);
        let client = Arc::new(ApiClient::with_rate_limit(
            Arc::clone(&self.transport),
            self.settings.api_key.clone(),
            RateLimiter::new(self.settings.requests_per_window),
        ));
        client.set_base_url(&self.settings.base_url);

        let items = Arc::new(ItemGenerationService::new(
            Arc::downgrade(&client),
            Arc::clone(&self.random),
            self.settings.items.clone(),
        ));
        let dialogue = Arc::new(DialogueService::new(
            Arc::downgrade(&client),
            self.settings.dialogue.clone(),
            self.settings.environment.clone(),
        ));
        let rolls = Arc::new(RollService::new(Arc::clone(&self.random)));

        self.services = Some(Services {
            client,
            items,
            dialogue,
            rolls,
        });
        tracing::info!(base_url = %self.settings.base_url, "Initialized");
        Ok(())
    }

    pub fn services(&self) -> Option<&Services> {
        self.services.as_ref()
    }

    fn emit(&self, event: AppEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("Event receiver dropped");
        }
    }

    /// Runtime the host is calling from. Results are delivered by tasks on it.
    fn runtime(&self) -> Result<Handle, AppError> {
        Handle::try_current().map_err(|_| {
            tracing::error!("Request made outside a Tokio runtime");
            self.emit(AppEvent::RequestFailed(AppError::NoRuntime.to_string()));
            AppError::NoRuntime
        })
    }

    fn require_services(&self) -> Result<&Services, AppError> {
        match &self.services {
            Some(services) => Ok(services),
            None => {
                self.emit(AppEvent::RequestFailed(AppError::NotInitialized.to_string()));
                Err(AppError::NotInitialized)
            }
        }
    }

    /// Queue an item pool for a host run-config mapping.
    ///
    /// The outcome arrives as [`AppEvent::ItemPoolReady`] or
    /// [`AppEvent::RequestFailed`]. Fails with [`AppError::NoRuntime`] outside
    /// a Tokio runtime, before anything is queued.
    pub fn request_item_generation(&self, config: &Value) -> Result<(), AppError> {
        let services = self.require_services()?;
        let runtime = self.runtime()?;
        let config = mapping::run_config_from_mapping(config);
        let pending = services.items.generate_pool(&config);
        let items = Arc::clone(&services.items);
        let events = self.events.clone();

        runtime.spawn(async move {
            let event = match pending.await {
                Ok(pool_id) => {
                    let items = items
                        .all_items(&pool_id)
                        .iter()
                        .map(mapping::item_to_mapping)
                        .collect();
                    AppEvent::ItemPoolReady { pool_id, items }
                }
                Err(e) => AppEvent::RequestFailed(e.to_string()),
            };
            let _ = events.send(event);
        });
        Ok(())
    }

    /// Register `npc_name` from a personality mapping and queue one line.
    ///
    /// `context` describes what just happened. It updates the NPC's mood and
    /// is passed to the prompt as the recent action. Fails with
    /// [`AppError::NoRuntime`] outside a Tokio runtime, before the NPC is touched.
    pub fn request_emotion_dialog(
        &self,
        npc_name: &str,
        context: &str,
        personality: &Value,
    ) -> Result<(), AppError> {
        let services = self.require_services()?;
        let runtime = self.runtime()?;
        let npc_id = NpcId::new(npc_name);
        let mut personality = mapping::personality_from_mapping(personality);
        if personality.name.is_empty() {
            personality.name = npc_name.to_string();
        }
        services.dialogue.register_npc(npc_id.clone(), personality);
        services.dialogue.update_mood(&npc_id, context);

        let dialog_context = DialogContext::default().with_recent_action(context);
        let pending = match services.dialogue.generate_dialog(&npc_id, "", dialog_context) {
            Ok(pending) => pending,
            Err(e) => {
                self.emit(AppEvent::RequestFailed(e.to_string()));
                return Ok(());
            }
        };

        let events = self.events.clone();
        runtime.spawn(async move {
            let event = match pending.await {
                Ok(text) => AppEvent::DialogReady { npc_id, text },
                Err(e) => AppEvent::RequestFailed(e.to_string()),
            };
            let _ = events.send(event);
        });
        Ok(())
    }

    /// Queue one image with the configured model and size.
    pub fn request_image_generation(&self, prompt: &str) -> Result<PendingResponse, AppError> {
        let services = self.require_services()?;
        Ok(services.client.image_generation(
            prompt,
            &self.settings.image_model,
            &self.settings.image_size,
            1,
        ))
    }

    /// Returns 0 before initialization.
    pub fn generate_random_roll(&self, min: i32, max: i32, context: &str) -> i32 {
        match &self.services {
            Some(services) => services.rolls.roll_with_context(min, max, context).value,
            None => {
                tracing::error!("Roll requested before initialization");
                0
            }
        }
    }

    /// Advance the rate window by `elapsed`, then send at most one queued request.
    ///
    /// Returns whether a request was sent. Does nothing before initialization.
    pub async fn tick(&self, elapsed: Duration) -> bool {
        let Some(services) = &self.services else {
            return false;
        };
        services.client.tick(elapsed);
        services.client.drain_one().await
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("API key not set")]
    MissingApiKey,
    #[error("Necronomicore not initialized")]
    NotInitialized,
    #[error("No async runtime to deliver the result")]
    NoRuntime,
}
