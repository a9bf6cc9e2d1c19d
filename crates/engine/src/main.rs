//! Necronomicore Engine - Demo host loop.
//!
//! Plays the part of a game host: initializes the engine, asks for an item
//! pool and one line of NPC dialogue, then ticks the queue at frame rate
//! until both answers arrive.

use std::sync::Arc;
use std::time::Duration;

use necronomicore_engine::infrastructure::transport::ReqwestTransport;
use necronomicore_engine::{App, AppEvent, Settings};
use serde_json::json;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const FRAME: Duration = Duration::from_millis(16);
const GIVE_UP_AFTER: Duration = Duration::from_secs(120);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_repo_root();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "necronomicore_engine=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Necronomicore Engine");

    let settings = Settings::from_env();
    let transport = Arc::new(ReqwestTransport::new(settings.timeout));
    let (mut app, mut events) = App::new(settings, transport);
    app.initialize()?;

    app.request_item_generation(&json!({
        "difficulty": 2,
        "floor": 3,
        "theme": "lovecraftian fungal dungeon",
    }))?;
    app.request_emotion_dialog(
        "Old Mossback",
        "the player stumbles into the spore cellar",
        &json!({
            "archetype": "fungal hermit",
            "sanity_level": 0.4,
            "traits": [{"name": "paranoid", "intensity": 0.8, "description": "trusts no one"}],
        }),
    )?;

    let roll = app.generate_random_roll(1, 20, "Perception");
    tracing::info!(roll, "Rolled perception");

    let mut outstanding = 2;
    let mut frame = tokio::time::interval(FRAME);
    let deadline = tokio::time::Instant::now() + GIVE_UP_AFTER;

    while outstanding > 0 && tokio::time::Instant::now() < deadline {
        tokio::select! {
            _ = frame.tick() => {
                app.tick(FRAME).await;
            }
            Some(event) = events.recv() => {
                outstanding -= 1;
                report(event);
            }
        }
    }

    if outstanding > 0 {
        tracing::warn!(outstanding, "Gave up waiting for responses");
    }
    Ok(())
}

fn report(event: AppEvent) {
    match event {
        AppEvent::ItemPoolReady { pool_id, items } => {
            tracing::info!(pool_id = %pool_id, count = items.len(), "Item pool ready");
            for item in &items {
                tracing::info!(
                    name = %item["name"],
                    rarity = %item["rarity"],
                    item_type = %item["type"],
                    "Item"
                );
            }
        }
        AppEvent::DialogReady { npc_id, text } => {
            tracing::info!(npc_id = %npc_id, "{text}");
        }
        AppEvent::RequestFailed(message) => {
            tracing::error!(error = %message, "Request failed");
        }
    }
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}
