//! Necronomicore engine library.
//!
//! Turns a chat-completion API into game content: item pools, NPC dialogue,
//! and roll flavor. All outbound requests go through one rate-limited FIFO
//! queue that the host drains from its frame loop.
//!
//! ## Structure
//!
//! - `infrastructure/` - Transport port, reqwest adapter, API client, settings
//! - `use_cases/` - Item, dialogue, and roll services
//! - `mapping` - Host mapping boundary
//! - `app` - Application composition

pub mod app;
pub mod infrastructure;
pub mod mapping;
pub mod prompt_templates;
pub mod use_cases;

pub use app::{App, AppError, AppEvent};
pub use infrastructure::settings::Settings;
