//! Use cases - content generation built on the queued API client.
//!
//! Each module owns one kind of content and its caches.

pub mod dialogue;
pub mod items;
pub mod rolls;

pub use dialogue::{DialogueError, DialogueService};
pub use items::{ItemGenerationError, ItemGenerationService, PoolMetadata};
pub use rolls::RollService;
