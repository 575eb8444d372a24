// Public modules
pub mod chat;
pub mod client;
pub mod conversation;
pub mod error;
pub mod observability;
pub mod render;
pub mod transcript;
pub mod types;
pub mod utils;

// Re-exports
pub use client::{ChatBackend, ChatClient, Completion};
pub use conversation::{Conversation, RoleCounts, load_conversation_file};
pub use error::{Error, ErrorClass, Result};
pub use observability::register_biometrics;
pub use transcript::{TranscriptLogger, read_transcript};
pub use types::*;
