//! Interactive chat application over a chat-completion endpoint.
//!
//! This module provides the turn-taking loop the `parley` binary runs.  A
//! session starts from a conversation loaded off disk, alternates between the
//! human and the remote model, and ends on a quit command, optionally writing
//! a timestamped transcript.
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: The turn-taking state machine and retry policy
//! - [`commands`]: Quit-command recognition
//! - [`input`]: Terminal and piped line sources

mod commands;
mod config;
mod input;
mod session;

pub use crate::render::{Banner, PlainTextRenderer, Renderer};
pub use commands::{ChatCommand, QUIT, QUIT_WITHOUT_SAVING, help_text, parse_command};
pub use config::{
    ChatArgs, DEFAULT_INPUT_DIR, DEFAULT_INPUT_FILE, DEFAULT_LOGS_DIR, DEFAULT_PROMPTS_DIR,
    DEFAULT_TEMPERATURE, DEFAULT_TIMEOUT_SECS, SessionConfig,
};
pub use input::{LineSource, ReaderInput, ReadlineInput};
pub use session::{
    ChatSession, PROMPT, RETRY_PROMPT, RetryPolicy, SessionOutcome, SessionState,
};
