//! The conversation model and its loader.
//!
//! A [`Conversation`] is an append-only, chronologically ordered list of
//! [`Turn`]s.  The loader builds one from the seed file, resolving system
//! prompts that live in separate files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::types::{RawInputRecord, Role, Turn};

/// Ordered turn history exchanged with the remote endpoint.
///
/// Insertion order is chronological order, request order, and transcript
/// order.  Turns are only ever appended.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

/// Number of turns per role.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RoleCounts {
    /// System turns.
    pub system: usize,
    /// User turns.
    pub user: usize,
    /// Assistant turns.
    pub assistant: usize,
}

impl Conversation {
    /// Creates an empty conversation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a conversation from turns already in chronological order.
    pub fn from_turns(turns: Vec<Turn>) -> Self {
        Self { turns }
    }

    /// Appends a turn.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Returns the turns in order.
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Returns the most recent turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Returns the role of the most recent turn, if any.
    pub fn last_role(&self) -> Option<Role> {
        self.last().map(|turn| turn.role)
    }

    /// Returns the number of turns.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Returns true if there are no turns.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Counts the turns of each role.
    pub fn role_counts(&self) -> RoleCounts {
        let mut counts = RoleCounts::default();
        for turn in &self.turns {
            match turn.role {
                Role::System => counts.system += 1,
                Role::User => counts.user += 1,
                Role::Assistant => counts.assistant += 1,
            }
        }
        counts
    }

    /// Consumes the conversation, returning its turns.
    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }
}

/// Decodes the seed file contents into raw records.
///
/// The document must be a JSON array whose elements are all objects of the
/// record shape.  An empty array is valid.
pub fn parse_records(json: &str) -> Result<Vec<RawInputRecord>> {
    let value: Value = serde_json::from_str(json)
        .map_err(|e| Error::invalid_input(format!("invalid JSON: {e}"), Some(Box::new(e))))?;
    let Value::Array(elements) = value else {
        return Err(Error::invalid_input(
            "expected a JSON array of messages",
            None,
        ));
    };

    let mut records = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        if !element.is_object() {
            return Err(Error::invalid_input(
                format!("message {index} is not an object"),
                None,
            ));
        }
        let record = serde_json::from_value(element).map_err(|e| {
            Error::invalid_input(format!("message {index}: {e}"), Some(Box::new(e)))
        })?;
        records.push(record);
    }
    Ok(records)
}

/// Turns raw records into a conversation of the same length and order.
///
/// A system record with a file reference takes its content from
/// `prompts_dir/file`; any failure to read that file is fatal.
pub fn load_records(
    records: Vec<RawInputRecord>,
    prompts_dir: impl AsRef<Path>,
) -> Result<Conversation> {
    let prompts_dir = prompts_dir.as_ref();
    let mut turns = Vec::with_capacity(records.len());
    for record in records {
        if record.role != Role::System && record.file.as_deref().is_some_and(|f| !f.is_empty()) {
            warn!(role = %record.role, "ignoring prompt file on non-system message");
        }
        let prompt_path = record.prompt_file().map(|file| prompts_dir.join(file));
        let mut turn = record.into_turn();
        if let Some(path) = prompt_path {
            turn.content = fs::read_to_string(&path).map_err(|e| Error::prompt_file(&path, e))?;
            debug!(path = %path.display(), bytes = turn.content.len(), "loaded system prompt");
        }
        turns.push(turn);
    }
    Ok(Conversation::from_turns(turns))
}

/// Reads the seed file at `path` and loads it into a conversation.
pub fn load_conversation_file(
    path: impl AsRef<Path>,
    prompts_dir: impl AsRef<Path>,
) -> Result<Conversation> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("failed to read input file {}", path.display()), e))?;
    let records = parse_records(&json)?;
    let conversation = load_records(records, prompts_dir)?;
    debug!(
        path = %path.display(),
        turns = conversation.len(),
        "loaded conversation"
    );
    Ok(conversation)
}
