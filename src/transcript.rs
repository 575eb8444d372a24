//! Persisting finished conversations.
//!
//! Transcripts live at `<logs>/<model>/<timestamp>.log.json`, where the
//! model name is flattened into a single path segment, and contain the
//! conversation as an indented JSON array of `{role, content}` objects.

use std::fs;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use tracing::info;

use crate::conversation::Conversation;
use crate::error::{Error, Result};
use crate::observability::{TRANSCRIPT_SAVE_ERRORS, TRANSCRIPT_SAVES};
use crate::utils::time::transcript_stamp;

const TRANSCRIPT_SUFFIX: &str = ".log.json";

/// Writes conversations under a logs directory.
#[derive(Debug, Clone)]
pub struct TranscriptLogger {
    logs_dir: PathBuf,
}

impl TranscriptLogger {
    /// Creates a logger rooted at `logs_dir`.
    pub fn new(logs_dir: impl Into<PathBuf>) -> Self {
        Self {
            logs_dir: logs_dir.into(),
        }
    }

    /// Returns the logs directory.
    pub fn logs_dir(&self) -> &Path {
        &self.logs_dir
    }

    /// Saves `conversation` stamped with the current time.
    pub fn save(&self, conversation: &Conversation, model: &str) -> Result<PathBuf> {
        self.save_at(conversation, model, OffsetDateTime::now_utc())
    }

    /// Saves `conversation` stamped with `at`.
    pub fn save_at(
        &self,
        conversation: &Conversation,
        model: &str,
        at: OffsetDateTime,
    ) -> Result<PathBuf> {
        let result = self.write(conversation, model, at);
        match &result {
            Ok(path) => {
                TRANSCRIPT_SAVES.click();
                info!(path = %path.display(), turns = conversation.len(), "saved transcript");
            }
            Err(_) => TRANSCRIPT_SAVE_ERRORS.click(),
        }
        result
    }

    fn write(&self, conversation: &Conversation, model: &str, at: OffsetDateTime) -> Result<PathBuf> {
        let dir = self.logs_dir.join(model_dir_name(model));
        fs::create_dir_all(&dir).map_err(|e| {
            Error::log_persist("failed to create log directory", &dir, Some(Box::new(e)))
        })?;

        let path = dir.join(format!("{}{TRANSCRIPT_SUFFIX}", transcript_stamp(at)?));
        let contents = serde_json::to_string_pretty(conversation).map_err(|e| {
            Error::log_persist("failed to serialize conversation", &path, Some(Box::new(e)))
        })?;
        fs::write(&path, contents).map_err(|e| {
            Error::log_persist("failed to write transcript file", &path, Some(Box::new(e)))
        })?;
        Ok(path)
    }
}

/// Flattens a model name into a single path segment.
///
/// Separators become `_`, and names that would resolve to the current or
/// parent directory are replaced by `_` outright.
pub fn model_dir_name(model: &str) -> String {
    match model {
        "" | "." | ".." => "_".to_string(),
        _ => model.replace(['/', '\\'], "_"),
    }
}

/// Reads a transcript back into a conversation.
pub fn read_transcript(path: impl AsRef<Path>) -> Result<Conversation> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .map_err(|e| Error::io(format!("failed to read transcript {}", path.display()), e))?;
    Ok(serde_json::from_str(&contents)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorClass;
    use crate::types::Turn;
    use time::macros::datetime;

    fn sample() -> Conversation {
        Conversation::from_turns(vec![
            Turn::system("Be brief."),
            Turn::user("hello"),
            Turn::assistant("hi \"there\"\nsecond line"),
        ])
    }

    #[test]
    fn model_names_flattened() {
        assert_eq!(model_dir_name("meta-llama/Llama-3-8b"), "meta-llama_Llama-3-8b");
        assert_eq!(model_dir_name("a/b/c"), "a_b_c");
        assert_eq!(model_dir_name("win\\style"), "win_style");
        assert_eq!(model_dir_name("gpt-4o"), "gpt-4o");
    }

    #[test]
    fn dot_model_names_stay_inside_logs_dir() {
        assert_eq!(model_dir_name("."), "_");
        assert_eq!(model_dir_name(".."), "_");
        assert_eq!(model_dir_name("../.."), ".._..");
        assert_eq!(model_dir_name("v1.5"), "v1.5");

        let dir = tempfile::tempdir().unwrap();
        let logs = dir.path().join("logs");
        let path = TranscriptLogger::new(&logs)
            .save_at(&sample(), "..", datetime!(2026-10-16 09:30:05 UTC))
            .unwrap();
        assert_eq!(path.parent(), Some(logs.join("_").as_path()));
    }

    #[test]
    fn save_writes_expected_path() {
        let dir = tempfile::tempdir().unwrap();
        let logger = TranscriptLogger::new(dir.path());
        let path = logger
            .save_at(&sample(), "org/model", datetime!(2026-10-16 09:30:05 UTC))
            .unwrap();
        assert_eq!(
            path,
            dir.path()
                .join("org_model")
                .join("2026-10-16T09:30:05Z.log.json")
        );
        assert!(path.is_file());
    }

    #[test]
    fn transcript_is_indented_array() {
        let dir = tempfile::tempdir().unwrap();
        let logger = TranscriptLogger::new(dir.path());
        let conversation = Conversation::from_turns(vec![Turn::user("hello")]);
        let path = logger
            .save_at(&conversation, "m", datetime!(2026-10-16 09:30:05 UTC))
            .unwrap();
        let contents = fs::read_to_string(path).unwrap();
        assert_eq!(
            contents,
            "[\n  {\n    \"role\": \"user\",\n    \"content\": \"hello\"\n  }\n]"
        );
    }

    #[test]
    fn round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let logger = TranscriptLogger::new(dir.path());
        let path = logger.save(&sample(), "m").unwrap();
        assert_eq!(read_transcript(path).unwrap(), sample());
    }

    #[test]
    fn empty_conversation_saved_as_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let logger = TranscriptLogger::new(dir.path());
        let path = logger.save(&Conversation::new(), "m").unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "[]");
    }

    #[test]
    fn unwritable_logs_dir_is_persistence_warning() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("logs");
        fs::write(&blocker, "not a directory").unwrap();
        let logger = TranscriptLogger::new(&blocker);
        let err = logger.save(&sample(), "m").unwrap_err();
        assert!(matches!(err, Error::LogPersist { .. }));
        assert_eq!(err.class(), ErrorClass::PersistenceWarning);
    }
}
