//! Error types for parley.
//!
//! Every error is classified into one of three severities: startup errors
//! abort the process before a session begins, turn-level errors are reported
//! and the remote call is retried, and persistence errors are reported
//! without blocking exit.

use std::error;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// How an error affects the running session.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorClass {
    /// Aborts the process before any session starts.
    StartupFatal,
    /// Reported inline; the conversation is unchanged and the call is retried.
    TurnLevelRecoverable,
    /// Reported; does not prevent exit.
    PersistenceWarning,
}

/// The main error type for parley.
#[derive(Clone, Debug)]
pub enum Error {
    /// The conversation seed is not a well-formed array of records.
    InvalidInputFormat {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// A system prompt file could not be opened or read.
    PromptFileUnavailable {
        /// Path of the prompt file.
        path: PathBuf,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// Required configuration is missing or invalid.
    Config {
        /// Human-readable error message.
        message: String,
        /// Flag or variable that caused the error.
        param: Option<String>,
    },

    /// I/O error.
    Io {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Arc<io::Error>,
    },

    /// The request never produced an HTTP response.
    Transport {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The endpoint answered with a status other than 200.
    Remote {
        /// HTTP status code.
        status_code: u16,
        /// Raw response body.
        body: String,
    },

    /// The response body did not have the expected shape.
    Decode {
        /// Human-readable error message.
        message: String,
        /// Raw response body.
        body: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// The transcript could not be written.
    LogPersist {
        /// Human-readable error message.
        message: String,
        /// Path that could not be created or written.
        path: PathBuf,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },

    /// Error during JSON serialization or deserialization.
    Serialization {
        /// Human-readable error message.
        message: String,
        /// The underlying error.
        source: Option<Arc<dyn error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Creates a new invalid input format error.
    pub fn invalid_input(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::InvalidInputFormat {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new prompt file error.
    pub fn prompt_file(path: impl AsRef<Path>, source: io::Error) -> Self {
        Error::PromptFileUnavailable {
            path: path.as_ref().to_path_buf(),
            source: Arc::new(source),
        }
    }

    /// Creates a new configuration error.
    pub fn config(message: impl Into<String>, param: Option<String>) -> Self {
        Error::Config {
            message: message.into(),
            param,
        }
    }

    /// Creates a new I/O error.
    pub fn io(message: impl Into<String>, source: io::Error) -> Self {
        Error::Io {
            message: message.into(),
            source: Arc::new(source),
        }
    }

    /// Creates a new transport error.
    pub fn transport(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Transport {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new remote status error.
    pub fn remote(status_code: u16, body: impl Into<String>) -> Self {
        Error::Remote {
            status_code,
            body: body.into(),
        }
    }

    /// Creates a new decode error.
    pub fn decode(
        message: impl Into<String>,
        body: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Decode {
            message: message.into(),
            body: body.into(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new transcript persistence error.
    pub fn log_persist(
        message: impl Into<String>,
        path: impl AsRef<Path>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::LogPersist {
            message: message.into(),
            path: path.as_ref().to_path_buf(),
            source: source.map(Arc::from),
        }
    }

    /// Creates a new serialization error.
    pub fn serialization(
        message: impl Into<String>,
        source: Option<Box<dyn error::Error + Send + Sync>>,
    ) -> Self {
        Error::Serialization {
            message: message.into(),
            source: source.map(Arc::from),
        }
    }

    /// Returns how this error affects the session.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Transport { .. } | Error::Remote { .. } | Error::Decode { .. } => {
                ErrorClass::TurnLevelRecoverable
            }
            Error::LogPersist { .. } => ErrorClass::PersistenceWarning,
            Error::InvalidInputFormat { .. }
            | Error::PromptFileUnavailable { .. }
            | Error::Config { .. }
            | Error::Io { .. }
            | Error::Serialization { .. } => ErrorClass::StartupFatal,
        }
    }

    /// Returns true if the remote call that produced this error may be retried.
    pub fn is_recoverable(&self) -> bool {
        self.class() == ErrorClass::TurnLevelRecoverable
    }

    /// Returns true if this error is a transport failure.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. })
    }

    /// Returns true if this error is a non-200 response.
    pub fn is_remote(&self) -> bool {
        matches!(self, Error::Remote { .. })
    }

    /// Returns true if this error is an undecodable response.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Decode { .. })
    }

    /// Returns true if this error is a configuration error.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config { .. })
    }

    /// Returns the status code associated with this error, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Remote { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Returns the raw response body retained by this error, if any.
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Error::Remote { body, .. } | Error::Decode { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidInputFormat { message, .. } => {
                write!(f, "Invalid input: {message}")
            }
            Error::PromptFileUnavailable { path, source } => {
                write!(f, "Prompt file {} unavailable: {source}", path.display())
            }
            Error::Config { message, param } => {
                if let Some(param) = param {
                    write!(f, "Configuration error: {message} (parameter: {param})")
                } else {
                    write!(f, "Configuration error: {message}")
                }
            }
            Error::Io { message, source } => {
                write!(f, "I/O error: {message}: {source}")
            }
            Error::Transport { message, .. } => {
                write!(f, "Transport error: {message}")
            }
            Error::Remote { status_code, body } => {
                write!(f, "API request failed with status {status_code}: {body}")
            }
            Error::Decode { message, .. } => {
                write!(f, "Decode error: {message}")
            }
            Error::LogPersist { message, path, .. } => {
                write!(f, "Could not persist transcript to {}: {message}", path.display())
            }
            Error::Serialization { message, .. } => {
                write!(f, "Serialization error: {message}")
            }
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::InvalidInputFormat { source, .. }
            | Error::Transport { source, .. }
            | Error::Decode { source, .. }
            | Error::LogPersist { source, .. }
            | Error::Serialization { source, .. } => source
                .as_ref()
                .map(|e| e.as_ref() as &(dyn error::Error + 'static)),
            Error::PromptFileUnavailable { source, .. } | Error::Io { source, .. } => Some(source),
            Error::Config { .. } | Error::Remote { .. } => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::io(err.to_string(), err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::serialization(format!("JSON error: {err}"), Some(Box::new(err)))
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::config(format!("invalid endpoint URL: {err}"), Some("url".to_string()))
    }
}

/// A specialized Result type for parley operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes() {
        assert_eq!(
            Error::transport("refused", None).class(),
            ErrorClass::TurnLevelRecoverable
        );
        assert_eq!(
            Error::remote(503, "busy").class(),
            ErrorClass::TurnLevelRecoverable
        );
        assert_eq!(
            Error::decode("bad json", "<html>", None).class(),
            ErrorClass::TurnLevelRecoverable
        );
        assert_eq!(
            Error::log_persist("read-only", "logs", None).class(),
            ErrorClass::PersistenceWarning
        );
        assert_eq!(
            Error::invalid_input("not an array", None).class(),
            ErrorClass::StartupFatal
        );
        assert_eq!(
            Error::prompt_file("prompts/x.txt", io::Error::from(io::ErrorKind::NotFound)).class(),
            ErrorClass::StartupFatal
        );
        assert_eq!(
            Error::config("missing model", Some("model".to_string())).class(),
            ErrorClass::StartupFatal
        );
    }

    #[test]
    fn remote_keeps_status_and_body() {
        let err = Error::remote(429, r#"{"error":"slow down"}"#);
        assert!(err.is_recoverable());
        assert!(err.is_remote());
        assert_eq!(err.status_code(), Some(429));
        assert_eq!(err.raw_body(), Some(r#"{"error":"slow down"}"#));
        assert_eq!(
            err.to_string(),
            r#"API request failed with status 429: {"error":"slow down"}"#
        );
    }

    #[test]
    fn decode_keeps_body() {
        let err = Error::decode("expected value", "not json", None);
        assert!(err.is_decode());
        assert_eq!(err.raw_body(), Some("not json"));
        assert_eq!(err.status_code(), None);
    }

    #[test]
    fn prompt_file_display_names_path() {
        let err = Error::prompt_file(
            Path::new("prompts").join("persona.txt"),
            io::Error::from(io::ErrorKind::NotFound),
        );
        assert!(err.to_string().contains("persona.txt"));
        assert!(error::Error::source(&err).is_some());
    }

    #[test]
    fn config_display_names_param() {
        let err = Error::config("missing LLM model", Some("model".to_string()));
        assert!(err.is_config());
        assert_eq!(
            err.to_string(),
            "Configuration error: missing LLM model (parameter: model)"
        );
    }
}
