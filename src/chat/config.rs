//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and the resolved,
//! immutable [`SessionConfig`] that every other component reads.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use arrrg_derive::CommandLine;
use tracing::warn;
use url::Url;

use crate::error::{Error, Result};

/// Temperature used when none is configured or the configured one is unusable.
pub const DEFAULT_TEMPERATURE: f32 = 0.0;
/// Seed file name, relative to the input directory.
pub const DEFAULT_INPUT_FILE: &str = "messages.json";
/// Directory holding the seed file.
pub const DEFAULT_INPUT_DIR: &str = "input";
/// Directory holding system prompt files.
pub const DEFAULT_PROMPTS_DIR: &str = "prompts";
/// Directory transcripts are written under.
pub const DEFAULT_LOGS_DIR: &str = "logs";
/// Request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const ENV_API_KEY: &str = "LLM_PROVIDER_KEY";
const ENV_MODEL: &str = "LLM_MODEL";
const ENV_URL: &str = "CHAT_COMPLETION_URL";
const ENV_TEMPERATURE: &str = "TEMPERATURE";

/// Command-line arguments for the parley tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Bearer credential for the endpoint.
    #[arrrg(optional, "LLM provider API key (env: LLM_PROVIDER_KEY)", "KEY")]
    pub api_key: Option<String>,

    /// Model to request.
    #[arrrg(optional, "LLM model name (env: LLM_MODEL)", "MODEL")]
    pub model: Option<String>,

    /// Chat-completion endpoint.
    #[arrrg(optional, "Chat completion URL (env: CHAT_COMPLETION_URL)", "URL")]
    pub url: Option<String>,

    /// Sampling temperature, kept as text so a bad value can fall back.
    #[arrrg(optional, "Temperature for the LLM (env: TEMPERATURE)", "TEMP")]
    pub temperature: Option<String>,

    #[arrrg(optional, "Input messages file (default: messages.json)", "FILE")]
    pub input: Option<String>,

    #[arrrg(optional, "Directory for input files (default: input)", "DIR")]
    pub input_dir: Option<String>,

    #[arrrg(optional, "Directory for prompt files (default: prompts)", "DIR")]
    pub prompts_dir: Option<String>,

    #[arrrg(optional, "Directory for log files (default: logs)", "DIR")]
    pub logs_dir: Option<String>,

    #[arrrg(optional, "Request timeout in seconds (default: 60)", "SECONDS")]
    pub timeout: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Resolved configuration for one run.
///
/// Built once at startup and shared read-only with the loader, the client,
/// and the session.
#[derive(Clone, PartialEq)]
pub struct SessionConfig {
    /// Bearer credential.
    pub credential: String,
    /// Model name sent with every request.
    pub model: String,
    /// Chat-completion endpoint.
    pub endpoint_url: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Seed file to load.
    pub input_file: PathBuf,
    /// Directory holding system prompt files.
    pub prompts_dir: PathBuf,
    /// Directory transcripts are written under.
    pub logs_dir: PathBuf,
    /// Request timeout.
    pub timeout: Duration,
    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,
}

impl SessionConfig {
    /// Creates a configuration with default paths and temperature.
    pub fn new(
        credential: impl Into<String>,
        model: impl Into<String>,
        endpoint_url: impl Into<String>,
    ) -> Self {
        Self {
            credential: credential.into(),
            model: model.into(),
            endpoint_url: endpoint_url.into(),
            temperature: DEFAULT_TEMPERATURE,
            input_file: PathBuf::from(DEFAULT_INPUT_DIR).join(DEFAULT_INPUT_FILE),
            prompts_dir: PathBuf::from(DEFAULT_PROMPTS_DIR),
            logs_dir: PathBuf::from(DEFAULT_LOGS_DIR),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            use_color: true,
        }
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the seed file.
    pub fn with_input_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_file = path.into();
        self
    }

    /// Sets the prompts directory.
    pub fn with_prompts_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.prompts_dir = path.into();
        self
    }

    /// Sets the logs directory.
    pub fn with_logs_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.logs_dir = path.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Resolves arguments against the process environment.
    pub fn from_args(args: ChatArgs) -> Result<Self> {
        Self::resolve(args, |name| std::env::var(name).ok())
    }

    /// Resolves arguments, consulting `env` for values not given as flags.
    ///
    /// Flags take precedence over the environment.  Credential, model and
    /// URL are required.
    pub fn resolve<F>(args: ChatArgs, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |flag: Option<String>, var: &str| {
            flag.or_else(|| env(var)).filter(|value| !value.is_empty())
        };

        let credential = lookup(args.api_key, ENV_API_KEY).ok_or_else(|| {
            Error::config(
                format!("missing LLM provider API key; use --api-key or {ENV_API_KEY}"),
                Some("api-key".to_string()),
            )
        })?;
        let model = lookup(args.model, ENV_MODEL).ok_or_else(|| {
            Error::config(
                format!("missing LLM model; use --model or {ENV_MODEL}"),
                Some("model".to_string()),
            )
        })?;
        let endpoint_url = lookup(args.url, ENV_URL).ok_or_else(|| {
            Error::config(
                format!("missing chat completion URL; use --url or {ENV_URL}"),
                Some("url".to_string()),
            )
        })?;
        Url::parse(&endpoint_url)?;

        let temperature = match lookup(args.temperature, ENV_TEMPERATURE) {
            Some(raw) => parse_temperature(&raw).unwrap_or_else(|| {
                warn!(
                    value = %raw,
                    default = DEFAULT_TEMPERATURE,
                    "failed to parse temperature; using default"
                );
                DEFAULT_TEMPERATURE
            }),
            None => DEFAULT_TEMPERATURE,
        };

        let input_dir = PathBuf::from(args.input_dir.as_deref().unwrap_or(DEFAULT_INPUT_DIR));
        let input = args.input.as_deref().unwrap_or(DEFAULT_INPUT_FILE);

        Ok(Self {
            credential,
            model,
            endpoint_url,
            temperature,
            input_file: input_dir.join(input),
            prompts_dir: PathBuf::from(args.prompts_dir.as_deref().unwrap_or(DEFAULT_PROMPTS_DIR)),
            logs_dir: PathBuf::from(args.logs_dir.as_deref().unwrap_or(DEFAULT_LOGS_DIR)),
            timeout: Duration::from_secs(args.timeout.unwrap_or(DEFAULT_TIMEOUT_SECS)),
            use_color: !args.no_color,
        })
    }
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("credential", &"<redacted>")
            .field("model", &self.model)
            .field("endpoint_url", &self.endpoint_url)
            .field("temperature", &self.temperature)
            .field("input_file", &self.input_file)
            .field("prompts_dir", &self.prompts_dir)
            .field("logs_dir", &self.logs_dir)
            .field("timeout", &self.timeout)
            .field("use_color", &self.use_color)
            .finish()
    }
}

fn parse_temperature(raw: &str) -> Option<f32> {
    raw.trim()
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
}
