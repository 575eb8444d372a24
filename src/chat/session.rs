//! The turn-taking state machine.
//!
//! A [`ChatSession`] owns the conversation for the length of a run.  It
//! alternates between collecting a user turn and asking the backend for an
//! assistant turn until a quit command arrives, then optionally writes a
//! transcript.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::chat::commands::{ChatCommand, parse_command};
use crate::chat::config::SessionConfig;
use crate::chat::input::LineSource;
use crate::client::ChatBackend;
use crate::conversation::Conversation;
use crate::error::{Error, Result};
use crate::observability::{SESSION_RETRIES, SESSION_TURNS};
use crate::render::{Banner, Renderer};
use crate::transcript::TranscriptLogger;
use crate::types::{Role, Turn};

/// Prompt shown when waiting for a user turn.
pub const PROMPT: &str = ">> ";

/// Prompt shown when asking whether to keep retrying a failing endpoint.
pub const RETRY_PROMPT: &str = "?? Enter to retry, /quit to save and exit, /quit! to exit: ";

/// Where the session is in the turn cycle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the human to type a line.
    AwaitingUserTurn,

    /// Waiting for the backend to answer the current conversation.
    AwaitingRemoteReply,

    /// Finished; `save` says whether a transcript is written on the way out.
    Terminated {
        /// Whether to persist the conversation.
        save: bool,
    },
}

impl SessionState {
    /// Picks the starting state for a freshly loaded conversation.
    ///
    /// A trailing user turn is sent straight away; anything else waits for
    /// the human first.
    pub fn initial(conversation: &Conversation) -> Self {
        match conversation.last_role() {
            Some(Role::User) => SessionState::AwaitingRemoteReply,
            _ => SessionState::AwaitingUserTurn,
        }
    }

    /// Returns true once the session has ended.
    pub fn is_terminated(&self) -> bool {
        matches!(self, SessionState::Terminated { .. })
    }
}

impl From<ChatCommand> for SessionState {
    fn from(command: ChatCommand) -> Self {
        SessionState::Terminated {
            save: command.saves(),
        }
    }
}

/// How recoverable remote failures are retried.
///
/// Attempts are unlimited.  Delays double from `initial_delay` up to
/// `max_delay`.  Every `confirm_after` consecutive failures the human is
/// asked whether to keep going; zero never asks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Pause after the first failure.
    pub initial_delay: Duration,
    /// Upper bound on any pause.
    pub max_delay: Duration,
    /// Consecutive failures between confirmation prompts.
    pub confirm_after: u32,
}

impl RetryPolicy {
    /// Retry at once, forever, without asking.
    pub fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            confirm_after: 0,
        }
    }

    /// Sets the number of consecutive failures between confirmation prompts.
    pub fn with_confirm_after(mut self, failures: u32) -> Self {
        self.confirm_after = failures;
        self
    }

    /// Returns the pause before the next attempt after `failures` failures.
    pub fn delay_for(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(failures - 1).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Returns true if the human should confirm before the next attempt.
    pub fn needs_confirmation(&self, failures: u32) -> bool {
        self.confirm_after > 0 && failures > 0 && failures % self.confirm_after == 0
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(8),
            confirm_after: 5,
        }
    }
}

/// What happened when the session ended.
#[derive(Debug, Clone)]
pub struct SessionOutcome {
    /// Whether the human asked for the transcript to be saved.
    pub save_requested: bool,
    /// Where the transcript was written, if it was.
    pub transcript: Option<PathBuf>,
    /// Why the transcript could not be written, if it could not.
    pub persist_error: Option<Error>,
    /// Number of turns in the final conversation.
    pub turns: usize,
}

/// A chat session that owns the conversation and drives the turn cycle.
pub struct ChatSession<B: ChatBackend> {
    backend: B,
    config: Arc<SessionConfig>,
    conversation: Conversation,
    state: SessionState,
    retry: RetryPolicy,
    transcripts: TranscriptLogger,
    consecutive_failures: u32,
}

impl<B: ChatBackend> ChatSession<B> {
    /// Creates a session over a loaded conversation.
    pub fn new(backend: B, config: Arc<SessionConfig>, conversation: Conversation) -> Self {
        let state = SessionState::initial(&conversation);
        let transcripts = TranscriptLogger::new(&config.logs_dir);
        Self {
            backend,
            config,
            conversation,
            state,
            retry: RetryPolicy::default(),
            transcripts,
            consecutive_failures: 0,
        }
    }

    /// Sets the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Returns the current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns the conversation so far.
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Returns the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Returns the summary shown before the first prompt.
    pub fn banner(&self) -> Banner {
        Banner {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            counts: self.conversation.role_counts(),
        }
    }

    /// Runs the session until a quit command or the end of input.
    ///
    /// Turn-level failures never end the run; only input errors and
    /// unrecoverable backend errors are returned.
    pub async fn run(
        &mut self,
        input: &mut dyn LineSource,
        renderer: &mut dyn Renderer,
    ) -> Result<SessionOutcome> {
        renderer.print_banner(&self.banner());
        loop {
            if let SessionState::Terminated { save } = self.state {
                return Ok(self.finish(save, renderer));
            }
            self.step(input, renderer).await?;
        }
    }

    /// Performs one transition and returns the new state.
    pub async fn step(
        &mut self,
        input: &mut dyn LineSource,
        renderer: &mut dyn Renderer,
    ) -> Result<SessionState> {
        let next = match self.state {
            SessionState::AwaitingUserTurn => self.collect_user_turn(input, renderer)?,
            SessionState::AwaitingRemoteReply => self.request_reply(input, renderer).await?,
            terminated @ SessionState::Terminated { .. } => terminated,
        };
        if next != self.state {
            debug!(from = ?self.state, to = ?next, "session transition");
        }
        self.state = next;
        Ok(next)
    }

    fn collect_user_turn(
        &mut self,
        input: &mut dyn LineSource,
        renderer: &mut dyn Renderer,
    ) -> Result<SessionState> {
        let Some(line) = input.read_line(PROMPT)? else {
            renderer.print_info("End of input; exiting without saving.");
            return Ok(SessionState::Terminated { save: false });
        };
        if let Some(command) = parse_command(&line) {
            return Ok(command.into());
        }
        self.append(Turn::user(line));
        Ok(SessionState::AwaitingRemoteReply)
    }

    async fn request_reply(
        &mut self,
        input: &mut dyn LineSource,
        renderer: &mut dyn Renderer,
    ) -> Result<SessionState> {
        let result = self
            .backend
            .complete(
                self.conversation.turns(),
                &self.config.model,
                self.config.temperature,
            )
            .await;

        match result {
            Ok(completion) => {
                self.consecutive_failures = 0;
                match completion.reply {
                    Some(reply) => {
                        renderer.print_reply(&reply, &completion.usage);
                        self.append(reply);
                    }
                    None => renderer.print_empty_reply(&completion.raw_body),
                }
                Ok(SessionState::AwaitingUserTurn)
            }
            Err(err) if err.is_recoverable() => {
                self.consecutive_failures = self.consecutive_failures.saturating_add(1);
                SESSION_RETRIES.click();
                warn!(
                    error = %err,
                    failures = self.consecutive_failures,
                    "remote call failed"
                );
                renderer.print_error(&err.to_string());
                if err.is_decode()
                    && let Some(body) = err.raw_body()
                {
                    renderer.print_info(&format!("Raw response: {body}"));
                }

                if self.retry.needs_confirmation(self.consecutive_failures) {
                    return self.confirm_retry(input, renderer);
                }
                tokio::time::sleep(self.retry.delay_for(self.consecutive_failures)).await;
                Ok(SessionState::AwaitingRemoteReply)
            }
            Err(err) => Err(err),
        }
    }

    fn confirm_retry(
        &mut self,
        input: &mut dyn LineSource,
        renderer: &mut dyn Renderer,
    ) -> Result<SessionState> {
        renderer.print_info(&format!(
            "The endpoint has failed {} times in a row.",
            self.consecutive_failures
        ));
        let Some(line) = input.read_line(RETRY_PROMPT)? else {
            renderer.print_info("End of input; exiting without saving.");
            return Ok(SessionState::Terminated { save: false });
        };
        match parse_command(&line) {
            Some(command) => Ok(command.into()),
            None => Ok(SessionState::AwaitingRemoteReply),
        }
    }

    fn append(&mut self, turn: Turn) {
        SESSION_TURNS.click();
        self.conversation.push(turn);
    }

    fn finish(&mut self, save: bool, renderer: &mut dyn Renderer) -> SessionOutcome {
        let mut outcome = SessionOutcome {
            save_requested: save,
            transcript: None,
            persist_error: None,
            turns: self.conversation.len(),
        };
        if !save {
            return outcome;
        }
        match self.transcripts.save(&self.conversation, &self.config.model) {
            Ok(path) => {
                renderer.print_info(&format!("Conversation saved to {}", path.display()));
                outcome.transcript = Some(path);
            }
            Err(err) => {
                warn!(error = %err, "could not save conversation");
                renderer.print_error(&format!("Error saving conversation log: {err}"));
                outcome.persist_error = Some(err);
            }
        }
        outcome
    }
}
