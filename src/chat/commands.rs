//! Quit-command recognition for the chat application.
//!
//! Commands are matched against the whole input line, case-sensitively.
//! Anything that is not exactly a command is a message for the model, even
//! if it starts with `/`.

/// Input line that saves the transcript and exits.
pub const QUIT: &str = "/quit";

/// Input line that exits without saving.
pub const QUIT_WITHOUT_SAVING: &str = "/quit!";

/// A parsed chat command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatCommand {
    /// Save the transcript, then exit.
    Quit,

    /// Exit without saving.
    QuitWithoutSaving,
}

impl ChatCommand {
    /// Returns true if this command persists the transcript.
    pub fn saves(&self) -> bool {
        matches!(self, ChatCommand::Quit)
    }
}

/// Parses a line of user input for a command.
///
/// Returns `Some(ChatCommand)` if the line is exactly a command, or `None` if
/// it should be sent as a message.
///
/// # Examples
///
/// ```
/// # use parley::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
/// assert_eq!(parse_command("/quit!"), Some(ChatCommand::QuitWithoutSaving));
/// assert_eq!(parse_command("/QUIT"), None);
/// ```
pub fn parse_command(line: &str) -> Option<ChatCommand> {
    match line {
        QUIT => Some(ChatCommand::Quit),
        QUIT_WITHOUT_SAVING => Some(ChatCommand::QuitWithoutSaving),
        _ => None,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Commands:
  /quit     save conversation and exit
  /quit!    exit without saving"#
}
