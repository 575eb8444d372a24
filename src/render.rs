//! Output rendering for the chat session.
//!
//! This module provides the renderer trait the session writes through and a
//! plain-text implementation for terminals.

use std::io::{self, Stdout, Write};

use crate::chat::help_text;
use crate::conversation::RoleCounts;
use crate::types::{Turn, Usage};

/// ANSI escape code for dim text (used for token usage).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code for bold text (used for the model name).
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for replies).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

/// Session summary shown before the first prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    /// Model being chatted with.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Turns per role in the loaded conversation.
    pub counts: RoleCounts,
}

/// Trait for rendering session output.
pub trait Renderer: Send {
    /// Print the session summary.
    fn print_banner(&mut self, banner: &Banner);

    /// Print an assistant reply and the usage of the call that produced it.
    fn print_reply(&mut self, reply: &Turn, usage: &Usage);

    /// Print a response that carried no usable reply.
    fn print_empty_reply(&mut self, raw_body: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);
}

/// Plain text renderer with optional ANSI styling.
///
/// Conversation output goes to stdout; errors go to stderr.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
        }
    }

    fn style(&self, code: &'static str) -> &'static str {
        if self.use_color { code } else { "" }
    }

    fn reset(&self) -> &'static str {
        self.style(ANSI_RESET)
    }

    fn write(&mut self, text: &str) {
        let _ = self.stdout.write_all(text.as_bytes());
        let _ = self.stdout.flush();
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_banner(&mut self, banner: &Banner) {
        let text = format!(
            "\nChatting with {bold}{model}{reset}\n\
             Temperature: {temperature:.2}\n\
             Context messages: {system} system, {user} user, {assistant} assistant\n\n\
             {help}\n\n",
            bold = self.style(ANSI_BOLD),
            reset = self.reset(),
            model = banner.model,
            temperature = banner.temperature,
            system = banner.counts.system,
            user = banner.counts.user,
            assistant = banner.counts.assistant,
            help = help_text(),
        );
        self.write(&text);
    }

    fn print_reply(&mut self, reply: &Turn, usage: &Usage) {
        let text = format!(
            "{cyan}<< {content}{reset}\n\n{dim}[Input: {input} tokens, Output: {output} tokens]{reset}\n\n",
            cyan = self.style(ANSI_CYAN),
            dim = self.style(ANSI_DIM),
            reset = self.reset(),
            content = reply.content,
            input = usage.prompt_tokens,
            output = usage.completion_tokens,
        );
        self.write(&text);
    }

    fn print_empty_reply(&mut self, raw_body: &str) {
        self.print_error("No response from API");
        let text = format!("{raw_body}\n\n{}\n\n", help_text());
        self.write(&text);
    }

    fn print_error(&mut self, error: &str) {
        eprintln!(
            "{red}!! {error}{reset}",
            red = self.style(ANSI_RED),
            reset = self.reset()
        );
    }

    fn print_info(&mut self, info: &str) {
        self.write(&format!("{info}\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn styles_disabled_without_color() {
        let renderer = PlainTextRenderer::with_color(false);
        assert_eq!(renderer.style(ANSI_RED), "");
        assert_eq!(renderer.reset(), "");
    }

    #[test]
    fn styles_enabled_with_color() {
        let renderer = PlainTextRenderer::new();
        assert_eq!(renderer.style(ANSI_RED), ANSI_RED);
        assert_eq!(renderer.reset(), ANSI_RESET);
    }
}
