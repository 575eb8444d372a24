//! Interactive chat with any chat-completion endpoint.
//!
//! Loads a seed conversation, then alternates between you and the model until
//! you type `/quit` (save a transcript and exit) or `/quit!` (exit without
//! saving).
//!
//! # Usage
//!
//! ```bash
//! # Credentials and endpoint from the environment or a .env file
//! export LLM_PROVIDER_KEY=sk-...
//! export LLM_MODEL=openai/gpt-4o-mini
//! export CHAT_COMPLETION_URL=https://openrouter.ai/api/v1/chat/completions
//! parley
//!
//! # Pick a different seed file and disable colors
//! parley --input review.json --no-color
//! ```
//!
//! Set `RUST_LOG=debug` for diagnostics on stderr.

use std::io::IsTerminal;
use std::process::ExitCode;
use std::sync::Arc;

use arrrg::CommandLine;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use parley::chat::{
    ChatArgs, ChatSession, LineSource, PlainTextRenderer, ReaderInput, ReadlineInput,
    SessionConfig,
};
use parley::{ChatClient, load_conversation_file};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = dotenv::dotenv() {
        warn!(error = %err, "no .env file loaded");
    }

    let (args, free) = ChatArgs::from_command_line_relaxed("parley [OPTIONS]");
    if !free.is_empty() {
        eprintln!("parley takes no positional arguments: {}", free.join(" "));
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("parley: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: ChatArgs) -> parley::Result<()> {
    let config = Arc::new(SessionConfig::from_args(args)?);
    info!(config = ?config, "starting session");

    let conversation = load_conversation_file(&config.input_file, &config.prompts_dir)?;
    let client = ChatClient::from_config(&config)?;
    let mut renderer = PlainTextRenderer::with_color(config.use_color);

    let stdin = std::io::stdin();
    let mut input: Box<dyn LineSource> = if stdin.is_terminal() {
        Box::new(ReadlineInput::new()?)
    } else {
        Box::new(ReaderInput::new(stdin.lock()).echo_prompts(true))
    };

    let mut session = ChatSession::new(client, config, conversation);
    let outcome = session.run(input.as_mut(), &mut renderer).await?;
    info!(
        turns = outcome.turns,
        saved = outcome.transcript.is_some(),
        "session finished"
    );
    Ok(())
}
