use crossterm::{style::Stylize, tty::IsTty};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin, Stdout};

use crate::{
    error::{ErrorAction, ErrorKind, NutshellError},
    NutshellResult,
};

/// Request/response channel to the operator.
#[allow(async_fn_in_trait)]
pub trait Interaction {
    /// Whether an operator is available to answer prompts.
    fn is_interactive(&self) -> bool;

    /// Shows an informational line.
    async fn write(&mut self, message: &str) -> NutshellResult<()>;

    /// Asks a single question and blocks until it is answered.
    ///
    /// An empty answer selects `default`.
    async fn ask(&mut self, prompt: &str, default: &str) -> NutshellResult<String>;
}

/// Prompts on the process terminal.
pub struct TerminalInteraction {
    interactive: bool,
    reader: BufReader<Stdin>,
    writer: Stdout,
}

impl TerminalInteraction {
    /// Builds a terminal channel. It is only interactive when stdin is a TTY and `no_interaction` is unset.
    pub fn new(no_interaction: bool) -> Self {
        let interactive = !no_interaction && std::io::stdin().is_tty();

        tracing::info!(
            "Terminal interaction initialized. Interactive: {}",
            interactive
        );

        Self {
            interactive,
            reader: BufReader::new(io::stdin()),
            writer: io::stdout(),
        }
    }

    async fn print(&mut self, text: &str) -> NutshellResult<()> {
        self.writer.write_all(text.as_bytes()).await.map_err(|err| {
            NutshellError::raise_critical_interaction_error(
                ErrorKind::PromptWriteFailed,
                &err.to_string(),
                ErrorAction::Exit,
            )
        })?;

        self.writer.flush().await.map_err(|err| {
            NutshellError::raise_critical_interaction_error(
                ErrorKind::PromptWriteFailed,
                &err.to_string(),
                ErrorAction::Exit,
            )
        })
    }
}

impl Interaction for TerminalInteraction {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    async fn write(&mut self, message: &str) -> NutshellResult<()> {
        let line = format!("{}\n", message.yellow());

        self.print(&line).await
    }

    async fn ask(&mut self, prompt: &str, default: &str) -> NutshellResult<String> {
        let question = format!("{} ({}): ", prompt.green(), default.yellow());
        self.print(&question).await?;

        let mut answer = String::new();
        let read = self.reader.read_line(&mut answer).await.map_err(|err| {
            NutshellError::raise_critical_interaction_error(
                ErrorKind::PromptReadFailed,
                &err.to_string(),
                ErrorAction::Exit,
            )
        })?;

        if read == 0 {
            return Err(NutshellError::raise_critical_interaction_error(
                ErrorKind::PromptReadFailed,
                "Input was closed before the question was answered",
                ErrorAction::Exit,
            ));
        }

        Ok(answer_or_default(&answer, default))
    }
}

/// Trims the raw answer; a blank answer falls back to `default`.
pub fn answer_or_default(answer: &str, default: &str) -> String {
    let answer = answer.trim();

    if answer.is_empty() {
        default.to_string()
    } else {
        answer.to_string()
    }
}
