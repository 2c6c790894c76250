pub mod conversation_state;
pub mod message;
pub mod notification;
pub mod prompt;
pub mod render;
pub mod session;

use std::io::Write;
use std::process::ExitCode;

use eyre::Result;
use prompt::generate_prompt;
use render::Renderer;
use rustyline::error::ReadlineError;
use session::{ChatSession, SubmitOutcome};
use tracing::{debug, info};

use crate::cli::chat::notification::Notifier;
use crate::query_client::QueryBackend;

const TITLE_TEXT: &str = "
InsectoPedia Chat
Ask any insect-related question.
";

const HELP_TEXT: &str = "
InsectoPedia Chat

/history      Show the whole conversation so far
/help         Show this help dialogue
/quit         Quit the application
";

/// Hosts a [`ChatSession`] on the terminal.
pub struct ChatContext<B, N> {
    output: Box<dyn Write>,
    input: Option<String>,
    interactive: bool,
    renderer: Renderer,
    session: ChatSession<B, N>,
}

impl<B: QueryBackend, N: Notifier> ChatContext<B, N> {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        interactive: bool,
        renderer: Renderer,
        session: ChatSession<B, N>,
    ) -> Self {
        Self {
            output,
            input,
            interactive,
            renderer,
            session,
        }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        self.print_welcome()?;

        // Non-interactive mode (single question)
        if let Some(input) = self.input.take() {
            self.session.set_input(input);
            let outcome = self.ask().await?;
            return Ok(if outcome == SubmitOutcome::Answered {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            });
        }

        if self.interactive {
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    fn print_welcome(&mut self) -> Result<()> {
        if self.interactive {
            writeln!(self.output, "{}", TITLE_TEXT)?;
        }
        self.renderer.render_transcript(
            self.output.as_mut(),
            self.session.conversation(),
            self.session.is_in_flight(),
        )
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        while self.session.input_enabled() {
            let prompt_text = generate_prompt(None);
            let readline = rl.readline(&prompt_text);

            match readline {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    if line.trim() == "/quit" {
                        break;
                    }

                    self.handle_input(&line).await?;
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        info!("Chat session ended after {} messages", self.session.conversation().len());
        Ok(())
    }

    async fn handle_input(&mut self, input: &str) -> Result<()> {
        match input.trim() {
            "/help" => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            "/history" => {
                self.renderer.render_transcript(
                    self.output.as_mut(),
                    self.session.conversation(),
                    self.session.is_in_flight(),
                )?;
            }
            _ => {
                self.session.set_input(input);
                if self.session.can_submit() {
                    self.ask().await?;
                } else {
                    debug!("Submit disabled for input {:?}", self.session.input());
                }
            }
        }

        Ok(())
    }

    /// Submits the pending input, showing the typing indicator until it
    /// resolves.
    ///
    /// Once the question is in the transcript the request always completes
    /// and the in-flight flag is always cleared; a failed write is reported
    /// only after that.
    async fn ask(&mut self) -> Result<SubmitOutcome> {
        let pending = match self.session.begin_submit() {
            Ok(pending) => pending,
            Err(reason) => {
                debug!("Submit rejected: {:?}", reason);
                return Ok(SubmitOutcome::Rejected(reason));
            }
        };

        let shown = self.show_pending();
        let result = self.session.resolve(&pending).await;
        let outcome = self.session.finish_submit(pending, result);
        shown?;

        self.renderer.clear_typing_indicator(self.output.as_mut())?;
        if outcome == SubmitOutcome::Answered {
            if let Some(message) = self.session.conversation().last() {
                self.renderer.render_message(self.output.as_mut(), message)?;
            }
        }
        self.output.flush()?;

        Ok(outcome)
    }

    fn show_pending(&mut self) -> Result<()> {
        if let Some(message) = self.session.conversation().last() {
            debug!("Question {} sent", message.id());
            self.renderer.render_message(self.output.as_mut(), message)?;
        }
        self.renderer.render_typing_indicator(self.output.as_mut())
    }
}
