use std::io::Write;

use color_print::cformat;
use crossterm::QueueableCommand;
use crossterm::cursor::MoveToColumn;
use crossterm::terminal::{Clear, ClearType};
use eyre::Result;

use super::conversation_state::ConversationState;
use super::message::{Message, Role};

const TIME_FORMAT: &str = "%H:%M:%S";
const TYPING_INDICATOR: &str = "assistant is typing ...";

/// Writes transcript entries to the terminal.
///
/// With `color` off the output is plain text and the typing indicator is
/// finished with a newline instead of being erased in place.
#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn render_message(&self, out: &mut dyn Write, message: &Message) -> Result<()> {
        let time = message.timestamp().format(TIME_FORMAT).to_string();
        let line = match (self.color, message.role()) {
            (false, role) => format!("[{}] {} › {}", time, role, message.content()),
            (true, Role::User) => cformat!(
                "<dim>[{}]</> <green><bold>{}</></> › {}",
                time,
                Role::User,
                message.content()
            ),
            (true, Role::Assistant) => cformat!(
                "<dim>[{}]</> <cyan><bold>{}</></> › {}",
                time,
                Role::Assistant,
                message.content()
            ),
        };
        writeln!(out, "{}", line)?;
        Ok(())
    }

    /// Renders every message in order, then the typing indicator if a request
    /// is outstanding.
    pub fn render_transcript(
        &self,
        out: &mut dyn Write,
        conversation: &ConversationState,
        in_flight: bool,
    ) -> Result<()> {
        for message in conversation.get_messages() {
            self.render_message(out, message)?;
        }
        if in_flight {
            self.render_typing_indicator(out)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn render_typing_indicator(&self, out: &mut dyn Write) -> Result<()> {
        if self.color {
            write!(out, "{}", cformat!("<dim><italic>{}</></>", TYPING_INDICATOR))?;
        } else {
            write!(out, "{}", TYPING_INDICATOR)?;
        }
        out.flush()?;
        Ok(())
    }

    pub fn clear_typing_indicator(&self, out: &mut dyn Write) -> Result<()> {
        if self.color {
            out.queue(MoveToColumn(0))?
                .queue(Clear(ClearType::CurrentLine))?;
        } else {
            writeln!(out)?;
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(in_flight: bool, conversation: &ConversationState) -> String {
        let mut out = Vec::new();
        Renderer::new(false)
            .render_transcript(&mut out, conversation, in_flight)
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn renders_messages_in_order_with_roles() {
        let mut conversation = ConversationState::new();
        conversation.add_user_message("Do wasps make honey?");
        conversation.add_assistant_message("Some species do.");

        let text = render(false, &conversation);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].contains("assistant › Hello! InsectoPedia here"));
        assert!(lines[1].ends_with("user › Do wasps make honey?"));
        assert!(lines[2].ends_with("assistant › Some species do."));
        assert!(!text.contains(TYPING_INDICATOR));
    }

    #[test]
    fn lines_carry_a_timestamp() {
        let conversation = ConversationState::new();
        let expected = conversation.get_messages()[0]
            .timestamp()
            .format(TIME_FORMAT)
            .to_string();

        let text = render(false, &conversation);
        assert!(text.starts_with(&format!("[{}] ", expected)));
    }

    #[test]
    fn typing_indicator_follows_last_message_while_in_flight() {
        let mut conversation = ConversationState::new();
        conversation.add_user_message("Are spiders insects?");

        let text = render(true, &conversation);

        assert!(text.ends_with(TYPING_INDICATOR));
        assert_eq!(conversation.len(), 2);
    }

    #[test]
    fn plain_clear_ends_the_indicator_line() {
        let renderer = Renderer::new(false);
        let mut out = Vec::new();
        renderer.render_typing_indicator(&mut out).unwrap();
        renderer.clear_typing_indicator(&mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", TYPING_INDICATOR));
    }
}
