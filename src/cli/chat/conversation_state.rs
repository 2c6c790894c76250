use chrono::Local;

use super::message::{Message, MessageIdGenerator, Role};

pub const GREETING_ID: &str = "1";
pub const GREETING_TEXT: &str =
    "Hello! InsectoPedia here Always ready to answer your insect-related questions.";

/// The session transcript, oldest message first.
///
/// Append-only: there is no way to remove or edit an entry once pushed.
pub struct ConversationState {
    messages: Vec<Message>,
    ids: MessageIdGenerator,
}

impl ConversationState {
    pub fn new() -> Self {
        Self {
            messages: vec![Message::new(GREETING_ID, Role::Assistant, GREETING_TEXT)],
            ids: MessageIdGenerator::new(),
        }
    }

    pub fn add_user_message(&mut self, message: &str) -> &Message {
        self.push(Role::User, message)
    }

    pub fn add_assistant_message(&mut self, message: &str) -> &Message {
        self.push(Role::Assistant, message)
    }

    pub fn get_messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    fn push(&mut self, role: Role, content: &str) -> &Message {
        let now = Local::now();
        let id = self.ids.next_id(now);
        self.messages.push(Message::with_timestamp(id, role, content, now));
        &self.messages[self.messages.len() - 1]
    }
}

impl Default for ConversationState {
    fn default() -> Self {
        Self::new()
    }
}
