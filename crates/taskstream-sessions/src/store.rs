use taskstream_core::MessageId;

use crate::types::{Message, MessageContent};

/// The ordered, in-memory message log of one session.
///
/// Append-only apart from growing a text message in place and removing an
/// unused stream placeholder. Which messages may still change is decided by
/// the owning controller.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    /// A log holding only the greeting.
    pub fn with_greeting(greeting: &str) -> Self {
        Self {
            messages: vec![Message::bot_text(greeting)],
        }
    }

    pub fn push(&mut self, message: Message) -> MessageId {
        let id = message.id;
        self.messages.push(message);
        id
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    /// Append `text` to a text message, returning its new full text.
    /// `None` if the message is missing or not a text message.
    pub fn append_text(&mut self, id: MessageId, text: &str) -> Option<String> {
        let msg = self.messages.iter_mut().rev().find(|m| m.id == id)?;
        match &mut msg.content {
            MessageContent::Text(body) => {
                body.push_str(text);
                Some(body.clone())
            }
            _ => None,
        }
    }

    pub fn remove(&mut self, id: MessageId) -> Option<Message> {
        let pos = self.messages.iter().position(|m| m.id == id)?;
        Some(self.messages.remove(pos))
    }

    /// Drop everything and start over with a single greeting.
    pub fn reset(&mut self, greeting: &str) {
        self.messages.clear();
        self.messages.push(Message::bot_text(greeting));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}
