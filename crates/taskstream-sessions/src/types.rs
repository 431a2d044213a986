use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use taskstream_core::{MessageId, SessionId};
use taskstream_protocol::ParsedBlock;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// What a message carries.
///
/// Wire: `{"kind":"text","value":"..."}`, `{"kind":"event","value":{...}}`,
/// `{"kind":"error","value":"..."}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MessageContent {
    /// Plain text. The stream placeholder grows here.
    Text(String),
    /// One structured event decoded from the stream.
    Event(ParsedBlock),
    /// Bot-visible failure description.
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub sender: Sender,
    pub content: MessageContent,
    pub created_at: DateTime<Utc>,
}

impl Message {
    fn new(sender: Sender, content: MessageContent) -> Self {
        Self {
            id: MessageId::new(),
            sender,
            content,
            created_at: Utc::now(),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Sender::User, MessageContent::Text(text.into()))
    }

    pub fn bot_text(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, MessageContent::Text(text.into()))
    }

    pub fn bot_event(event: ParsedBlock) -> Self {
        Self::new(Sender::Bot, MessageContent::Event(event))
    }

    pub fn bot_error(text: impl Into<String>) -> Self {
        Self::new(Sender::Bot, MessageContent::Error(text.into()))
    }

    /// Text of a `Text` or `Error` message; `None` for structured events.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(t) | MessageContent::Error(t) => Some(t.as_str()),
            MessageContent::Event(_) => None,
        }
    }

    pub fn event(&self) -> Option<&ParsedBlock> {
        match &self.content {
            MessageContent::Event(ev) => Some(ev),
            _ => None,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.content, MessageContent::Error(_))
    }
}

/// Stream lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Streaming,
    Cancelling,
}

/// Point-in-time copy of a session, for hosts that poll instead of subscribe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub phase: Phase,
    pub messages: Vec<Message>,
}

impl SessionSnapshot {
    pub fn streaming(&self) -> bool {
        self.phase != Phase::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskstream_protocol::Block;

    #[test]
    fn content_wire_shape() {
        let msg = Message::bot_error("rate limited");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["sender"], "bot");
        assert_eq!(json["content"]["kind"], "error");
        assert_eq!(json["content"]["value"], "rate limited");
    }

    #[test]
    fn text_accessor() {
        assert_eq!(Message::user("hi").text(), Some("hi"));
        let ev = Message::bot_event(ParsedBlock::new("done", vec![Block::new("R", "x")]));
        assert_eq!(ev.text(), None);
        assert_eq!(ev.event().map(|e| e.event.as_str()), Some("done"));
    }
}
