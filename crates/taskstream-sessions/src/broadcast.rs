use tokio::sync::broadcast;

use taskstream_core::{MessageId, SessionId};

use crate::types::{Message, Phase};

/// Change notifications for hosts that render a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    MessageAppended {
        session: SessionId,
        message: Message,
    },
    /// A growing text message now reads `text` in full.
    MessageUpdated {
        session: SessionId,
        id: MessageId,
        text: String,
    },
    /// An unused stream placeholder was dropped.
    MessageRemoved { session: SessionId, id: MessageId },
    StateChanged { session: SessionId, phase: Phase },
    /// The log was cleared to the greeting for a newly opened session.
    SessionReset { session: SessionId },
}

/// Fan-out of [`ChatEvent`]s to every subscriber via a tokio broadcast channel.
pub struct ChatNotifier {
    tx: broadcast::Sender<ChatEvent>,
}

impl ChatNotifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.tx.subscribe()
    }

    /// Silently drops the event if nobody is listening.
    pub fn send(&self, event: ChatEvent) {
        let _ = self.tx.send(event);
    }
}
