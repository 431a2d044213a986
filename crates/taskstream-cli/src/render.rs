use std::collections::HashMap;
use std::io::{self, Write};

use anyhow::bail;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{info, warn};

use taskstream_core::MessageId;
use taskstream_protocol::ParsedBlock;
use taskstream_sessions::{
    ChatController, ChatEvent, Message, MessageContent, Phase, Sender, StreamHandle,
};

/// Print the session's progress until the stream ends. Ctrl-C cancels.
///
/// `events` must be subscribed before the task was sent.
pub async fn follow(
    controller: &ChatController,
    handle: StreamHandle,
    mut events: broadcast::Receiver<ChatEvent>,
) -> anyhow::Result<()> {
    let mut printer = Printer::default();
    let mut stdout = io::stdout();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted, cancelling stream");
                controller.cancel_stream();
            }
            ev = events.recv() => match ev {
                Ok(ev) => {
                    if printer.event(&ev, &mut stdout)? == Some(Phase::Idle) {
                        break;
                    }
                }
                Err(RecvError::Lagged(n)) => warn!(skipped = n, "output fell behind"),
                Err(RecvError::Closed) => break,
            },
        }
    }
    handle.finished().await;
    writeln!(stdout)?;

    match controller.messages().last().filter(|m| m.is_error()) {
        Some(err) => bail!("task failed: {}", err.text().unwrap_or_default()),
        None => Ok(()),
    }
}

/// Renders chat events as plain text. Growing messages are printed as deltas.
#[derive(Default)]
struct Printer {
    printed: HashMap<MessageId, usize>,
}

impl Printer {
    /// Returns the new phase on state changes.
    fn event(&mut self, ev: &ChatEvent, out: &mut impl Write) -> io::Result<Option<Phase>> {
        match ev {
            ChatEvent::MessageAppended { message, .. } => self.message(message, out)?,
            ChatEvent::MessageUpdated { id, text, .. } => self.grow(*id, text, out)?,
            ChatEvent::StateChanged { phase, .. } => return Ok(Some(*phase)),
            ChatEvent::MessageRemoved { .. } | ChatEvent::SessionReset { .. } => {}
        }
        Ok(None)
    }

    fn message(&mut self, message: &Message, out: &mut impl Write) -> io::Result<()> {
        if message.sender == Sender::User {
            return Ok(());
        }
        match &message.content {
            MessageContent::Text(text) => self.grow(message.id, text, out),
            MessageContent::Event(event) => write_event(event, out),
            MessageContent::Error(text) => writeln!(out, "\n✗ {text}"),
        }
    }

    fn grow(&mut self, id: MessageId, full: &str, out: &mut impl Write) -> io::Result<()> {
        let seen = self.printed.entry(id).or_insert(0);
        if let Some(delta) = full.get(*seen..) {
            out.write_all(delta.as_bytes())?;
            out.flush()?;
        }
        *seen = full.len();
        Ok(())
    }
}

fn write_event(event: &ParsedBlock, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\n▸ {}", event.event)?;
    for block in &event.blocks {
        if !block.label.is_empty() {
            writeln!(out, "  {}:", block.label)?;
        }
        for line in block.content.lines() {
            writeln!(out, "    {line}")?;
        }
    }
    Ok(())
}
