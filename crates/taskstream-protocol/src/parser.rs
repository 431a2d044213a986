//! Incremental parser for the agent event stream.
//!
//! Chunks arrive at arbitrary boundaries. The parser appends each one to an
//! internal buffer, cuts out every complete `===EVENT: … ===END===` span, and
//! keeps a trailing partial event buffered until a later chunk terminates it.
//! Text that is not part of any event is handed back through [`take_raw`]
//! so the caller can show it verbatim.
//!
//! [`take_raw`]: EventStreamParser::take_raw

use tracing::debug;

use crate::blocks::{Block, ParsedBlock};
use crate::grammar::{EVENT_CLOSE, EVENT_OPEN, HEADER_FENCE, LABEL_FENCE};

#[derive(Debug)]
pub struct EventStreamParser {
    /// Not-yet-consumed text. When it holds an open event, it starts with
    /// `EVENT_OPEN`.
    buf: String,
    /// Byte offset in `buf` where the search for `EVENT_CLOSE` resumes, so a
    /// long event arriving in many small chunks is scanned only once.
    close_scan_from: usize,
    /// Raw text released since the last `take_raw`.
    raw: String,
    /// Set once the first event marker is seen.
    seen_event: bool,
    /// True while everything since the last event boundary is whitespace.
    /// Such whitespace is held back: it is framing if another event or the
    /// end of stream follows, content if raw text follows.
    at_boundary: bool,
}

impl EventStreamParser {
    pub fn new() -> Self {
        Self {
            buf: String::new(),
            close_scan_from: 0,
            raw: String::new(),
            seen_event: false,
            at_boundary: true,
        }
    }

    /// Feed one decoded chunk; return the events it completed, in the order
    /// their `===END===` markers appear.
    ///
    /// An empty result means either that an event is still open (its text
    /// stays buffered) or that the buffer holds no event marker at all, in
    /// which case the text is released as raw text.
    pub fn consume(&mut self, chunk: &str) -> Vec<ParsedBlock> {
        self.buf.push_str(chunk);
        let mut events = Vec::new();

        loop {
            let Some(start) = self.buf.find(EVENT_OPEN) else {
                self.release_raw();
                break;
            };
            self.seen_event = true;

            if start > 0 {
                let lead: String = self.buf.drain(..start).collect();
                if !(self.at_boundary && lead.trim().is_empty()) {
                    self.push_raw(&lead);
                }
                self.close_scan_from = 0;
            }

            let scan_from = self.close_scan_from.max(EVENT_OPEN.len());
            let Some(rel) = self.buf[scan_from..].find(EVENT_CLOSE) else {
                // Event still open. Resume just before the tail next time, in
                // case the close marker is split across chunks.
                let resume = self.buf.len().saturating_sub(EVENT_CLOSE.len() - 1);
                self.close_scan_from = floor_char_boundary(&self.buf, resume.max(scan_from));
                break;
            };

            let close = scan_from + rel;
            let mut end = close + EVENT_CLOSE.len();
            let rest = &self.buf[end..];
            if rest.starts_with("\r\n") {
                end += 2;
            } else if rest.starts_with('\n') {
                end += 1;
            }

            let event = decode_event(&self.buf[EVENT_OPEN.len()..close]);
            debug!(event = %event.event, blocks = event.blocks.len(), "parsed stream event");
            events.push(event);

            self.buf.drain(..end);
            self.close_scan_from = 0;
            self.at_boundary = true;
        }

        events
    }

    /// Raw text released since the previous call, if any.
    pub fn take_raw(&mut self) -> Option<String> {
        if self.raw.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.raw))
        }
    }

    /// End of stream: release everything still held (pending raw text and
    /// any unterminated event) as raw text, and reset the parser.
    pub fn finish(&mut self) -> Option<String> {
        let rest = std::mem::take(&mut self.buf);
        if !(self.seen_event && self.at_boundary && rest.trim().is_empty()) {
            self.push_raw(&rest);
        }
        self.close_scan_from = 0;
        self.seen_event = false;
        self.at_boundary = true;
        self.take_raw()
    }

    /// Text currently buffered and not yet emitted as an event or raw text.
    pub fn buffered(&self) -> &str {
        &self.buf
    }

    /// True while an event has been opened but not yet terminated.
    pub fn in_event(&self) -> bool {
        self.buf.starts_with(EVENT_OPEN)
    }

    /// No event marker in the buffer: release it as raw text, holding back a
    /// suffix that could still grow into `EVENT_OPEN` with the next chunk.
    fn release_raw(&mut self) {
        let keep = partial_marker_len(&self.buf);
        let split = self.buf.len() - keep;
        if split == 0 || (self.at_boundary && self.buf[..split].trim().is_empty()) {
            return;
        }
        let released: String = self.buf.drain(..split).collect();
        self.push_raw(&released);
    }

    fn push_raw(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.raw.push_str(text);
        self.at_boundary = false;
    }
}

impl Default for EventStreamParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Length of the longest suffix of `buf` that is a proper prefix of
/// `EVENT_OPEN`. The marker is ASCII, so the split point is a char boundary.
fn partial_marker_len(buf: &str) -> usize {
    let bytes = buf.as_bytes();
    let marker = EVENT_OPEN.as_bytes();
    (1..marker.len())
        .rev()
        .find(|&n| n <= bytes.len() && bytes[bytes.len() - n..] == marker[..n])
        .unwrap_or(0)
}

fn floor_char_boundary(s: &str, mut idx: usize) -> usize {
    idx = idx.min(s.len());
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Decode the text between `===EVENT:` and `===END===`.
fn decode_event(span: &str) -> ParsedBlock {
    let (header, body) = match span.find('\n') {
        Some(i) => (&span[..i], &span[i + 1..]),
        None => (span, ""),
    };
    let header = header.trim();
    let name = header.strip_suffix(HEADER_FENCE).unwrap_or(header).trim();

    let mut blocks = Vec::new();
    let mut preamble = String::new();
    let mut current: Option<(String, String)> = None;

    for line in body.split_inclusive('\n') {
        if let Some(label) = section_label(line) {
            match current.take() {
                Some((label, content)) => blocks.push(Block::new(label, strip_own_newline(&content))),
                None if !preamble.trim().is_empty() => {
                    blocks.push(Block::new("", strip_own_newline(&preamble)))
                }
                None => {}
            }
            current = Some((label.to_string(), String::new()));
        } else if let Some((_, content)) = current.as_mut() {
            content.push_str(line);
        } else {
            preamble.push_str(line);
        }
    }

    match current {
        Some((label, content)) => blocks.push(Block::new(label, strip_own_newline(&content))),
        None if !preamble.trim().is_empty() => {
            blocks.push(Block::new("", strip_own_newline(&preamble)))
        }
        None => {}
    }

    ParsedBlock::new(name, blocks)
}

/// `---<label>---` on a line of its own, with a non-empty label.
fn section_label(line: &str) -> Option<&str> {
    let line = line.trim_end_matches(['\n', '\r']);
    let inner = line.strip_prefix(LABEL_FENCE)?.strip_suffix(LABEL_FENCE)?;
    let label = inner.trim();
    if label.is_empty() {
        None
    } else {
        Some(label)
    }
}

fn strip_own_newline(content: &str) -> &str {
    let content = content.strip_suffix('\n').unwrap_or(content);
    content.strip_suffix('\r').unwrap_or(content)
}
