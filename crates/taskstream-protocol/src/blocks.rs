use serde::{Deserialize, Serialize};

use crate::grammar::{EVENT_CLOSE, EVENT_OPEN, HEADER_FENCE, LABEL_FENCE};

/// A labeled segment of markdown inside an event (e.g. "Thought", "Results").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub label: String,
    /// Markdown body, without its own trailing newline.
    pub content: String,
}

impl Block {
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
        }
    }
}

/// One complete, named unit of agent progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedBlock {
    /// Event name, e.g. `"started"` or `"finished"`.
    pub event: String,
    pub blocks: Vec<Block>,
}

impl ParsedBlock {
    pub fn new(event: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            event: event.into(),
            blocks,
        }
    }

    /// Content of the first block carrying `label`, if any.
    pub fn block(&self, label: &str) -> Option<&str> {
        self.blocks
            .iter()
            .find(|b| b.label == label)
            .map(|b| b.content.as_str())
    }

    /// Render this event in wire form, terminated by `===END===\n`.
    pub fn to_wire(&self) -> String {
        let mut out = format!("{EVENT_OPEN}{}{HEADER_FENCE}\n", self.event);
        for block in &self.blocks {
            out.push_str(&format!("{LABEL_FENCE}{}{LABEL_FENCE}\n", block.label));
            out.push_str(&block.content);
            out.push('\n');
        }
        out.push_str(EVENT_CLOSE);
        out.push('\n');
        out
    }
}
