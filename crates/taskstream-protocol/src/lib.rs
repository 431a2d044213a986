//! `taskstream-protocol`: everything both ends of the task stream agree on:
//! the event grammar, its incremental parser, request payloads and the
//! shape of error bodies.

pub mod blocks;
pub mod error_body;
pub mod grammar;
pub mod parser;
pub mod payload;

pub use blocks::{Block, ParsedBlock};
pub use error_body::extract_error_message;
pub use parser::EventStreamParser;
pub use payload::{ReportPayload, TaskPayload};
