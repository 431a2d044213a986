//! `taskstream-core`: configuration, error taxonomy and identifier types
//! shared by every other taskstream crate.

pub mod config;
pub mod error;
pub mod types;

pub use config::TaskstreamConfig;
pub use error::{Result, TaskstreamError};
pub use types::{Credential, MessageId, SessionId, StreamId, VisitorId};
