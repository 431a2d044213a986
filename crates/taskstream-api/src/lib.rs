//! `taskstream-api`: request/response client for everything around the
//! task stream: sessions and their setup, checkpoints, output files, share
//! links and public shared sessions.

pub mod checkpoints;
pub mod client;
pub mod error;
pub mod files;
pub mod public;
pub mod sessions;
pub mod setup;
pub mod types;

pub use client::ApiClient;
pub use error::ApiError;
pub use setup::clarifications;
pub use types::*;
