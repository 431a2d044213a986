use thiserror::Error;

/// Reasons a send is refused. Stream failures are never returned here; they
/// end up in the message log as an error message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// A stream is already in flight for this session.
    #[error("a task is already running in this session")]
    Busy,

    /// The task text was empty or whitespace only.
    #[error("task text is empty")]
    EmptyTask,

    /// Called from outside a Tokio runtime, so the stream task cannot be
    /// spawned.
    #[error("no async runtime to run the stream on")]
    NoRuntime,
}
