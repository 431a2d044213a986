use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskstreamError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid endpoint template: {0}")]
    Endpoint(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TaskstreamError {
    /// Short, stable error code for logs and machine-readable output.
    pub fn code(&self) -> &'static str {
        match self {
            TaskstreamError::Config(_) => "CONFIG_ERROR",
            TaskstreamError::Endpoint(_) => "ENDPOINT_ERROR",
            TaskstreamError::Serialization(_) => "SERIALIZATION_ERROR",
            TaskstreamError::Io(_) => "IO_ERROR",
            TaskstreamError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, TaskstreamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(TaskstreamError::Config("x".into()).code(), "CONFIG_ERROR");
        assert_eq!(TaskstreamError::Internal("x".into()).code(), "INTERNAL_ERROR");
    }

    #[test]
    fn serde_errors_convert() {
        let err: TaskstreamError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert_eq!(err.code(), "SERIALIZATION_ERROR");
    }
}
