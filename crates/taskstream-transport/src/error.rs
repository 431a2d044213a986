#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}): {}", .message.as_deref().unwrap_or("no detail"))]
    Api { status: u16, message: Option<String> },

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("stream cancelled")]
    Cancelled,
}

impl TransportError {
    /// The single line shown to the user when a stream fails. A message the
    /// backend put in its error body is passed through verbatim.
    pub fn user_message(&self) -> String {
        match self {
            TransportError::Api {
                message: Some(message),
                ..
            } => message.clone(),
            TransportError::Api { status, .. } => {
                format!("The server could not complete the request (HTTP {status}).")
            }
            TransportError::Connect(_) => "Could not connect to the server.".to_string(),
            TransportError::Http(e) if e.is_connect() => {
                "Could not connect to the server.".to_string()
            }
            TransportError::Http(e) if e.is_timeout() => "The server timed out.".to_string(),
            TransportError::Http(_) => "The connection to the server was interrupted.".to_string(),
            TransportError::Cancelled => "Request cancelled.".to_string(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, TransportError::Cancelled)
    }
}
