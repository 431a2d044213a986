use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Header carrying an anonymous visitor identity on shared sessions.
pub const VISITOR_HEADER: &str = "X-Visitor-Id";

/// Backend conversation identifier (assigned by the server, opaque here).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Anonymous identifier used to access a publicly shared session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VisitorId(pub String);

impl VisitorId {
    /// Fresh random visitor id, for first contact with a share link.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VisitorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for VisitorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&String> for VisitorId {
    fn from(s: &String) -> Self {
        Self(s.clone())
    }
}

/// Identifier of one message in a session log (UUIDv7, so ids sort by creation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of one stream request. Never reused, so a stale stream can
/// always tell it is no longer the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(pub Uuid);

impl StreamId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StreamId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who the request is made on behalf of.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    /// Authenticated user: `Authorization: Bearer <token>`.
    Bearer(String),
    /// Anonymous visitor of a shared session: `X-Visitor-Id: <id>`.
    Visitor(VisitorId),
}

impl Credential {
    /// The single header (name, value) this credential adds to a request.
    pub fn header(&self) -> (&'static str, String) {
        match self {
            Credential::Bearer(token) => ("Authorization", format!("Bearer {token}")),
            Credential::Visitor(id) => (VISITOR_HEADER, id.to_string()),
        }
    }
}

// Tokens must never end up in logs.
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credential::Bearer(_) => f.write_str("Bearer(***)"),
            Credential::Visitor(id) => f.debug_tuple("Visitor").field(&id.0).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_header() {
        let (name, value) = Credential::Bearer("tok".into()).header();
        assert_eq!(name, "Authorization");
        assert_eq!(value, "Bearer tok");
    }

    #[test]
    fn visitor_header() {
        let (name, value) = Credential::Visitor("v-42".into()).header();
        assert_eq!(name, "X-Visitor-Id");
        assert_eq!(value, "v-42");
    }

    #[test]
    fn debug_redacts_token() {
        let rendered = format!("{:?}", Credential::Bearer("secret".into()));
        assert!(!rendered.contains("secret"));
    }
}
