use serde::{Deserialize, Serialize};

/// `{ "data": [...], "total": n }` envelope of paginated listings.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    #[serde(default)]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartSession {
    pub session_id: String,
    pub name: String,
    pub data_context: String,
}

/// What a session copy carries over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyOptions {
    pub include_memory: bool,
    pub include_files: bool,
    pub include_form: bool,
    pub include_clarifications: bool,
    pub include_metadata: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            include_memory: false,
            include_files: false,
            include_form: true,
            include_clarifications: true,
            include_metadata: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CopiedSession {
    pub new_session_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub checkpoint_id: String,
    pub label: String,
    pub created_at: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// An output file produced by a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    /// Unix seconds.
    #[serde(default)]
    pub modified: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FileListing {
    #[serde(default)]
    pub files: Vec<FileMeta>,
}

/// A download link for one output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedFile {
    pub id: i64,
    #[serde(default)]
    pub description: String,
    pub share_token: String,
    pub file_name: String,
    pub created_at: String,
    pub expires_at: String,
    pub is_active: bool,
    #[serde(default)]
    pub download_count: u64,
    #[serde(default)]
    pub full_share_url: String,
    #[serde(default)]
    pub is_expired: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewShareLink {
    pub description: String,
    pub expires_in_days: u32,
    /// `"reuse"` returns an existing live link for the same file.
    pub strategy: String,
}

impl NewShareLink {
    pub fn new(description: impl Into<String>, expires_in_days: u32) -> Self {
        Self {
            description: description.into(),
            expires_in_days,
            strategy: "reuse".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShareLinkUpdate {
    pub description: String,
    pub expires_in_days: u32,
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShareToken {
    pub share_token: String,
}

/// Metadata of a publicly shared session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedSessionInfo {
    pub share_token: String,
    pub label: String,
    pub kind: String,
    pub expires_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorBootstrap {
    pub visitor_id: String,
    pub first_visit: bool,
    pub kind: String,
    pub label: String,
    pub expires_at: String,
}

/// A file to upload into a session.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }
}

/// Questions the backend asks about one field of the uploaded data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionBlock {
    pub field: String,
    #[serde(default)]
    pub source: String,
    pub questions: Vec<String>,
    /// Filled in by the caller, index-aligned with `questions`.
    #[serde(default)]
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ClarificationForm {
    #[serde(default)]
    pub questions: Vec<QuestionBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct FormEnvelope {
    #[serde(default)]
    pub form: Option<ClarificationForm>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ClarificationStatus {
    #[serde(default)]
    pub submitted: bool,
}

/// One generated goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Kpi {
    pub kpi_name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GoalTasks {
    #[serde(default)]
    pub complex_kpis: Vec<Kpi>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GeneratedGoals {
    #[serde(default)]
    pub tasks: Option<GoalTasks>,
}
