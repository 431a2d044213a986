use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Result, TaskstreamError};
use crate::types::{Credential, SessionId};

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/v1";
pub const DEFAULT_TASK_PATH: &str = "/session/run_task_v2/{session_id}";
pub const DEFAULT_REPORT_PATH: &str = "/session/run_report/{session_id}";
pub const DEFAULT_GREETING: &str = "👋 How can I help you today?";
pub const DEFAULT_LOG_ITER: u32 = 3;
pub const DEFAULT_EVENT_CAPACITY: usize = 256;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Placeholder substituted with the active session id in endpoint templates.
pub const SESSION_PLACEHOLDER: &str = "{session_id}";

/// Top-level config (taskstream.toml + TASKSTREAM_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskstreamConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Backend location and the streaming endpoint templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Streaming task endpoint, relative to `base_url`.
    #[serde(default = "default_task_path")]
    pub task_path: String,
    /// Streaming report endpoint, relative to `base_url`.
    #[serde(default = "default_report_path")]
    pub report_path: String,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            task_path: default_task_path(),
            report_path: default_report_path(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
        }
    }
}

impl ApiConfig {
    /// Absolute URL of the task endpoint for `session`.
    pub fn task_url(&self, session: &SessionId) -> String {
        self.render(&self.task_path, session)
    }

    /// Absolute URL of the report endpoint for `session`.
    pub fn report_url(&self, session: &SessionId) -> String {
        self.render(&self.report_path, session)
    }

    /// Join `path` onto the base URL without doubling the slash.
    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn render(&self, template: &str, session: &SessionId) -> String {
        self.url(&template.replace(SESSION_PLACEHOLDER, session.as_str()))
    }
}

/// Credentials sent with every request. `token` wins over `visitor_id`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthConfig {
    pub token: Option<String>,
    pub visitor_id: Option<String>,
}

impl AuthConfig {
    pub fn credential(&self) -> Option<Credential> {
        match (&self.token, &self.visitor_id) {
            (Some(token), _) if !token.is_empty() => Some(Credential::Bearer(token.clone())),
            (_, Some(visitor)) if !visitor.is_empty() => Some(Credential::Visitor(visitor.into())),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// First bot message of every freshly opened session.
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Forwarded verbatim as `log_iter` in the task payload.
    #[serde(default = "default_log_iter")]
    pub log_iter: u32,
    /// Capacity of the change-notification broadcast channel.
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            greeting: default_greeting(),
            log_iter: DEFAULT_LOG_ITER,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_task_path() -> String {
    DEFAULT_TASK_PATH.to_string()
}
fn default_report_path() -> String {
    DEFAULT_REPORT_PATH.to_string()
}
fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}
fn default_greeting() -> String {
    DEFAULT_GREETING.to_string()
}
fn default_log_iter() -> u32 {
    DEFAULT_LOG_ITER
}
fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl TaskstreamConfig {
    /// Load config from a TOML file with TASKSTREAM_* env var overrides.
    ///
    /// Checks in order:
    ///   1. Explicit path argument
    ///   2. ~/.taskstream/taskstream.toml
    ///
    /// A missing file is fine: every field has a default. Env keys nest with
    /// a double underscore, e.g. `TASKSTREAM_API__BASE_URL`.
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let path = config_path
            .map(String::from)
            .unwrap_or_else(default_config_path);

        Self::from_figment(
            Figment::new()
                .merge(Toml::file(&path))
                .merge(Env::prefixed("TASKSTREAM_").split("__")),
        )
    }

    /// Extract and validate a config from an already-assembled figment.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: TaskstreamConfig = figment
            .extract()
            .map_err(|e| TaskstreamError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        for (name, template) in [
            ("api.task_path", &self.api.task_path),
            ("api.report_path", &self.api.report_path),
        ] {
            if !template.contains(SESSION_PLACEHOLDER) {
                return Err(TaskstreamError::Endpoint(format!(
                    "{name} must contain {SESSION_PLACEHOLDER}: {template}"
                )));
            }
        }
        if self.chat.event_capacity == 0 {
            return Err(TaskstreamError::Config(
                "chat.event_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_config_path() -> String {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    format!("{}/.taskstream/taskstream.toml", home)
}
