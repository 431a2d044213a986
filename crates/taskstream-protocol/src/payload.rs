use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of a task run request.
/// Wire: `{ "task": "…", "log_iter": 3 }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPayload {
    pub task: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_iter: Option<u32>,
}

impl TaskPayload {
    pub fn new(task: impl Into<String>) -> Self {
        Self {
            task: task.into(),
            log_iter: None,
        }
    }

    pub fn with_log_iter(mut self, log_iter: u32) -> Self {
        self.log_iter = Some(log_iter);
        self
    }

    pub fn to_body(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Body of a report generation request.
/// Wire: `{ "report_specs": "…", "html_template": "…" }` (template optional)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub report_specs: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html_template: Option<String>,
}

impl ReportPayload {
    pub fn new(report_specs: impl Into<String>, html_template: Option<String>) -> Self {
        Self {
            report_specs: report_specs.into(),
            html_template,
        }
    }

    pub fn to_body(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}
