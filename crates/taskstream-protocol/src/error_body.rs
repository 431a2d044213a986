//! Human-readable message extraction from non-success JSON bodies.
//!
//! The backend answers failures with `{"detail": "..."}` (sometimes a list of
//! validation errors, each with a `msg`) or `{"message": "..."}`.

use serde_json::Value;

/// Pull the human-readable message out of an error body. `None` when the
/// body is not JSON or carries no usable `detail`/`message` field.
pub fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body.trim()).ok()?;
    let obj = value.as_object()?;
    obj.get("detail")
        .and_then(render_detail)
        .or_else(|| obj.get("message").and_then(non_empty_str))
}

fn render_detail(detail: &Value) -> Option<String> {
    match detail {
        Value::String(_) => non_empty_str(detail),
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .filter(|m| !m.trim().is_empty())
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        Value::Object(_) => detail.get("message").and_then(non_empty_str),
        _ => None,
    }
}

fn non_empty_str(v: &Value) -> Option<String> {
    v.as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
}
