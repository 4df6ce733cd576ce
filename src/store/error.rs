use serde_json::Value;

use crate::api::ApiError;

/// Error value kept in a container after a rejected action.
///
/// Holds the backend's response body when there was one, otherwise the
/// transport error message as a plain string.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorPayload(pub Value);

impl ErrorPayload {
    pub fn message(message: impl Into<String>) -> Self {
        let mut map = serde_json::Map::new();
        map.insert("message".to_string(), Value::String(message.into()));
        ErrorPayload(Value::Object(map))
    }

    /// Normalize an API failure into a stored payload.
    pub fn from_api(err: &ApiError) -> Self {
        match err {
            ApiError::Status { body, .. } if !body.trim().is_empty() => {
                match serde_json::from_str::<Value>(body) {
                    Ok(value) if is_truthy(&value) => ErrorPayload(value),
                    Ok(_) => ErrorPayload(Value::String(err.to_string())),
                    Err(_) => ErrorPayload(Value::String(body.clone())),
                }
            }
            _ => ErrorPayload(Value::String(err.to_string())),
        }
    }

    /// Text to show for this error, falling back through `detail`, `message`,
    /// a bare string and field validation messages before `fallback`.
    pub fn describe(&self, fallback: &str) -> String {
        match &self.0 {
            Value::Object(map) => {
                for key in ["detail", "message"] {
                    if let Some(Value::String(s)) = map.get(key) {
                        if !s.is_empty() {
                            return s.clone();
                        }
                    }
                }
                let fields = field_messages(map);
                if fields.is_empty() {
                    fallback.to_string()
                } else {
                    fields.join("; ")
                }
            }
            Value::String(s) if !s.is_empty() => s.clone(),
            _ => fallback.to_string(),
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn field_messages(map: &serde_json::Map<String, Value>) -> Vec<String> {
    map.iter()
        .filter_map(|(field, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Array(items) => items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(" "),
                _ => return None,
            };
            if text.is_empty() {
                None
            } else {
                Some(format!("{}: {}", field, text))
            }
        })
        .collect()
}

/// Why an async action did not produce a value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Rejection {
    #[error("{}", .0.describe("An error occurred"))]
    Api(ErrorPayload),
    #[error("an identical request is already in progress")]
    Duplicate,
}
