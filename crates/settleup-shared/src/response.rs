//! The response envelope every Settle Up endpoint answers with.

use serde::{Deserialize, Deserializer, Serialize};

/// Standard API response wrapper.
///
/// Successful calls carry `data`; failed calls carry `message` and, for
/// validation failures, a list of field-targeted `errors`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
    #[serde(
        default,
        deserialize_with = "lenient_errors",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub errors: Vec<ApiFieldError>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            errors: Vec::new(),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            data: None,
            errors: Vec::new(),
            timestamp: Some(chrono::Utc::now().to_rfc3339()),
        }
    }

    pub fn with_error(mut self, error: ApiFieldError) -> Self {
        self.errors.push(error);
        self
    }
}

/// One element of an error path, e.g. `["members", 0, "email"]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Key(String),
    Index(u64),
}

/// A server-side error, optionally targeting a request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFieldError {
    #[serde(default)]
    pub path: Vec<PathSegment>,
    pub message: String,
}

impl ApiFieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: vec![PathSegment::Key(field.into())],
            message: message.into(),
        }
    }

    /// An error that does not point at any field.
    pub fn general(message: impl Into<String>) -> Self {
        Self {
            path: Vec::new(),
            message: message.into(),
        }
    }

    /// Name of the top-level field this error targets, if any.
    pub fn field(&self) -> Option<&str> {
        match self.path.first()? {
            PathSegment::Key(key) => Some(key.as_str()),
            PathSegment::Index(_) => None,
        }
    }
}

/// Servers are not consistent about the shape of `errors`: entries may be full
/// objects, objects without a path, bare strings, or garbage. Keep whatever
/// carries a message and drop the rest.
fn lenient_errors<'de, D>(deserializer: D) -> Result<Vec<ApiFieldError>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?.unwrap_or_default();

    Ok(raw
        .into_iter()
        .filter_map(|value| match value {
            serde_json::Value::String(message) => Some(ApiFieldError::general(message)),
            serde_json::Value::Object(ref map) => {
                serde_json::from_value::<ApiFieldError>(value.clone())
                    .ok()
                    .or_else(|| {
                        map.get("message")
                            .and_then(serde_json::Value::as_str)
                            .map(ApiFieldError::general)
                    })
            }
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_failure_with_field_errors() {
        let body = r#"{
            "success": false,
            "message": "Validation failed",
            "errors": [{"path": ["email"], "message": "Email already registered"}],
            "timestamp": "2024-01-01T00:00:00.000Z"
        }"#;

        let response: ApiResponse<serde_json::Value> = serde_json::from_str(body).unwrap();

        assert!(!response.success);
        assert_eq!(response.message.as_deref(), Some("Validation failed"));
        assert!(response.data.is_none());
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.errors[0].field(), Some("email"));
        assert_eq!(response.errors[0].message, "Email already registered");
    }

    #[test]
    fn test_decode_tolerates_odd_error_entries() {
        let body = r#"{
            "success": false,
            "errors": ["plain text", {"message": "no path"}, {"path": [0], "message": "indexed"}, 42]
        }"#;

        let response: ApiResponse<serde_json::Value> = serde_json::from_str(body).unwrap();

        assert!(response.message.is_none());
        assert!(response.timestamp.is_none());
        let messages: Vec<_> = response.errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["plain text", "no path", "indexed"]);
        assert!(response.errors.iter().all(|e| e.field().is_none()));
    }

    #[test]
    fn test_null_errors_decode_as_empty() {
        let body = r#"{"success": true, "data": 1, "errors": null}"#;
        let response: ApiResponse<u32> = serde_json::from_str(body).unwrap();
        assert_eq!(response.data, Some(1));
        assert!(response.errors.is_empty());
    }
}
