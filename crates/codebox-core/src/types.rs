//! Value types returned by session operations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque session identifier issued by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Wrap an identifier returned by the service.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Status reported by the service (`"started"`, `"stopped"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub status: String,
}

impl Status {
    pub fn new(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }

    pub(crate) fn started() -> Self {
        Self::new("started")
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.status)
    }
}

/// Result of executing code in the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Output {
    /// Output kind, e.g. `"text"`, `"error"` or `"image/png"`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Output payload.
    pub content: String,
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.content)
    }
}

/// A file in the session filesystem.
///
/// Listing only fills in `name`; `content` is populated by `download`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub name: String,
    pub content: Option<String>,
}

impl FileRef {
    /// A reference without content, as returned by listing.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: None,
        }
    }
}

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

// Wire shapes for responses that don't map directly onto a public type

#[derive(Debug, Deserialize)]
pub(crate) struct StartResponse {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListFilesResponse {
    pub files: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DownloadResponse {
    pub content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_impls() {
        assert_eq!(Status::new("running").to_string(), "running");
        assert_eq!(SessionId::new("abc-123").to_string(), "abc-123");
        assert_eq!(FileRef::named("a.py").to_string(), "a.py");
        let output = Output {
            kind: "text".into(),
            content: "1\n".into(),
        };
        assert_eq!(output.to_string(), "1\n");
    }

    #[test]
    fn test_output_uses_type_on_the_wire() {
        let output: Output =
            serde_json::from_value(json!({ "type": "text", "content": "hi" })).unwrap();
        assert_eq!(output.kind, "text");
        assert_eq!(serde_json::to_value(&output).unwrap()["type"], "text");
    }

    #[test]
    fn test_file_ref_serializes_null_content() {
        let value = serde_json::to_value(FileRef::named("a.py")).unwrap();
        assert_eq!(value, json!({ "name": "a.py", "content": null }));
    }
}
