use serde::Serialize;
use serde_json::{Map, Value};

/// Structured record committed to the log store.
///
/// Derived deterministically from a decoded payload: each known payload key
/// maps to exactly one field here, and everything else lands in
/// `extra_payload` without duplication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEntry {
    /// Severity string, copied from the payload's `level` key.
    pub severity: String,
    pub message: String,
    pub created_at: String,
    pub principal_email: Option<String>,
    pub source_location: SourceLocation,
    /// Payload keys not consumed by any of the fields above.
    pub extra_payload: Map<String, Value>,
}

/// Source-code location of the log occurrence, when the emitter provided it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_path: Option<String>,
}

impl SourceLocation {
    pub fn is_empty(&self) -> bool {
        self.line.is_none()
            && self.function.is_none()
            && self.file.is_none()
            && self.module_path.is_none()
    }
}
