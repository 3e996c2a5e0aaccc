use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::domain::{DomainError, DomainResult, LogEntry, SourceLocation};
use serde_json::{Map, Value};

/// Payload keys consumed by the structured mapping. Everything else is
/// carried through untouched as leftover payload data.
const KNOWN_KEYS: [&str; 8] = [
    "level",
    "message",
    "created_at",
    "principal_email",
    "line_number",
    "function_name",
    "file_name",
    "module_path",
];

/// Decode a base64-encoded envelope payload into a JSON object.
pub fn decode_payload(encoded: &str) -> DomainResult<Map<String, Value>> {
    let bytes = STANDARD.decode(encoded)?;
    let text = String::from_utf8(bytes)?;
    let value: Value = serde_json::from_str(&text)?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(DomainError::PayloadNotAnObject),
    }
}

/// Map a decoded payload to a [`LogEntry`].
///
/// The three required keys must be present as strings; optional known keys
/// pass through when present with the expected type. Keys outside the known
/// set land in `extra_payload` with no duplication.
pub fn build_log_entry(payload: &Map<String, Value>) -> DomainResult<LogEntry> {
    let severity = required_str(payload, "level")?.to_owned();
    let message = required_str(payload, "message")?.to_owned();
    let created_at = required_str(payload, "created_at")?.to_owned();

    let source_location = SourceLocation {
        line: payload.get("line_number").and_then(Value::as_i64),
        function: optional_str(payload, "function_name"),
        file: optional_str(payload, "file_name"),
        module_path: optional_str(payload, "module_path"),
    };

    let extra_payload = payload
        .iter()
        .filter(|(key, _)| !KNOWN_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(LogEntry {
        severity,
        message,
        created_at,
        principal_email: optional_str(payload, "principal_email"),
        source_location,
        extra_payload,
    })
}

fn required_str<'a>(payload: &'a Map<String, Value>, key: &'static str) -> DomainResult<&'a str> {
    let value = payload.get(key).ok_or(DomainError::MissingField(key))?;
    value.as_str().ok_or(DomainError::InvalidFieldType(key))
}

fn optional_str(payload: &Map<String, Value>, key: &str) -> Option<String> {
    payload.get(key).and_then(Value::as_str).map(str::to_owned)
}
