use crate::error::ParseError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One decoded log record, corresponding to one line of a log file.
///
/// Records are stored as single JSON lines. Absent fields decode to their
/// zero values, so logs written by older emitters deserialize without
/// error. The `extra` map is always present after parsing — an empty map
/// when the record carried no extension fields.
///
/// The request metadata fields (`method`, `path`, `status`, `duration`,
/// `ip`, `user_agent`) are not part of the wire format. They are derived
/// from `message` when it follows the pipe-delimited convention
/// `"<METHOD> <PATH> | Status: <code> | Duration: <dur> | IP: <ip> | User-Agent: <ua>"`.
/// Any subset of segments may be present; each is extracted independently.
///
/// # Examples
///
/// ```
/// use logsift::LogEntry;
///
/// let line = r#"{"timestamp":"2024-03-01T10:00:00Z","log_id":"req-42","level":"INFO","message":"GET /users | Status: 200 | Duration: 12ms"}"#;
/// let entry = LogEntry::parse(line).unwrap();
///
/// assert_eq!(entry.log_id, "req-42");
/// assert_eq!(entry.method.as_deref(), Some("GET"));
/// assert_eq!(entry.path.as_deref(), Some("/users"));
/// assert_eq!(entry.status, Some(200));
/// assert!(entry.extra.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// ISO-8601 timestamp, as written by the emitter. Not validated.
    #[serde(default)]
    pub timestamp: String,

    /// Opaque correlation identifier. May repeat across files.
    #[serde(default)]
    pub log_id: String,

    /// Severity string (`INFO`, `WARN`, `ERROR`, `DEBUG`, `TRACE`).
    /// Case-sensitive, not validated.
    #[serde(default)]
    pub level: String,

    /// Free-text message. May embed request metadata (see type docs).
    #[serde(default)]
    pub message: String,

    /// Source file of the emitting call site, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Source line of the emitting call site, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,

    /// Function name of the emitting call site, if recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,

    /// Extension fields. Explicit key-value pairs only — arbitrary JSON
    /// structure is not reflected into this map.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub extra: HashMap<String, String>,

    /// HTTP method, derived from `message`.
    #[serde(skip)]
    pub method: Option<String>,

    /// Request path, derived from `message`.
    #[serde(skip)]
    pub path: Option<String>,

    /// Response status code, derived from `message`. A non-numeric
    /// status segment is treated as absent.
    #[serde(skip)]
    pub status: Option<u16>,

    /// Request duration as written (e.g. `"12.5ms"`), derived from `message`.
    #[serde(skip)]
    pub duration: Option<String>,

    /// Client IP address, derived from `message`.
    #[serde(skip)]
    pub ip: Option<String>,

    /// Client user agent, derived from `message`.
    #[serde(skip)]
    pub user_agent: Option<String>,
}

impl LogEntry {
    /// Parse one JSON line into a [`LogEntry`].
    ///
    /// Pure function over its input: no I/O, no side effects. On success
    /// the entry is fully populated, with request metadata extracted from
    /// the message. On failure the caller gets a [`ParseError`] and no
    /// entry — a record is never partially decoded.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`] for invalid JSON, non-JSON text, or a field
    /// whose JSON type does not match the schema (e.g. `"line"` given as
    /// a string).
    ///
    /// # Examples
    ///
    /// ```
    /// use logsift::LogEntry;
    ///
    /// let entry = LogEntry::parse(r#"{"log_id":"a","level":"ERROR","message":"boom"}"#).unwrap();
    /// assert_eq!(entry.level, "ERROR");
    /// assert_eq!(entry.method, None);
    ///
    /// assert!(LogEntry::parse("not json").is_err());
    /// assert!(LogEntry::parse(r#"{"line":"forty-two"}"#).is_err());
    /// ```
    pub fn parse(line: &str) -> Result<LogEntry, ParseError> {
        let mut entry: LogEntry = serde_json::from_str(line)?;
        entry.extract_request_metadata();
        Ok(entry)
    }

    /// Scan `message` for pipe-delimited request segments and populate
    /// the derived fields. Segments are independent: a malformed or
    /// missing segment never disturbs the others.
    fn extract_request_metadata(&mut self) {
        for segment in self.message.split(" | ") {
            if let Some(rest) = segment.strip_prefix("Status: ") {
                if let Ok(code) = rest.trim().parse::<u16>() {
                    self.status = Some(code);
                }
            } else if let Some(rest) = segment.strip_prefix("Duration: ") {
                self.duration = Some(rest.trim().to_string());
            } else if let Some(rest) = segment.strip_prefix("IP: ") {
                self.ip = Some(rest.trim().to_string());
            } else if let Some(rest) = segment.strip_prefix("User-Agent: ") {
                self.user_agent = Some(rest.to_string());
            } else if let Some((method, path)) = split_request_line(segment) {
                self.method = Some(method.to_string());
                self.path = Some(path.to_string());
            }
        }
    }
}

/// Recognize a `"<METHOD> <PATH>"` segment: exactly one space, an
/// all-uppercase ASCII method, a path starting with `/`.
fn split_request_line(segment: &str) -> Option<(&str, &str)> {
    let (method, path) = segment.split_once(' ')?;
    if method.is_empty() || !method.bytes().all(|b| b.is_ascii_uppercase()) {
        return None;
    }
    if !path.starts_with('/') || path.contains(' ') {
        return None;
    }
    Some((method, path))
}
