//! REST response classification.

use std::sync::LazyLock;

use serde::Deserialize;

use crate::error::{ApiFault, Error, ErrorKind, Result};

/// Classify a REST exchange that produced an HTTP response.
///
/// 2xx bodies are parsed as JSON (`Null` when empty). 401 and 403 carry the
/// first error message or a fixed fallback; everything else becomes
/// [`ErrorKind::Protocol`] with one line per error entry.
pub fn classify_rest_response(status: u16, body: &str) -> Result<serde_json::Value> {
    if (200..300).contains(&status) {
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        return serde_json::from_str(body).map_err(|e| {
            Error::with_source(
                ErrorKind::Protocol {
                    status,
                    message: format!("Invalid JSON response: {e}"),
                    errors: Vec::new(),
                    raw_body: body.to_string(),
                },
                e,
            )
        });
    }

    let errors = parse_rest_faults(body);
    let first_message = errors
        .first()
        .map(|fault| sanitize_error_message(&fault.message));

    let kind = match status {
        401 => ErrorKind::Unauthorized(
            first_message.unwrap_or_else(|| "New access token needed".to_string()),
        ),
        403 => ErrorKind::Forbidden(first_message.unwrap_or_else(|| "Forbidden".to_string())),
        _ => {
            let message = if errors.is_empty() {
                http_status_line(status)
            } else {
                let lines: Vec<String> = errors.iter().map(ApiFault::to_string).collect();
                sanitize_error_message(&lines.join("\n"))
            };
            ErrorKind::Protocol {
                status,
                message,
                errors,
                raw_body: body.to_string(),
            }
        }
    };

    Err(Error::new(kind))
}

/// `"HTTP <status> <reason>"`, e.g. `HTTP 500 Internal Server Error`.
pub fn http_status_line(status: u16) -> String {
    let reason = reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("");
    format!("HTTP {status} {reason}").trim_end().to_string()
}

/// Salesforce REST error entry (`[{errorCode, message, fields}]`).
#[derive(Debug, Deserialize)]
struct RestErrorEntry {
    #[serde(rename = "errorCode", default)]
    error_code: String,
    message: String,
    #[serde(default)]
    fields: Option<Vec<String>>,
}

impl From<RestErrorEntry> for ApiFault {
    fn from(entry: RestErrorEntry) -> Self {
        ApiFault {
            code: entry.error_code,
            message: entry.message,
            fields: entry.fields.unwrap_or_default(),
        }
    }
}

/// Error payloads are an array of entries. Anything else yields no faults.
fn parse_rest_faults(body: &str) -> Vec<ApiFault> {
    serde_json::from_str::<Vec<RestErrorEntry>>(body)
        .map(|entries| entries.into_iter().map(ApiFault::from).collect())
        .unwrap_or_default()
}

static TOKEN_PATTERN: LazyLock<Option<regex_lite::Regex>> =
    LazyLock::new(|| regex_lite::Regex::new(r"00[A-Za-z0-9]{13,}[!][A-Za-z0-9_.]+").ok());

static SESSION_PATTERN: LazyLock<Option<regex_lite::Regex>> =
    LazyLock::new(|| regex_lite::Regex::new(r"sid=[A-Za-z0-9]{20,}").ok());

/// Redact access tokens and session ids and cap the length of a message
/// that may be shown to users or logged.
pub(crate) fn sanitize_error_message(message: &str) -> String {
    const MAX_LENGTH: usize = 500;

    let mut sanitized = message.to_string();

    // Salesforce access tokens are `<org id>!<secret>`.
    if let Some(pattern) = TOKEN_PATTERN.as_ref() {
        sanitized = pattern
            .replace_all(&sanitized, "[REDACTED_TOKEN]")
            .into_owned();
    }
    if let Some(pattern) = SESSION_PATTERN.as_ref() {
        sanitized = pattern
            .replace_all(&sanitized, "sid=[REDACTED]")
            .into_owned();
    }

    if sanitized.len() > MAX_LENGTH {
        let mut cut = MAX_LENGTH;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized.truncate(cut);
        sanitized.push_str("...[truncated]");
    }

    sanitized
}
