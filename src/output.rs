//! JSON bodies returned by `/get_code` and the `check` command.
//!
//! CHANGELOG:
//! - 10/18/2026 - Code response wire format
//! - 10/18/2026 - Initial implementation

use serde::Serialize;
use serde_json::json;

use crate::extract::{ExtractionResult, ExtractionStatus};

/// `sms_code` is the digit string when found, otherwise the integer `-1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SmsCode {
    Code(String),
    Missing(i64),
}

impl SmsCode {
    pub const MISSING: SmsCode = SmsCode::Missing(-1);
}

/// Body of a successful `/get_code` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodeResponse {
    pub sms_code: SmsCode,
    pub message: String,
}

impl From<&ExtractionResult> for CodeResponse {
    fn from(result: &ExtractionResult) -> Self {
        let (sms_code, message) = match (result.status(), result.code()) {
            (ExtractionStatus::Found, Some(code)) => (SmsCode::Code(code.to_string()), "Code found"),
            (ExtractionStatus::NoMessage, _) => (SmsCode::MISSING, "No message found"),
            _ => (SmsCode::MISSING, "No code found"),
        };
        Self {
            sms_code,
            message: message.to_string(),
        }
    }
}

impl CodeResponse {
    /// Render as JSON, single line when `compact`.
    pub fn emit(&self, compact: bool) -> String {
        // A string or integer plus a string always serializes.
        if compact {
            serde_json::to_string(self).unwrap_or_default()
        } else {
            serde_json::to_string_pretty(self).unwrap_or_default()
        }
    }
}

/// Error body used when the store could not be read.
pub fn error_body(error: &str) -> serde_json::Value {
    json!({
        "error": error,
        "success": false
    })
}

/// Format error as JSON.
pub fn format_error(error: &str) -> String {
    error_body(error).to_string()
}
