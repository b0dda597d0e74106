//! Output envelope

use crate::error::{ResolveError, Result};
use serde::Serialize;
use serde_json::Value;
use std::io::Write;

/// Structured response written as a single JSON line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

/// Error details of a failed response
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorInfo {
    pub name: String,
    pub message: String,
}

impl Response {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(err: &ResolveError) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorInfo {
                name: err.name().to_string(),
                message: err.message().to_string(),
            }),
        }
    }

    /// Serialize as compact JSON followed by a newline
    pub fn write_line<W: Write>(&self, mut writer: W) -> Result<()> {
        serde_json::to_writer(&mut writer, self).map_err(encode_error)?;
        writer
            .write_all(b"\n")
            .and_then(|_| writer.flush())
            .map_err(encode_error)
    }
}

fn encode_error<E: std::fmt::Display>(e: E) -> ResolveError {
    ResolveError::Encode(format!("Failed to encode response: {}", e))
}
