use serde::Deserialize;
use thiserror::Error;

use crate::draft::DraftField;

/// Reasons a Draft cannot move forward. `Display` is the toast text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("Maximum {max} images allowed")]
    TooManyImages { max: usize },
    #[error("Only images under {max_mb}MB are allowed")]
    InvalidImage { max_mb: u64 },
    #[error("Please upload at least one image")]
    MissingImages,
    #[error("Could not preview the selected images")]
    PreviewUnavailable,
    #[error("Please fill in all required fields")]
    MissingField(DraftField),
    #[error("Price must be a non-negative amount")]
    InvalidPrice,
    #[error("Stock must be a whole number")]
    InvalidStock,
}

/// Failures talking to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no message"))]
    Http { status: u16, message: Option<String> },
    #[error("network error: {0}")]
    Network(String),
    #[error("could not decode response: {0}")]
    Decode(String),
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl ApiError {
    /// Build an HTTP error from a status and raw response body, keeping the
    /// body's `message` field when it has one.
    pub fn from_response(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|b| b.message);
        ApiError::Http { status, message }
    }

    /// Human-readable message supplied by the server, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Http {
                message: Some(m), ..
            } if !m.trim().is_empty() => Some(m.as_str()),
            _ => None,
        }
    }

    /// Toast text: the server's message when present, else `fallback`.
    pub fn toast_message(&self, fallback: &str) -> String {
        self.server_message().unwrap_or(fallback).to_string()
    }
}
