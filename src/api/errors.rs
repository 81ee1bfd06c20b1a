//! Backend client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend error (status {status_code}): {}", detail.as_deref().unwrap_or("no detail"))]
    Status {
        status_code: u16,
        detail: Option<String>,
    },

    #[error("Failed to decode response from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ApiError {
    /// Message shown to the user: the server's `detail` when it sent one,
    /// otherwise the caller's fallback.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            ApiError::Status { detail: Some(detail), .. } => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}
