//! Graph client error types.
//!
//! All remote-call failures surface through [`GraphError`].  Each variant
//! carries enough context for callers to decide how to handle the failure
//! without inspecting opaque strings.

/// Unified error type for the Graph client.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// The API returned a non-success status.  The message is taken from
    /// the structured `error.message` body field when present, otherwise
    /// from the status line.
    #[error("graph api returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The HTTP request itself failed (connection, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be parsed as JSON.
    #[error("malformed response for `{endpoint}`: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience alias used throughout the graph crate.
pub type Result<T> = std::result::Result<T, GraphError>;
