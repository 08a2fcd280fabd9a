//! Reply envelope shared by the mutation endpoints.

use serde::Deserialize;

/// Outcome flag embedded in mutation replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyStatus {
    /// The mutation was accepted.
    Success,
    /// The mutation was rejected; `message` explains why.
    Error,
}

/// Generic `{status, message?}` reply returned by attendance and plan saves.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusReply {
    /// Accepted or rejected.
    pub status: ReplyStatus,
    /// Human-readable failure reason, if any.
    #[serde(default)]
    pub message: Option<String>,
}
