use thiserror::Error;

/// Why a client action failed
///
/// Every failure is terminal for the action that caused it; nothing is
/// retried.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Caught locally, nothing was sent
    #[error("{0}")]
    Validation(String),
    /// The backend refused the request; `message` is its text verbatim
    #[error("{message}")]
    Rejected {
        /// HTTP status of the answer
        status: u16,
        /// Backend error text
        message: String,
    },
    /// The request or its answer got lost or garbled
    #[error("{0}")]
    Transport(String),
}

impl ClientError {
    /// Whether the backend refused because the session is missing or expired
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Rejected { status: 401, .. })
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Transport(format!("unreadable response: {err}"))
    }
}
