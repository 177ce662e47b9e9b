use thiserror::Error;

/// Failure of a backend operation, surfaced to the caller verbatim
///
/// A rejected claim is *not* an error; it is reported through
/// [`crate::ClaimOutcome`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The payload could not be parsed
    #[error("Malformed request: {0}")]
    Malformed(String),
    /// The payload parsed but carries values the backend refuses
    #[error("{0}")]
    Invalid(String),
    /// No valid session was presented
    #[error("Not signed in.")]
    Unauthorized,
    /// Email/password pair did not match an admin account
    #[error("Invalid login credentials.")]
    InvalidCredentials,
    /// The addressed row does not exist
    #[error("{0}")]
    NotFound(String),
    /// The request conflicts with the current state of the row
    #[error("{0}")]
    Conflict(String),
    /// Anything the caller cannot fix
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// HTTP status code used when answering with this error
    pub fn status(&self) -> u16 {
        match self {
            ServiceError::Malformed(_) => 400,
            ServiceError::Unauthorized | ServiceError::InvalidCredentials => 401,
            ServiceError::NotFound(_) => 404,
            ServiceError::Conflict(_) => 409,
            ServiceError::Invalid(_) => 422,
            ServiceError::Internal(_) => 500,
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Malformed(err.to_string())
    }
}

/// A string did not name a member of one of the closed enums
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    /// Which enum was being parsed
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

/// A configuration the reservation system cannot run with
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Claim codes would be padded to an unusable width
    #[error("code width must be between 1 and 10, got {0}")]
    CodeWidth(usize),
}
