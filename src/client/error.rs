use thiserror::Error;

/// Failure of a client-side balance update.
///
/// `Display` is the bare message so it can be shown to the user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Rejected locally, nothing was sent
    #[error("{0}")]
    Validation(String),

    /// The remote call could not complete
    #[error("{0}")]
    Transport(String),

    /// The remote call completed with an unusable payload
    #[error("{0}")]
    Protocol(String),

    /// The service answered `success: false`
    #[error("{0}")]
    Application(String),
}

impl ClientError {
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Validation(_) => "VALIDATION_ERROR",
            ClientError::Transport(_) => "TRANSPORT_ERROR",
            ClientError::Protocol(_) => "PROTOCOL_ERROR",
            ClientError::Application(_) => "APPLICATION_ERROR",
        }
    }
}

/// The invocation itself failed (connect, timeout, body read).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

impl From<TransportError> for ClientError {
    fn from(e: TransportError) -> Self {
        ClientError::Transport(e.0)
    }
}
