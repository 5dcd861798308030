use thiserror::Error;

/// Failures surfaced by dialogs, prompts and the turn plumbing beneath them.
///
/// Recognition misses are not errors: they come back as an unsuccessful
/// [`PromptRecognizerResult`](crate::prompts::PromptRecognizerResult) and drive a re-prompt.
#[derive(Debug, Error)]
pub enum DialogError {
    /// Caller contract violation (blank ids, wrong option shapes, missing validator).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The adapter lacks a capability the operation needs.
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error("dialog '{0}' is not registered in the dialog set")]
    DialogNotFound(String),
    #[error("a dialog with id '{0}' is already registered")]
    DuplicateDialog(String),
    #[error("dialog state error: {0}")]
    State(String),
    #[error("dialog state (de)serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("sending activity failed")]
    Transport(#[source] anyhow::Error),
    #[error("token service call failed")]
    TokenService(#[source] anyhow::Error),
    #[error("connector client creation failed")]
    Connector(#[source] anyhow::Error),
    #[error("prompt validator failed")]
    Validator(#[source] anyhow::Error),
}

impl DialogError {
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        DialogError::InvalidArgument(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        DialogError::Unsupported(message.into())
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, DialogError::Unsupported(_))
    }
}

pub type DialogResult<T> = Result<T, DialogError>;
