//! Error types for dialog operations
//!
//! Precondition violations are fatal programmer errors and surface as
//! `DialogError`. A vetoed transition is not an error; see
//! [`Transition`](crate::dialog::Transition).

use crate::dialog::DialogHandle;

/// Result type for dialog operations
pub type DialogResult<T> = std::result::Result<T, DialogError>;

/// Dialog-specific error types
#[derive(Debug, thiserror::Error)]
pub enum DialogError {
    /// Operation called in a lifecycle state that does not allow it
    #[error("Invalid dialog state: {0}")]
    InvalidState(String),

    /// A configuration snapshot could not be turned into a dialog
    #[error("Dialog configuration mismatch: {0}")]
    ConfigurationMismatch(String),

    #[error("Dialog {0} not found")]
    NotFound(DialogHandle),

    /// Failure reported by a nested control
    #[error("Dialog control error: {0}")]
    Control(#[from] anyhow::Error),
}

impl DialogError {
    pub(crate) fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub(crate) fn mismatch(message: impl Into<String>) -> Self {
        Self::ConfigurationMismatch(message.into())
    }

    /// Whether the error is a misuse of the lifecycle API
    pub fn is_invalid_state(&self) -> bool {
        matches!(self, Self::InvalidState(_))
    }
}

impl From<serde_json::Error> for DialogError {
    fn from(error: serde_json::Error) -> Self {
        Self::ConfigurationMismatch(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_errors_become_mismatch() {
        let err: DialogError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, DialogError::ConfigurationMismatch(_)));
        assert!(!err.is_invalid_state());
    }

    #[test]
    fn test_display_messages() {
        let err = DialogError::invalid_state("Must set ID before render");
        assert_eq!(err.to_string(), "Invalid dialog state: Must set ID before render");

        let err = DialogError::NotFound(DialogHandle::from_raw(7));
        assert_eq!(err.to_string(), "Dialog #7 not found");
    }
}
