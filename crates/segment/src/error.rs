use thiserror::Error;

use crate::catalog::SchemaField;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("schema already added: {0}")]
    DuplicateField(SchemaField),

    #[error("index {index} out of range for selection of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("unknown schema field: {0}")]
    UnknownField(String),

    #[error("segment name is missing")]
    MissingName,

    #[error("segment needs at least one schema field")]
    EmptySelection,

    #[error("a submission is already in flight")]
    SubmissionInFlight,

    #[error("invalid endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint responded with status {status}: {body}")]
    Status { status: u16, body: String },
}

impl Error {
    /// Short message meant for a user-facing notification.
    pub fn notice(&self) -> &'static str {
        match self {
            Error::DuplicateField(_) => "Schema already added",
            Error::IndexOutOfRange { .. } => "Schema row no longer exists",
            Error::UnknownField(_) => "Unknown schema",
            Error::MissingName => "Missing Segment Name",
            Error::EmptySelection => "Add at least one schema",
            Error::SubmissionInFlight => "Segment is already being saved",
            Error::InvalidEndpoint { .. } => "Segment endpoint is not configured correctly",
            Error::Transport(_) | Error::Status { .. } => "Failed to save segment",
        }
    }

    /// True for errors raised by draft validation, before any network call.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::MissingName | Error::EmptySelection)
    }

    /// True for failures reported by the submission gateway.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Status { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notices_match_panel_messages() {
        assert_eq!(Error::MissingName.notice(), "Missing Segment Name");
        assert_eq!(Error::EmptySelection.notice(), "Add at least one schema");
        assert_eq!(
            Error::DuplicateField(SchemaField::City).notice(),
            "Schema already added"
        );
        let status = Error::Status {
            status: 502,
            body: String::new(),
        };
        assert_eq!(status.notice(), "Failed to save segment");
    }

    #[test]
    fn classification() {
        assert!(Error::MissingName.is_validation());
        assert!(Error::EmptySelection.is_validation());
        assert!(!Error::SubmissionInFlight.is_validation());
        assert!(Error::Status {
            status: 500,
            body: "boom".into()
        }
        .is_transport());
    }
}
