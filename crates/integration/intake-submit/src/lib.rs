//! # Intake Submit
//!
//! Outbound side of the intake wizard: sends the finished payload to the
//! configured endpoint and turns selected files into durable URLs.
//!
//! Both concerns sit behind async traits so the front end can swap in the
//! dry-run submitter for offline use.

pub mod attachment;
pub mod submitter;

pub use attachment::{AttachmentResolver, LocalFileResolver};
pub use submitter::{DryRunSubmitter, HttpSubmitter, Receipt, Submitter};

use std::path::PathBuf;

/// Result type for submission operations
pub type Result<T> = std::result::Result<T, SubmitError>;

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed response body: {0}")]
    MalformedResponse(String),

    #[error("Cannot attach {}: {reason}", path.display())]
    Attachment { path: PathBuf, reason: String },
}

impl SubmitError {
    /// Short reason suitable for an on-screen notice
    pub fn summary(&self) -> String {
        match self {
            Self::Transport(e) if e.is_timeout() => "the server did not answer in time".into(),
            Self::Transport(e) if e.is_connect() => "the server could not be reached".into(),
            Self::Transport(_) => "the request could not be sent".into(),
            Self::Status { status, .. } => format!("the server answered {}", status),
            Self::MalformedResponse(_) => "the server sent an unreadable answer".into(),
            Self::Attachment { reason, .. } => reason.clone(),
        }
    }
}
