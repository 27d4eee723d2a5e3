//! # Intake Core
//!
//! Data model for the single-question-at-a-time intake wizard.
//!
//! ```text
//! Registry ──► InputSurface ──► validate() ──► save_step() ──► AnswerRecord
//!  (steps)      (live values)    (per step)     (merge)            │
//!                                                                  ▼
//!                                                   build_payload() ──► SubmissionPayload
//! ```
//!
//! Nothing in this crate performs I/O or keeps time. The navigator, the
//! transition choreography and the submission transport live in other crates
//! and call into these pure functions.

pub mod aggregate;
pub mod field;
pub mod input;
pub mod payload;
pub mod step;
pub mod validate;
pub mod value;

pub use aggregate::{
    build_payload, clear_attachment_url, record_attachment_url, record_file, save_step,
};
pub use field::{Choice, FieldKind, FieldSpec, ShortcutKey};
pub use input::{InputSurface, RawInput};
pub use payload::{CurrentEducation, JobPreferences, SubmissionPayload};
pub use step::{Registry, Step, StepRule};
pub use validate::{validate, Failure, FailureReason, Target, ValidationReport};
pub use value::{AnswerRecord, FieldValue, FileRef};

/// Result type for intake-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in intake-core
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Registry has no steps")]
    EmptyRegistry,

    #[error("Step {0} has no fields")]
    EmptyStep(usize),

    #[error("Duplicate field name: {0}")]
    DuplicateField(String),

    #[error("Field name {0} is reserved")]
    ReservedField(String),

    #[error("Invalid shortcut key {0:?}: expected A-G or 1-5")]
    InvalidShortcut(String),

    #[error("Step {step}: shortcut key {key} is used more than once")]
    DuplicateShortcut { step: usize, key: ShortcutKey },

    #[error("Step {step}: field {field} {reason}")]
    InvalidField {
        step: usize,
        field: String,
        reason: String,
    },

    #[error("Step {step}: rule must reference a multi-choice field of the same step, got {field}")]
    InvalidRule { step: usize, field: String },

    #[error("Field {field} is not a valid integer: {value:?}")]
    InvalidNumber { field: String, value: String },
}
