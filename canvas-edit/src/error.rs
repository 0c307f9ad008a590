//! Error types for edit sessions.
//!
//! Only contract violations are errors. Invalid geometry and stale sessions
//! are reported as "no result" by the operations themselves.

use thiserror::Error;

use crate::operation::OperationId;
use crate::transform::TransformKind;

/// Result type for edit operations.
pub type EditResult<T> = Result<T, EditError>;

/// Errors that can occur while driving an edit session.
#[derive(Debug, Error)]
pub enum EditError {
    /// An operation was handed another operation's context.
    #[error("{operation} operation received a {found} context")]
    ContextMismatch {
        /// The operation that was called.
        operation: OperationId,
        /// The kind of context it received.
        found: OperationId,
    },

    /// An operation was handed a transform of the wrong kind.
    #[error("{operation} operation received a {found} transform")]
    TransformMismatch {
        /// The operation that was called.
        operation: OperationId,
        /// The kind of transform it received.
        found: TransformKind,
    },

    /// The selection holds no elements present in the document.
    #[error("Cannot start an edit with an empty selection")]
    EmptySelection,

    /// A required start parameter was not supplied.
    #[error("Missing edit parameter: {0}")]
    MissingParameter(&'static str),

    /// An update, finish or cancel arrived with no session active.
    #[error("No edit session is active")]
    NotEditing,

    /// A start arrived while another session is active.
    #[error("An edit session is already active: {0}")]
    AlreadyEditing(OperationId),

    /// Configuration could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}
