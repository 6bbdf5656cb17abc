//! Typed search errors.
//!
//! `SearchError` covers caller bugs and invalid configuration. Ordinary
//! search outcomes (budget exhaustion, an unsolvable target) are expressed
//! via [`crate::search::TerminationReason`] and are not errors.

use retro_kernel::contract::ContractError;

/// Typed failure for search construction, extraction, and export.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// An operation was called in a state where it cannot run
    /// (e.g. path extraction before a target was initialized).
    #[error("precondition violated: {detail}")]
    PreconditionViolation { detail: String },
    /// A configuration value or named option is not supported.
    #[error("invalid {what}: {value}")]
    InvalidArgument { what: &'static str, value: String },
    /// Selection backtracked past the root without finding an option.
    ///
    /// Never expected while the root is not done.
    #[error("selection backtracked past the root without a valid option")]
    SelectionExhausted,
    /// A collaborator lookup failed.
    #[error(transparent)]
    Contract(#[from] ContractError),
    /// A persisted tree document could not be decoded.
    #[error("malformed tree document: {detail}")]
    MalformedTree { detail: String },
    /// A route could not be converted to JSON.
    #[error("route export failed: {detail}")]
    Export { detail: String },
}

impl SearchError {
    pub(crate) fn precondition(detail: impl Into<String>) -> Self {
        Self::PreconditionViolation {
            detail: detail.into(),
        }
    }

    pub(crate) fn invalid(what: &'static str, value: impl ToString) -> Self {
        Self::InvalidArgument {
            what,
            value: value.to_string(),
        }
    }
}
