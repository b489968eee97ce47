//! Error taxonomy for decision tree parsing and execution
//!
//! Structural problems in factory input surface as [`MalformedActionError`] or
//! [`MalformedTreeError`]. Runtime problems (condition evaluation, delivery,
//! cancellation) surface as [`Error`] variants. The service layer is the only
//! place where these are turned into result values.

use thiserror::Error;

use crate::action::ActionType;
use crate::expression::ExpressionError;

pub type Result<T> = std::result::Result<T, Error>;

/// Problems found while reconstructing a single action from JSON
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedActionError {
    #[error("invalid action JSON: missing type")]
    MissingType,

    #[error("invalid action JSON: unknown type: {0}")]
    UnknownType(String),

    /// A required field is absent (or not a string / number as the action expects)
    #[error("{action} requires {requirement}")]
    MissingField {
        action: &'static str,
        requirement: &'static str,
    },

    /// An optional field is present but has the wrong JSON kind
    #[error("{action} field '{field}' must be {expected}")]
    InvalidField {
        action: &'static str,
        field: &'static str,
        expected: &'static str,
    },
}

impl MalformedActionError {
    pub(crate) fn missing(action_type: ActionType, requirement: &'static str) -> Self {
        MalformedActionError::MissingField {
            action: action_type.class_name(),
            requirement,
        }
    }

    pub(crate) fn invalid(
        action_type: ActionType,
        field: &'static str,
        expected: &'static str,
    ) -> Self {
        MalformedActionError::InvalidField {
            action: action_type.class_name(),
            field,
            expected,
        }
    }
}

/// Problems found in the tree envelope (`rootAction` / `context`)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedTreeError {
    #[error("invalid decision tree JSON: missing rootAction")]
    MissingRootAction,

    #[error("invalid decision tree JSON: context must be an object")]
    InvalidContext,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    MalformedAction(#[from] MalformedActionError),

    #[error(transparent)]
    MalformedTree(#[from] MalformedTreeError),

    #[error("failed to evaluate condition `{expression}`: {source}")]
    Evaluation {
        expression: String,
        #[source]
        source: ExpressionError,
    },

    #[error("Invalid decision tree structure")]
    InvalidStructure,

    #[error("{channel} delivery failed: {message}")]
    Delivery {
        channel: &'static str,
        message: String,
    },

    #[error("execution cancelled")]
    Cancelled,
}

impl Error {
    /// True for errors caused by the shape of the input rather than by running it
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Error::MalformedAction(_) | Error::MalformedTree(_) | Error::InvalidStructure
        )
    }
}
