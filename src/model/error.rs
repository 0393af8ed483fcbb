use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for rule set operations
pub type Result<T> = std::result::Result<T, RuleSetError>;

/// Store-wide action that needs pending changes to do anything
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Save,
    Reset,
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ChangeAction::Save => write!(f, "save"),
            ChangeAction::Reset => write!(f, "reset"),
        }
    }
}

/// Rule set errors. None of them leave the store in a broken state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleSetError {
    /// Index-addressed removal or edit outside the current children
    #[error("{target} index {index} is out of bounds (len {len})")]
    OutOfBounds {
        target: &'static str,
        index: usize,
        len: usize,
    },

    /// Save refused because some rule types still hold invalid conditions
    #[error("The following rules have errors, fix them first:\n- {}", .types.join("\n- "))]
    ValidationBlocked { types: Vec<String> },

    /// Save or reset requested without pending changes
    #[error("No changes to {0}")]
    NothingToChange(ChangeAction),

    /// Addressed rule type has no live tree or is not a known type
    #[error("Unknown rule type: {0}")]
    UnknownType(String),

    /// A rule already exists for the type
    #[error("Rule already exists: {0}")]
    AlreadyExists(String),

    /// Mutation attempted while the editor is read-only
    #[error("Rule set is read-only")]
    ReadOnly,

    /// Raw input could not be normalized into a rule tree
    #[error("Invalid rule input: {0}")]
    InvalidInput(String),

    /// The field-lookup source failed
    #[error("Field lookup failed: {0}")]
    FieldLookup(String),
}

impl From<serde_json::Error> for RuleSetError {
    fn from(err: serde_json::Error) -> Self {
        RuleSetError::InvalidInput(err.to_string())
    }
}
