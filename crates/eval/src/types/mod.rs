//! Runtime value types, response model and survey tree for the Canvass
//! evaluator.
//!
//! These types are DISTINCT from the canvass-interchange wire structs. The
//! evaluator converts interchange documents into them once, then evaluates
//! against the converted form.

pub mod context;
pub mod response;
pub mod survey;
pub mod values;

pub use context::ResponseContext;
pub use response::{ResponseItem, ResponseNode};
pub use survey::{
    ItemBody, OptionDef, OptionRole, ResponseRole, SelectionMethod, Severity, SurveyItem,
    ValidationRule,
};
pub use values::Value;

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// Errors that can occur while evaluating expressions against a context.
///
/// This is the only error kind of the engine. Conditions that cannot be
/// evaluated are reported with this type rather than defaulted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvalError {
    /// An operator name that is not part of the expression language.
    #[error("unknown operator: {name}")]
    UnknownOperator { name: String },
    /// An operator was called with the wrong number of arguments.
    #[error("operator '{op}' expects {expected} argument(s), got {got}")]
    Arity {
        op: String,
        expected: String,
        got: usize,
    },
    /// An operand had the wrong type for the operator.
    #[error("type error in '{op}': {message}")]
    TypeError { op: String, message: String },
    /// A referenced item has no response in the context.
    #[error("no response for item '{item_key}'")]
    MissingResponse { item_key: String },
    /// The item has a response but nothing at the requested sub-path.
    #[error("no response node at '{path}' for item '{item_key}'")]
    MissingResponsePath { item_key: String, path: String },
    /// A context attribute was not found.
    #[error("attribute not found: {name}")]
    MissingAttribute { name: String },
    /// Numeric overflow during arithmetic.
    #[error("numeric overflow: {message}")]
    Overflow { message: String },
    /// Malformed expression, survey or response document.
    #[error("deserialization error: {message}")]
    DeserializeError { message: String },
    /// A visibility or option condition of a specific item failed.
    #[error("condition of item '{item_key}' could not be evaluated: {source}")]
    Condition {
        item_key: String,
        #[source]
        source: Box<EvalError>,
    },
}

impl EvalError {
    /// True for errors caused purely by data being absent from the
    /// context (as opposed to malformed expressions).
    pub fn is_absence(&self) -> bool {
        matches!(
            self,
            EvalError::MissingResponse { .. }
                | EvalError::MissingResponsePath { .. }
                | EvalError::MissingAttribute { .. }
        )
    }

    pub(crate) fn type_error(op: &str, message: impl Into<String>) -> Self {
        EvalError::TypeError {
            op: op.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn deserialize(message: impl Into<String>) -> Self {
        EvalError::DeserializeError {
            message: message.into(),
        }
    }

    pub(crate) fn in_condition(self, item_key: &str) -> Self {
        EvalError::Condition {
            item_key: item_key.to_string(),
            source: Box::new(self),
        }
    }
}

impl From<canvass_interchange::InterchangeError> for EvalError {
    fn from(e: canvass_interchange::InterchangeError) -> Self {
        EvalError::DeserializeError {
            message: e.to_string(),
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absence_errors_are_classified() {
        assert!(EvalError::MissingResponse {
            item_key: "a".into()
        }
        .is_absence());
        assert!(EvalError::MissingAttribute { name: "x".into() }.is_absence());
        assert!(!EvalError::UnknownOperator { name: "x".into() }.is_absence());
    }

    #[test]
    fn condition_error_names_item() {
        let err = EvalError::UnknownOperator {
            name: "frobnicate".into(),
        }
        .in_condition("s.q1");
        assert_eq!(
            err.to_string(),
            "condition of item 's.q1' could not be evaluated: unknown operator: frobnicate"
        );
    }
}
