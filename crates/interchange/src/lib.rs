//! canvass-interchange: JSON wire types for survey definitions and
//! response documents.
//!
//! Provides typed structs for survey items (groups, questions, page
//! breaks), validations, options and submitted responses, plus the
//! `from_survey_json()` / `from_response_json()` entry points that turn a
//! `serde_json::Value` into those structs.
//!
//! Expressions are kept as raw `serde_json::Value` here. The evaluator
//! parses them into its own closed operator tree, so this crate stays
//! independent of the expression language.

pub mod deserialize;
pub mod types;

pub use deserialize::{from_response_json, from_survey_json, InterchangeError};
pub use types::*;
