//! Deserialization of survey and response documents into typed structs.
//!
//! The entry points are [`from_survey_json`] and [`from_response_json`].
//! Both take a `&serde_json::Value` so callers can read files once and
//! hand the same tree to several consumers.

use crate::types::*;

/// Errors during interchange JSON deserialization.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterchangeError {
    /// The document is missing a required top-level field.
    #[error("document missing required field: '{field}'")]
    MissingField { field: String },
    /// The document declares a format version this crate does not read.
    #[error("unsupported canvass format version: '{version}'")]
    UnsupportedVersion { version: String },
    /// The document structure is invalid.
    #[error("invalid document: {0}")]
    InvalidDocument(String),
}

/// Deserialize a survey document.
///
/// Documents without a `canvass` version field are accepted as the
/// current version.
pub fn from_survey_json(doc: &serde_json::Value) -> Result<SurveyDocument, InterchangeError> {
    let obj = doc
        .as_object()
        .ok_or_else(|| InterchangeError::InvalidDocument("survey must be a JSON object".into()))?;

    for field in ["id", "root"] {
        if !obj.contains_key(field) {
            return Err(InterchangeError::MissingField {
                field: field.to_string(),
            });
        }
    }

    if let Some(version) = obj.get("canvass").and_then(|v| v.as_str()) {
        if !version.starts_with("1.") {
            return Err(InterchangeError::UnsupportedVersion {
                version: version.to_string(),
            });
        }
    }

    serde_json::from_value(doc.clone()).map_err(|e| InterchangeError::InvalidDocument(e.to_string()))
}

/// Deserialize a response document.
pub fn from_response_json(doc: &serde_json::Value) -> Result<ResponseDocument, InterchangeError> {
    if !doc.is_object() {
        return Err(InterchangeError::InvalidDocument(
            "responses must be a JSON object".into(),
        ));
    }
    serde_json::from_value(doc.clone()).map_err(|e| InterchangeError::InvalidDocument(e.to_string()))
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
