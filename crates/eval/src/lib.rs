//! Canvass survey evaluator -- accepts a survey definition plus one
//! respondent's responses, produces the visible items and validation
//! results.
//!
//! The evaluator consumes interchange JSON (see `canvass-interchange`),
//! converts it once into an immutable `SurveyItem` tree and a
//! `ResponseContext`, then flattens the tree and runs validation rules.
//! Nothing is mutated during evaluation, so one tree can serve any number
//! of respondents concurrently.

pub mod assemble;
pub mod builder;
pub mod evaluator;
pub mod expression;
pub mod lint;
pub mod numeric;
pub mod options;
pub mod references;
pub mod traversal;
pub mod types;
pub mod validation;

pub use assemble::assemble_context;
pub use builder::{compose_key, GroupBuilder, QuestionBuilder};
pub use evaluator::{evaluate, evaluate_bool};
pub use expression::{parse_expression, Expression, Operator};
pub use lint::{lint, LintFinding, LintKind};
pub use options::{option_states, OptionState};
pub use traversal::{
    flatten, flatten_with, pages, pages_with, DigestSeeder, FixedSeeder, SelectionSeeder,
    VisibleItems,
};
pub use types::{
    EvalError, ItemBody, OptionDef, OptionRole, ResponseContext, ResponseItem, ResponseNode,
    ResponseRole, SelectionMethod, Severity, SurveyItem, ValidationRule, Value,
};
pub use validation::{
    validate, validate_visible, RuleStatus, ValidationOutcome, ValidationReport,
};

/// A survey definition converted from its interchange document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Survey {
    pub id: String,
    pub root: SurveyItem,
}

impl Survey {
    pub fn from_json(doc: &serde_json::Value) -> Result<Survey, EvalError> {
        let parsed = canvass_interchange::from_survey_json(doc)?;
        Ok(Survey {
            id: parsed.id,
            root: SurveyItem::from_interchange(&parsed.root)?,
        })
    }
}

/// Assemble a context from a response document in JSON form.
pub fn context_from_json(doc: &serde_json::Value) -> Result<ResponseContext, EvalError> {
    let parsed = canvass_interchange::from_response_json(doc)?;
    assemble_context(&parsed)
}

/// The subset seeder for an optional fixed seed.
pub fn seeder_for(seed: Option<u64>) -> Box<dyn SelectionSeeder + Send + Sync> {
    match seed {
        Some(s) => Box::new(FixedSeeder(s)),
        None => Box::new(DigestSeeder),
    }
}

/// Result of evaluating a survey for one respondent.
#[derive(Debug, Clone)]
pub struct SurveyEvaluation {
    /// Keys of the visible questions in display order.
    pub visible: Vec<String>,
    /// Visible question keys split into pages.
    pub pages: Vec<Vec<String>>,
    pub validation: ValidationReport,
}

impl SurveyEvaluation {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "visible": self.visible,
            "pages": self.pages,
            "validation": self.validation.to_json(),
        })
    }
}

/// Evaluate a survey against a response document.
///
/// This is the top-level public API. Both arguments are interchange JSON.
/// `seed` fixes random-subset selection; without it subsets are seeded
/// from the participant id.
pub fn evaluate_survey(
    survey: &serde_json::Value,
    responses: &serde_json::Value,
    seed: Option<u64>,
) -> Result<SurveyEvaluation, EvalError> {
    let survey = Survey::from_json(survey)?;
    let ctx = context_from_json(responses)?;
    let seeder = seeder_for(seed);

    let visible = flatten_with(&survey.root, &ctx, &*seeder)?
        .into_iter()
        .map(|i| i.key.clone())
        .collect();
    let pages = pages_with(&survey.root, &ctx, &*seeder)?
        .into_iter()
        .map(|page| page.into_iter().map(|i| i.key.clone()).collect())
        .collect();
    let validation = validate_visible(&survey.root, &ctx, &*seeder)?;

    Ok(SurveyEvaluation {
        visible,
        pages,
        validation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn survey_json() -> serde_json::Value {
        json!({
            "id": "weekly",
            "canvass": "1.0",
            "root": {
                "kind": "group",
                "key": "weekly",
                "items": [
                    { "kind": "question", "key": "weekly.A", "role": "multipleChoice",
                      "options": [{ "key": "0" }, { "key": "1" }],
                      "validations": [{ "key": "answered", "severity": "hard",
                        "rule": { "name": "hasResponse", "args": ["weekly.A", "responseGroup"] } }] },
                    { "kind": "pageBreak", "key": "weekly.pb" },
                    { "kind": "question", "key": "weekly.B", "role": "text",
                      "condition": { "name": "responseHasKeysAny",
                        "args": ["weekly.A", "responseGroup.multipleChoice", "0"] } }
                ]
            }
        })
    }

    #[test]
    fn end_to_end_with_selection() {
        let responses = json!({
            "evaluationTime": 1700000000,
            "responses": [{ "key": "weekly.A", "response": {
                "key": "responseGroup",
                "items": [{ "key": "multipleChoice", "items": [{ "key": "0" }] }]
            }}]
        });
        let result = evaluate_survey(&survey_json(), &responses, None).unwrap();
        assert_eq!(result.visible, vec!["weekly.A", "weekly.B"]);
        assert_eq!(
            result.pages,
            vec![vec!["weekly.A".to_string()], vec!["weekly.B".to_string()]]
        );
        assert!(!result.validation.blocks_submission());
    }

    #[test]
    fn end_to_end_without_answers() {
        let responses = json!({ "evaluationTime": 1700000000 });
        let result = evaluate_survey(&survey_json(), &responses, None).unwrap();
        assert_eq!(result.visible, vec!["weekly.A"]);
        assert!(result.validation.blocks_submission());
        assert_eq!(result.to_json()["validation"]["blocksSubmission"], true);
    }

    #[test]
    fn unknown_operator_rejected_at_load() {
        let mut doc = survey_json();
        doc["root"]["items"][2]["condition"]["name"] = json!("responseHasKeyz");
        let err = Survey::from_json(&doc).unwrap_err();
        assert_eq!(
            err,
            EvalError::UnknownOperator {
                name: "responseHasKeyz".into()
            }
        );
    }

    #[test]
    fn flatten_is_idempotent() {
        let survey = Survey::from_json(&survey_json()).unwrap();
        let ctx = ResponseContext::new(0);
        let first = flatten(&survey.root, &ctx).unwrap();
        let second = flatten(&survey.root, &ctx).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn engine_types_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SurveyItem>();
        assert_send_sync::<ResponseContext>();
        assert_send_sync::<Survey>();
        assert_send_sync::<EvalError>();
    }
}
