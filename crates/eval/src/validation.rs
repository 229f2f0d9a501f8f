//! Validation rules attached to survey items.
//!
//! Each rule expression is evaluated and coerced to a boolean with
//! `Value::truthy`. Evaluation errors are kept as [`RuleStatus::Broken`] so
//! the caller can see them; they are never folded into pass or fail.

use crate::evaluator::evaluate;
use crate::traversal::{SelectionSeeder, VisibleItems};
use crate::types::{EvalError, ResponseContext, Severity, SurveyItem};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleStatus {
    Passed,
    Failed,
    /// The rule could not be evaluated.
    Broken(EvalError),
}

/// Result of one validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub key: String,
    pub severity: Severity,
    pub status: RuleStatus,
}

impl ValidationOutcome {
    pub fn passed(&self) -> bool {
        matches!(self.status, RuleStatus::Passed)
    }

    /// Whether this outcome prevents submitting the item.
    ///
    /// Only hard rules block. A broken hard rule blocks as well.
    pub fn blocks(&self) -> bool {
        self.severity == Severity::Hard && !self.passed()
    }
}

/// Evaluate every validation rule of a single item, in definition order.
pub fn validate(item: &SurveyItem, ctx: &ResponseContext) -> Vec<ValidationOutcome> {
    item.validations
        .iter()
        .map(|rule| {
            let status = match evaluate(&rule.rule, ctx) {
                Ok(v) if v.truthy() => RuleStatus::Passed,
                Ok(_) => RuleStatus::Failed,
                Err(e) => {
                    tracing::warn!(
                        item = %item.key,
                        rule = %rule.key,
                        error = %e,
                        "validation rule could not be evaluated"
                    );
                    RuleStatus::Broken(e)
                }
            };
            ValidationOutcome {
                key: rule.key.clone(),
                severity: rule.severity,
                status,
            }
        })
        .collect()
}

// ──────────────────────────────────────────────
// Whole-survey reports
// ──────────────────────────────────────────────

/// Validation outcomes of one visible item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemValidation {
    pub item_key: String,
    pub outcomes: Vec<ValidationOutcome>,
}

/// Validation outcomes for every visible item of a survey.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub items: Vec<ItemValidation>,
}

impl ValidationReport {
    /// True when any hard rule failed or is broken.
    pub fn blocks_submission(&self) -> bool {
        self.outcomes().any(ValidationOutcome::blocks)
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &ValidationOutcome> {
        self.items.iter().flat_map(|i| i.outcomes.iter())
    }

    /// Outcomes that did not pass, paired with their item key.
    pub fn failures(&self) -> impl Iterator<Item = (&str, &ValidationOutcome)> {
        self.items.iter().flat_map(|i| {
            i.outcomes
                .iter()
                .filter(|o| !o.passed())
                .map(move |o| (i.item_key.as_str(), o))
        })
    }

    pub fn to_json(&self) -> serde_json::Value {
        let items: Vec<serde_json::Value> = self
            .items
            .iter()
            .map(|i| {
                let outcomes: Vec<serde_json::Value> = i
                    .outcomes
                    .iter()
                    .map(|o| {
                        let mut obj = serde_json::json!({
                            "key": o.key,
                            "severity": o.severity.name(),
                            "status": match o.status {
                                RuleStatus::Passed => "passed",
                                RuleStatus::Failed => "failed",
                                RuleStatus::Broken(_) => "broken",
                            },
                        });
                        if let RuleStatus::Broken(e) = &o.status {
                            obj["error"] = serde_json::Value::String(e.to_string());
                        }
                        obj
                    })
                    .collect();
                serde_json::json!({ "item": i.item_key, "outcomes": outcomes })
            })
            .collect();
        serde_json::json!({
            "blocksSubmission": self.blocks_submission(),
            "items": items,
        })
    }
}

/// Validate every visible item. Items without rules are omitted.
///
/// Visibility errors abort the report; rule errors are recorded as broken.
pub fn validate_visible<S: SelectionSeeder>(
    root: &SurveyItem,
    ctx: &ResponseContext,
    seeder: S,
) -> Result<ValidationReport, EvalError> {
    let mut report = ValidationReport::default();
    // Groups carry rules too, so walk them along with the questions.
    for item in VisibleItems::with_seeder(root, ctx, seeder).with_groups() {
        let item = item?;
        if item.validations.is_empty() {
            continue;
        }
        report.items.push(ItemValidation {
            item_key: item.key.clone(),
            outcomes: validate(item, ctx),
        });
    }
    Ok(report)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
