//! Authoring checks over a survey tree.
//!
//! None of these are enforced during evaluation: a survey with forward
//! references still flattens, it just reads whatever the context holds.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use crate::references::{collect_item_refs, item_expressions, ReferenceSite};
use crate::types::SurveyItem;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LintKind {
    DuplicateKey,
    ForwardReference,
    UnknownReference,
}

impl LintKind {
    pub fn name(self) -> &'static str {
        match self {
            LintKind::DuplicateKey => "duplicate-key",
            LintKind::ForwardReference => "forward-reference",
            LintKind::UnknownReference => "unknown-reference",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintFinding {
    pub kind: LintKind,
    #[serde(rename = "item")]
    pub item_key: String,
    pub message: String,
}

impl fmt::Display for LintFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.name(), self.item_key, self.message)
    }
}

impl LintFinding {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

/// Keys used by more than one item.
pub fn duplicate_keys(root: &SurveyItem) -> Vec<LintFinding> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for item in root.descendants() {
        *counts.entry(item.key.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(key, n)| LintFinding {
            kind: LintKind::DuplicateKey,
            item_key: key.to_string(),
            message: format!("key is used by {} items", n),
        })
        .collect()
}

/// References to items that come later in definition order.
///
/// An item referring to its own response is not a forward reference.
pub fn forward_references(root: &SurveyItem) -> Vec<LintFinding> {
    let order = definition_order(root);
    let mut findings = Vec::new();
    for (pos, item) in root.descendants().into_iter().enumerate() {
        for_each_ref(item, |site, target| {
            if target == item.key {
                return;
            }
            if let Some(&target_pos) = order.get(target) {
                if target_pos > pos {
                    findings.push(LintFinding {
                        kind: LintKind::ForwardReference,
                        item_key: item.key.clone(),
                        message: format!("{} reads '{}' which appears later", site, target),
                    });
                }
            }
        });
    }
    findings
}

/// References to keys that no item of the tree has.
pub fn unknown_references(root: &SurveyItem) -> Vec<LintFinding> {
    let order = definition_order(root);
    let mut findings = Vec::new();
    for item in root.descendants() {
        for_each_ref(item, |site, target| {
            if !order.contains_key(target) {
                findings.push(LintFinding {
                    kind: LintKind::UnknownReference,
                    item_key: item.key.clone(),
                    message: format!("{} reads unknown item '{}'", site, target),
                });
            }
        });
    }
    findings
}

/// All checks, grouped by kind.
pub fn lint(root: &SurveyItem) -> Vec<LintFinding> {
    let mut all = duplicate_keys(root);
    all.extend(forward_references(root));
    all.extend(unknown_references(root));
    tracing::debug!(findings = all.len(), "lint finished");
    all
}

/// First position of each key in pre-order.
fn definition_order(root: &SurveyItem) -> HashMap<&str, usize> {
    let mut order = HashMap::new();
    for (pos, item) in root.descendants().into_iter().enumerate() {
        order.entry(item.key.as_str()).or_insert(pos);
    }
    order
}

fn for_each_ref(item: &SurveyItem, mut f: impl FnMut(&ReferenceSite, &str)) {
    for (site, expr) in item_expressions(item) {
        for target in collect_item_refs(expr) {
            f(&site, &target);
        }
    }
}
