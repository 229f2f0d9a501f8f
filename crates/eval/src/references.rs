//! Static extraction of item references from expressions.
//!
//! A reference is the first argument of an item-reading operator
//! (`hasResponse`, `getResponseItem`, ...) when that argument is a text
//! literal. Keys computed at evaluation time cannot be resolved statically
//! and are only counted.

use crate::expression::Expression;
use crate::types::{SurveyItem, Value};

/// Collects item keys referenced by one or more expressions.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCollector {
    pub items_used: Vec<String>,
    /// Item-reading calls whose key is not a literal.
    pub dynamic: usize,
}

impl ReferenceCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an item reference access.
    pub fn record_item(&mut self, item_key: &str) {
        if !self.items_used.iter().any(|k| k == item_key) {
            self.items_used.push(item_key.to_string());
        }
    }

    /// Walk an expression tree, recording every item reference.
    pub fn visit(&mut self, expr: &Expression) {
        let Expression::Call { op, args } = expr else {
            return;
        };
        if op.references_item() {
            match args.first() {
                Some(Expression::Literal(Value::Text(key))) => self.record_item(key),
                Some(_) => self.dynamic += 1,
                None => {}
            }
        }
        for arg in args {
            self.visit(arg);
        }
    }
}

/// Item keys referenced by an expression, in first-use order.
pub fn collect_item_refs(expr: &Expression) -> Vec<String> {
    let mut c = ReferenceCollector::new();
    c.visit(expr);
    c.items_used
}

/// Where in an item a reference was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSite {
    Condition,
    Validation(String),
    OptionDisplay(String),
    OptionDisabled(String),
}

impl std::fmt::Display for ReferenceSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReferenceSite::Condition => write!(f, "condition"),
            ReferenceSite::Validation(k) => write!(f, "validation '{}'", k),
            ReferenceSite::OptionDisplay(k) => write!(f, "display condition of option '{}'", k),
            ReferenceSite::OptionDisabled(k) => write!(f, "disabled rule of option '{}'", k),
        }
    }
}

/// Every expression attached to an item, with its site.
pub fn item_expressions(item: &SurveyItem) -> Vec<(ReferenceSite, &Expression)> {
    let mut out = Vec::new();
    if let Some(c) = &item.condition {
        out.push((ReferenceSite::Condition, c));
    }
    for v in &item.validations {
        out.push((ReferenceSite::Validation(v.key.clone()), &v.rule));
    }
    for o in item.options() {
        if let Some(c) = &o.display_condition {
            out.push((ReferenceSite::OptionDisplay(o.key.clone()), c));
        }
        if let Some(c) = &o.disabled {
            out.push((ReferenceSite::OptionDisabled(o.key.clone()), c));
        }
    }
    out
}
