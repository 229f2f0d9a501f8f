//! Pure builders for survey trees.
//!
//! Every builder method consumes the builder and returns a new one;
//! `build()` yields an immutable `SurveyItem`. Item keys are computed by
//! [`compose_key`] from the parent key and either a caller override or the
//! generator's default local key, so the final key depends only on those
//! inputs and never on call order.

use crate::expression::Expression;
use crate::types::{
    ItemBody, OptionDef, OptionRole, ResponseRole, SelectionMethod, Severity, SurveyItem,
    ValidationRule,
};

/// Join a parent key and a local key with a dot. Root items have no parent.
pub fn compose_key(parent: Option<&str>, local: &str) -> String {
    match parent {
        Some(p) if !p.is_empty() => format!("{}.{}", p, local),
        _ => local.to_string(),
    }
}

/// Pick the override when given, otherwise the default local key.
fn local_key<'a>(default_key: &'a str, key_override: Option<&'a str>) -> &'a str {
    key_override.unwrap_or(default_key)
}

// ──────────────────────────────────────────────
// Group builder
// ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct GroupBuilder {
    key: String,
    version: u32,
    condition: Option<Expression>,
    validations: Vec<ValidationRule>,
    selection: SelectionMethod,
    items: Vec<SurveyItem>,
}

impl GroupBuilder {
    /// The root group of a survey.
    pub fn root(key: &str) -> Self {
        Self::with_key(key.to_string())
    }

    /// A child group of `parent_key`.
    pub fn child(parent_key: &str, default_key: &str, key_override: Option<&str>) -> Self {
        Self::with_key(compose_key(
            Some(parent_key),
            local_key(default_key, key_override),
        ))
    }

    fn with_key(key: String) -> Self {
        GroupBuilder {
            key,
            version: 1,
            condition: None,
            validations: Vec::new(),
            selection: SelectionMethod::Sequential,
            items: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn condition(mut self, condition: Expression) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn selection(mut self, selection: SelectionMethod) -> Self {
        self.selection = selection;
        self
    }

    pub fn validation(mut self, key: &str, severity: Severity, rule: Expression) -> Self {
        self.validations.push(ValidationRule {
            key: key.to_string(),
            severity,
            rule,
        });
        self
    }

    /// Append a built child item.
    pub fn item(mut self, item: SurveyItem) -> Self {
        self.items.push(item);
        self
    }

    /// Append a page break with key `<group>.<local>`.
    pub fn page_break(mut self, local: &str) -> Self {
        self.items.push(SurveyItem {
            key: compose_key(Some(&self.key), local),
            version: 0,
            condition: None,
            validations: Vec::new(),
            body: ItemBody::PageBreak,
        });
        self
    }

    /// Start a question under this group.
    pub fn question(
        &self,
        default_key: &str,
        key_override: Option<&str>,
        role: ResponseRole,
    ) -> QuestionBuilder {
        QuestionBuilder::new(&self.key, default_key, key_override, role)
    }

    /// Start a subgroup under this group.
    pub fn group(&self, default_key: &str, key_override: Option<&str>) -> GroupBuilder {
        GroupBuilder::child(&self.key, default_key, key_override)
    }

    pub fn build(self) -> SurveyItem {
        SurveyItem {
            key: self.key,
            version: self.version,
            condition: self.condition,
            validations: self.validations,
            body: ItemBody::Group {
                items: self.items,
                selection: self.selection,
            },
        }
    }
}

// ──────────────────────────────────────────────
// Question builder
// ──────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct QuestionBuilder {
    key: String,
    version: u32,
    role: ResponseRole,
    condition: Option<Expression>,
    validations: Vec<ValidationRule>,
    options: Vec<OptionDef>,
}

impl QuestionBuilder {
    pub fn new(
        parent_key: &str,
        default_key: &str,
        key_override: Option<&str>,
        role: ResponseRole,
    ) -> Self {
        QuestionBuilder {
            key: compose_key(Some(parent_key), local_key(default_key, key_override)),
            version: 1,
            role,
            condition: None,
            validations: Vec::new(),
            options: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn condition(mut self, condition: Expression) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn validation(mut self, key: &str, severity: Severity, rule: Expression) -> Self {
        self.validations.push(ValidationRule {
            key: key.to_string(),
            severity,
            rule,
        });
        self
    }

    pub fn option(self, key: &str) -> Self {
        self.option_def(OptionDef {
            key: key.to_string(),
            role: OptionRole::Option,
            display_condition: None,
            disabled: None,
        })
    }

    pub fn option_def(mut self, option: OptionDef) -> Self {
        self.options.push(option);
        self
    }

    pub fn build(self) -> SurveyItem {
        SurveyItem {
            key: self.key,
            version: self.version,
            condition: self.condition,
            validations: self.validations,
            body: ItemBody::Question {
                role: self.role,
                options: self.options,
            },
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
