//! Survey definition tree.
//!
//! Items are assembled once (by the builder or from interchange JSON) and
//! never mutated afterwards. They carry no respondent state; every
//! evaluation pass reads them against a fresh `ResponseContext`.

use std::fmt;
use std::str::FromStr;

use canvass_interchange::{
    ItemConstruct, OptionConstruct, SelectionConstruct, ValidationConstruct,
};

use super::EvalError;
use crate::expression::{parse_expression, Expression};

/// A node of the survey tree: a group, a question or a page break.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurveyItem {
    /// Full dot-path key (`parent.local`).
    pub key: String,
    /// Content revision marker, opaque to evaluation.
    pub version: u32,
    /// Visibility predicate; `None` means always visible.
    pub condition: Option<Expression>,
    pub validations: Vec<ValidationRule>,
    pub body: ItemBody,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemBody {
    Group {
        items: Vec<SurveyItem>,
        selection: SelectionMethod,
    },
    Question {
        role: ResponseRole,
        options: Vec<OptionDef>,
    },
    PageBreak,
}

/// How a group chooses which children to present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelectionMethod {
    #[default]
    Sequential,
    /// Show `n` children chosen pseudo-randomly per respondent.
    RandomSubset(usize),
}

/// Shape of the answer a question collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseRole {
    SingleChoice,
    MultipleChoice,
    DateInput,
    Matrix,
    Text,
    NumberInput,
    Dropdown,
    /// Informational content without an answer.
    Display,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptionRole {
    Option,
    TextInput,
    NumberInput,
    DateInput,
}

/// One answer option with its own display and disable logic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionDef {
    pub key: String,
    pub role: OptionRole,
    pub display_condition: Option<Expression>,
    pub disabled: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Blocks submission of the item when failed.
    Hard,
    /// Advisory only.
    Soft,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRule {
    pub key: String,
    pub severity: Severity,
    pub rule: Expression,
}

// ──────────────────────────────────────────────
// Names
// ──────────────────────────────────────────────

macro_rules! wire_names {
    ($ty:ident, $what:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            pub fn name(self) -> &'static str {
                match self {
                    $($ty::$variant => $name),+
                }
            }
        }

        impl FromStr for $ty {
            type Err = EvalError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok($ty::$variant),)+
                    other => Err(EvalError::deserialize(format!(
                        concat!("unknown ", $what, ": '{}'"),
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

wire_names!(ResponseRole, "response role", {
    SingleChoice => "singleChoice",
    MultipleChoice => "multipleChoice",
    DateInput => "dateInput",
    Matrix => "matrix",
    Text => "text",
    NumberInput => "numberInput",
    Dropdown => "dropdown",
    Display => "display",
});

wire_names!(OptionRole, "option role", {
    Option => "option",
    TextInput => "textInput",
    NumberInput => "numberInput",
    DateInput => "dateInput",
});

wire_names!(Severity, "severity", {
    Hard => "hard",
    Soft => "soft",
});

// ──────────────────────────────────────────────
// Tree access
// ──────────────────────────────────────────────

impl SurveyItem {
    pub fn is_group(&self) -> bool {
        matches!(self.body, ItemBody::Group { .. })
    }

    pub fn is_page_break(&self) -> bool {
        matches!(self.body, ItemBody::PageBreak)
    }

    /// Children of a group; empty for questions and page breaks.
    pub fn children(&self) -> &[SurveyItem] {
        match &self.body {
            ItemBody::Group { items, .. } => items,
            _ => &[],
        }
    }

    pub fn options(&self) -> &[OptionDef] {
        match &self.body {
            ItemBody::Question { options, .. } => options,
            _ => &[],
        }
    }

    /// All items of the subtree in definition order, this item first.
    pub fn descendants(&self) -> Vec<&SurveyItem> {
        let mut out = Vec::new();
        let mut stack = vec![self];
        while let Some(item) = stack.pop() {
            out.push(item);
            stack.extend(item.children().iter().rev());
        }
        out
    }

    /// Find an item of the subtree by full key.
    pub fn find(&self, key: &str) -> Option<&SurveyItem> {
        self.descendants().into_iter().find(|i| i.key == key)
    }

    /// Convert from the interchange representation.
    pub fn from_interchange(c: &ItemConstruct) -> Result<Self, EvalError> {
        match c {
            ItemConstruct::Group(g) => Ok(SurveyItem {
                key: g.key.clone(),
                version: g.version,
                condition: parse_optional(&g.condition)?,
                validations: parse_validations(&g.validations)?,
                body: ItemBody::Group {
                    items: g
                        .items
                        .iter()
                        .map(SurveyItem::from_interchange)
                        .collect::<Result<_, _>>()?,
                    selection: match g.selection {
                        SelectionConstruct::Sequential => SelectionMethod::Sequential,
                        SelectionConstruct::RandomSubset { n } => SelectionMethod::RandomSubset(n),
                    },
                },
            }),
            ItemConstruct::Question(q) => Ok(SurveyItem {
                key: q.key.clone(),
                version: q.version,
                condition: parse_optional(&q.condition)?,
                validations: parse_validations(&q.validations)?,
                body: ItemBody::Question {
                    role: q.role.parse()?,
                    options: q
                        .options
                        .iter()
                        .map(parse_option)
                        .collect::<Result<_, _>>()?,
                },
            }),
            ItemConstruct::PageBreak(p) => Ok(SurveyItem {
                key: p.key.clone(),
                version: 0,
                condition: parse_optional(&p.condition)?,
                validations: Vec::new(),
                body: ItemBody::PageBreak,
            }),
        }
    }
}

fn parse_optional(v: &Option<serde_json::Value>) -> Result<Option<Expression>, EvalError> {
    v.as_ref().map(parse_expression).transpose()
}

fn parse_validations(vs: &[ValidationConstruct]) -> Result<Vec<ValidationRule>, EvalError> {
    vs.iter()
        .map(|v| {
            Ok(ValidationRule {
                key: v.key.clone(),
                severity: v.severity.parse()?,
                rule: parse_expression(&v.rule)?,
            })
        })
        .collect()
}

fn parse_option(o: &OptionConstruct) -> Result<OptionDef, EvalError> {
    Ok(OptionDef {
        key: o.key.clone(),
        role: o.role.parse()?,
        display_condition: parse_optional(&o.display_condition)?,
        disabled: parse_optional(&o.disabled)?,
    })
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
