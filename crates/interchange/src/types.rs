//! Typed structs representing the Canvass interchange JSON format.
//!
//! Expression-bearing fields (`condition`, `rule`, `displayCondition`,
//! `disabled`) are stored as `serde_json::Value` so that every consumer can
//! parse them into its own representation.

use serde::{Deserialize, Serialize};

/// Interchange format version written by current tooling.
pub const CANVASS_FORMAT_VERSION: &str = "1.0";

// ── Survey definition ───────────────────────────────────────────────

/// Top-level survey document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SurveyDocument {
    /// Survey identifier.
    pub id: String,
    /// Interchange format version (e.g. "1.0").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canvass: Option<String>,
    /// The root item of the survey tree, usually a group.
    pub root: ItemConstruct,
}

/// A single node of the survey tree, dispatched on `kind`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ItemConstruct {
    Group(GroupConstruct),
    Question(QuestionConstruct),
    PageBreak(PageBreakConstruct),
}

impl ItemConstruct {
    pub fn key(&self) -> &str {
        match self {
            ItemConstruct::Group(g) => &g.key,
            ItemConstruct::Question(q) => &q.key,
            ItemConstruct::PageBreak(p) => &p.key,
        }
    }
}

/// A group item with ordered children.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupConstruct {
    pub key: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<ValidationConstruct>,
    #[serde(default)]
    pub selection: SelectionConstruct,
    #[serde(default)]
    pub items: Vec<ItemConstruct>,
}

/// How a group picks the children it shows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "method", rename_all = "camelCase")]
pub enum SelectionConstruct {
    #[default]
    Sequential,
    RandomSubset {
        n: usize,
    },
}

/// A question (leaf) item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionConstruct {
    pub key: String,
    #[serde(default)]
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validations: Vec<ValidationConstruct>,
    /// Response role name, e.g. "singleChoice" or "dateInput".
    pub role: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionConstruct>,
}

/// A page break marker between items.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageBreakConstruct {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<serde_json::Value>,
}

/// One answer option of a question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptionConstruct {
    pub key: String,
    #[serde(default = "default_option_role")]
    pub role: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_condition: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<serde_json::Value>,
}

fn default_option_role() -> String {
    "option".to_string()
}

/// A validation rule attached to an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationConstruct {
    pub key: String,
    /// "hard" or "soft".
    pub severity: String,
    pub rule: serde_json::Value,
}

// ── Response documents ──────────────────────────────────────────────

/// A respondent's accumulated answers plus the attributes and clock the
/// evaluator should see.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evaluation_time: Option<EvaluationTime>,
    /// Participant attributes. Dotted keys are nested by the evaluator.
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub responses: Vec<ResponseConstruct>,
}

/// Evaluation time, either unix seconds or an RFC 3339 timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum EvaluationTime {
    Unix(i64),
    Rfc3339(String),
}

/// The response to one survey item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseConstruct {
    pub key: String,
    pub response: ResponseNodeConstruct,
}

/// A response node. Nodes with `items` are groups; nodes without are
/// leaves carrying an optional scalar `value`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResponseNodeConstruct {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<ResponseNodeConstruct>>,
}
