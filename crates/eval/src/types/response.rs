//! Per-item response representation.
//!
//! A response is a small tree: groups of named child nodes (option sets,
//! matrices, dropdown groups) ending in leaves that carry an optional
//! scalar value (free text, a date epoch, a number). A selected option is a
//! child node whose key is the option key.

use canvass_interchange::ResponseNodeConstruct;

use super::{EvalError, Value};

/// One node of a response tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseNode {
    Leaf { key: String, value: Option<Value> },
    Group { key: String, items: Vec<ResponseNode> },
}

impl ResponseNode {
    pub fn leaf(key: impl Into<String>) -> Self {
        ResponseNode::Leaf {
            key: key.into(),
            value: None,
        }
    }

    pub fn leaf_with_value(key: impl Into<String>, value: impl Into<Value>) -> Self {
        ResponseNode::Leaf {
            key: key.into(),
            value: Some(value.into()),
        }
    }

    pub fn group(key: impl Into<String>, items: Vec<ResponseNode>) -> Self {
        ResponseNode::Group {
            key: key.into(),
            items,
        }
    }

    pub fn key(&self) -> &str {
        match self {
            ResponseNode::Leaf { key, .. } | ResponseNode::Group { key, .. } => key,
        }
    }

    /// Child node with the given key. Leaves have no children.
    pub fn child(&self, key: &str) -> Option<&ResponseNode> {
        match self {
            ResponseNode::Group { items, .. } => items.iter().find(|n| n.key() == key),
            ResponseNode::Leaf { .. } => None,
        }
    }

    /// Keys of the selected children, in submission order.
    pub fn selected_keys(&self) -> Vec<&str> {
        match self {
            ResponseNode::Group { items, .. } => items.iter().map(|n| n.key()).collect(),
            ResponseNode::Leaf { .. } => Vec::new(),
        }
    }

    /// A group is empty when every child is empty, so a group holding only
    /// a cleared option set is empty too. A leaf is empty when it carries a
    /// null or empty-text value. A bare leaf counts as a selection.
    pub fn is_empty(&self) -> bool {
        match self {
            ResponseNode::Group { items, .. } => items.iter().all(ResponseNode::is_empty),
            ResponseNode::Leaf { value, .. } => match value {
                None => false,
                Some(Value::Null) => true,
                Some(Value::Text(s)) => s.is_empty(),
                Some(_) => false,
            },
        }
    }

    /// Resolve a dot path whose first segment names this node.
    ///
    /// `"rg.mcg"` matches when this node's key is `"rg"` and it has a
    /// child `"mcg"`.
    pub fn resolve(&self, path: &str) -> Option<&ResponseNode> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        if first != self.key() {
            return None;
        }
        segments.try_fold(self, |node, segment| node.child(segment))
    }

    /// Convert from the interchange representation.
    pub fn from_interchange(c: &ResponseNodeConstruct) -> Result<Self, EvalError> {
        match &c.items {
            Some(items) => Ok(ResponseNode::Group {
                key: c.key.clone(),
                items: items
                    .iter()
                    .map(ResponseNode::from_interchange)
                    .collect::<Result<_, _>>()?,
            }),
            None => Ok(ResponseNode::Leaf {
                key: c.key.clone(),
                value: c.value.as_ref().map(Value::from_json).transpose()?,
            }),
        }
    }
}

/// The submitted answer to one survey item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseItem {
    /// Full dot-path key of the answered item.
    pub key: String,
    pub response: ResponseNode,
}

impl ResponseItem {
    pub fn new(key: impl Into<String>, response: ResponseNode) -> Self {
        ResponseItem {
            key: key.into(),
            response,
        }
    }

    /// Node at `path`, where the first segment names the root node.
    pub fn node_at(&self, path: &str) -> Option<&ResponseNode> {
        self.response.resolve(path)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
