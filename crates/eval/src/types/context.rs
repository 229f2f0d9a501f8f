//! The per-respondent evaluation context.

use std::collections::BTreeMap;

use time::OffsetDateTime;

use super::{EvalError, ResponseItem, Value};

/// Read-only snapshot of one respondent's answers, attributes and clock.
///
/// The evaluation time is fixed when the context is built; every
/// expression evaluated against the same context sees the same instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseContext {
    responses: BTreeMap<String, ResponseItem>,
    attributes: BTreeMap<String, Value>,
    participant_id: Option<String>,
    evaluation_time: i64,
}

impl ResponseContext {
    /// Empty context evaluated at `evaluation_time` (unix seconds).
    pub fn new(evaluation_time: i64) -> Self {
        ResponseContext {
            responses: BTreeMap::new(),
            attributes: BTreeMap::new(),
            participant_id: None,
            evaluation_time,
        }
    }

    pub fn at(time: OffsetDateTime) -> Self {
        Self::new(time.unix_timestamp())
    }

    pub fn now() -> Self {
        Self::at(OffsetDateTime::now_utc())
    }

    pub fn with_participant_id(mut self, id: impl Into<String>) -> Self {
        self.participant_id = Some(id.into());
        self
    }

    pub fn with_response(mut self, item: ResponseItem) -> Self {
        self.insert_response(item);
        self
    }

    /// Set an attribute. Dotted paths (`"participantFlags.prev"`) create
    /// nested records, replacing any scalar found on the way.
    pub fn with_attribute(mut self, path: &str, value: impl Into<Value>) -> Self {
        self.insert_attribute(path, value.into());
        self
    }

    pub fn insert_response(&mut self, item: ResponseItem) {
        self.responses.insert(item.key.clone(), item);
    }

    pub fn insert_attribute(&mut self, path: &str, value: Value) {
        let mut segments: Vec<&str> = path.split('.').collect();
        let last = match segments.pop() {
            Some(last) => last,
            None => return,
        };
        let mut map = &mut self.attributes;
        for segment in segments {
            let entry = map
                .entry(segment.to_string())
                .or_insert_with(|| Value::Record(BTreeMap::new()));
            if !matches!(entry, Value::Record(_)) {
                *entry = Value::Record(BTreeMap::new());
            }
            map = match entry {
                Value::Record(fields) => fields,
                _ => return,
            };
        }
        map.insert(last.to_string(), value);
    }

    pub fn response(&self, item_key: &str) -> Option<&ResponseItem> {
        self.responses.get(item_key)
    }

    pub fn responses(&self) -> impl Iterator<Item = &ResponseItem> {
        self.responses.values()
    }

    pub fn participant_id(&self) -> Option<&str> {
        self.participant_id.as_deref()
    }

    pub fn evaluation_time(&self) -> i64 {
        self.evaluation_time
    }

    pub fn evaluation_datetime(&self) -> Result<OffsetDateTime, EvalError> {
        OffsetDateTime::from_unix_timestamp(self.evaluation_time).map_err(|e| {
            EvalError::Overflow {
                message: format!("evaluation time {}: {}", self.evaluation_time, e),
            }
        })
    }

    /// Attribute at a dotted path, if present.
    pub fn attribute(&self, path: &str) -> Option<&Value> {
        let mut segments = path.split('.');
        let first = self.attributes.get(segments.next()?)?;
        segments.try_fold(first, |value, segment| match value {
            Value::Record(fields) => fields.get(segment),
            _ => None,
        })
    }

    /// The record returned by `getContext()`: attributes plus
    /// `participantId` and `evaluationTime`.
    pub fn root_record(&self) -> Value {
        let mut fields = self.attributes.clone();
        if let Some(id) = &self.participant_id {
            fields.insert("participantId".to_string(), Value::Text(id.clone()));
        }
        fields.insert(
            "evaluationTime".to_string(),
            Value::from(self.evaluation_time),
        );
        Value::Record(fields)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ResponseNode;

    #[test]
    fn dotted_attributes_nest() {
        let ctx = ResponseContext::new(0)
            .with_attribute("participantFlags.prev", "1")
            .with_attribute("participantFlags.age", 40);
        assert_eq!(ctx.attribute("participantFlags.prev"), Some(&Value::from("1")));
        assert_eq!(ctx.attribute("participantFlags.age"), Some(&Value::from(40)));
        assert!(matches!(
            ctx.attribute("participantFlags"),
            Some(Value::Record(_))
        ));
        assert_eq!(ctx.attribute("participantFlags.missing"), None);
    }

    #[test]
    fn nested_insert_replaces_scalar() {
        let ctx = ResponseContext::new(0)
            .with_attribute("mode", "web")
            .with_attribute("mode.kind", "kiosk");
        assert_eq!(ctx.attribute("mode.kind"), Some(&Value::from("kiosk")));
    }

    #[test]
    fn root_record_has_reserved_fields() {
        let ctx = ResponseContext::new(1_000)
            .with_participant_id("p-7")
            .with_attribute("lang", "nl");
        let Value::Record(fields) = ctx.root_record() else {
            panic!("root must be a record");
        };
        assert_eq!(fields.get("participantId"), Some(&Value::from("p-7")));
        assert_eq!(fields.get("evaluationTime"), Some(&Value::from(1_000)));
        assert_eq!(fields.get("lang"), Some(&Value::from("nl")));
    }

    #[test]
    fn responses_are_keyed() {
        let ctx = ResponseContext::new(0).with_response(ResponseItem::new(
            "s.q1",
            ResponseNode::group("rg", vec![]),
        ));
        assert!(ctx.response("s.q1").is_some());
        assert!(ctx.response("s.q2").is_none());
        assert_eq!(ctx.responses().count(), 1);
    }

    #[test]
    fn evaluation_datetime_matches_epoch() {
        let ctx = ResponseContext::new(86_400);
        let dt = ctx.evaluation_datetime().unwrap();
        assert_eq!(dt.unix_timestamp(), 86_400);
    }
}
