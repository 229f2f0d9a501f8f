//! ResponseContext assembly from a response document.
//!
//! The document's evaluation time may be unix seconds or an RFC 3339
//! timestamp. Without one, the context is evaluated at the current time.
//! Attribute keys containing dots are nested into records, so
//! `{"participantFlags.prev": "1"}` and
//! `{"participantFlags": {"prev": "1"}}` assemble to the same context.

use canvass_interchange::{EvaluationTime, ResponseDocument};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::types::{EvalError, ResponseContext, ResponseItem, ResponseNode, Value};

/// Assemble a ResponseContext from a parsed response document.
pub fn assemble_context(doc: &ResponseDocument) -> Result<ResponseContext, EvalError> {
    let mut ctx = match &doc.evaluation_time {
        Some(t) => ResponseContext::new(parse_evaluation_time(t)?),
        None => ResponseContext::now(),
    };
    if let Some(id) = &doc.participant_id {
        ctx = ctx.with_participant_id(id.clone());
    }

    for (name, raw) in &doc.attributes {
        ctx.insert_attribute(name, Value::from_json(raw)?);
    }

    for response in &doc.responses {
        let node = ResponseNode::from_interchange(&response.response)?;
        ctx.insert_response(ResponseItem::new(response.key.clone(), node));
    }

    tracing::debug!(
        participant = ctx.participant_id().unwrap_or("-"),
        responses = doc.responses.len(),
        evaluation_time = ctx.evaluation_time(),
        "assembled response context"
    );
    Ok(ctx)
}

/// Unix seconds of an evaluation time.
pub fn parse_evaluation_time(t: &EvaluationTime) -> Result<i64, EvalError> {
    match t {
        EvaluationTime::Unix(secs) => Ok(*secs),
        EvaluationTime::Rfc3339(s) => OffsetDateTime::parse(s, &Rfc3339)
            .map(|dt| dt.unix_timestamp())
            .map_err(|e| EvalError::DeserializeError {
                message: format!("evaluationTime '{}' is not RFC 3339: {}", s, e),
            }),
    }
}
