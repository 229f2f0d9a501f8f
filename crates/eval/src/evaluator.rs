//! Expression evaluator.
//!
//! Evaluates an expression tree against a `ResponseContext`. Evaluation is
//! pure: the context is only read, and the evaluation time comes from the
//! context so every call within one pass sees the same instant.
//!
//! Response accessors split into two families. Presence tests
//! (`hasResponse`, `responseHasKeysAny`, ...) treat a missing item as
//! `false`. Value accessors (`getResponseItem`) fail with
//! `MissingResponse` / `MissingResponsePath`, except the `*As*` variants
//! which yield `Null`.

use std::cmp::Ordering;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use time::OffsetDateTime;

use crate::expression::{Expression, Operator};
use crate::numeric;
use crate::types::{EvalError, ResponseContext, ResponseNode, Value};

/// Evaluate an expression against a context.
pub fn evaluate(expr: &Expression, ctx: &ResponseContext) -> Result<Value, EvalError> {
    match expr {
        Expression::Literal(value) => Ok(value.clone()),
        Expression::Call { op, args } => {
            let arity = op.arity();
            if !arity.accepts(args.len()) {
                return Err(EvalError::Arity {
                    op: op.name().to_string(),
                    expected: arity.to_string(),
                    got: args.len(),
                });
            }
            let result = eval_call(*op, args, ctx);
            tracing::trace!(op = op.name(), ok = result.is_ok(), "evaluated call");
            result
        }
    }
}

/// Evaluate and require a boolean result.
pub fn evaluate_bool(expr: &Expression, ctx: &ResponseContext) -> Result<bool, EvalError> {
    evaluate(expr, ctx)?.as_bool("condition")
}

fn eval_call(op: Operator, args: &[Expression], ctx: &ResponseContext) -> Result<Value, EvalError> {
    match op {
        Operator::And => {
            for arg in args {
                if !evaluate(arg, ctx)?.as_bool(op.name())? {
                    // Short-circuit: remaining operands are not evaluated
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }

        Operator::Or => {
            for arg in args {
                if evaluate(arg, ctx)?.as_bool(op.name())? {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }

        Operator::Not => {
            let b = evaluate(&args[0], ctx)?.as_bool(op.name())?;
            Ok(Value::Bool(!b))
        }

        Operator::Eq => {
            let left = evaluate(&args[0], ctx)?;
            let right = evaluate(&args[1], ctx)?;
            Ok(Value::Bool(numeric::values_equal(&left, &right)?))
        }

        Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte => {
            let left = evaluate(&args[0], ctx)?;
            let right = evaluate(&args[1], ctx)?;
            let result = match numeric::compare_values(op.name(), &left, &right)? {
                None => false,
                Some(ord) => match op {
                    Operator::Lt => ord == Ordering::Less,
                    Operator::Lte => ord != Ordering::Greater,
                    Operator::Gt => ord == Ordering::Greater,
                    _ => ord != Ordering::Less,
                },
            };
            Ok(Value::Bool(result))
        }

        Operator::IsDefined => match evaluate(&args[0], ctx) {
            Ok(v) => Ok(Value::Bool(!v.is_null())),
            Err(e) if e.is_absence() => Ok(Value::Bool(false)),
            Err(e) => Err(e),
        },

        Operator::Sum => {
            let values = args
                .iter()
                .map(|a| evaluate(a, ctx))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Value::Number(numeric::sum_values(&values)?))
        }

        Operator::HasResponse => {
            let (item_key, path) = item_and_path(op, args, ctx)?;
            let found = lookup_node(ctx, &item_key, &path).is_some_and(|n| !n.is_empty());
            Ok(Value::Bool(found))
        }

        Operator::ResponseHasKeysAny => {
            let (item_key, path) = item_and_path(op, args, ctx)?;
            let keys = key_list(op, &args[2..], ctx)?;
            let result = lookup_node(ctx, &item_key, &path).is_some_and(|node| {
                node.selected_keys()
                    .iter()
                    .any(|selected| keys.iter().any(|k| k == selected))
            });
            Ok(Value::Bool(result))
        }

        Operator::ResponseHasKeysAll => {
            let (item_key, path) = item_and_path(op, args, ctx)?;
            let keys = key_list(op, &args[2..], ctx)?;
            let result = !keys.is_empty()
                && lookup_node(ctx, &item_key, &path).is_some_and(|node| {
                    let selected = node.selected_keys();
                    keys.iter().all(|k| selected.contains(&k.as_str()))
                });
            Ok(Value::Bool(result))
        }

        Operator::ResponseHasOnlyKeysOtherThan => {
            let (item_key, path) = item_and_path(op, args, ctx)?;
            let excluded = key_list(op, &args[2..], ctx)?;
            let result = lookup_node(ctx, &item_key, &path).is_some_and(|node| {
                let selected = node.selected_keys();
                !selected.is_empty()
                    && selected
                        .iter()
                        .all(|s| !excluded.iter().any(|k| k == s))
            });
            Ok(Value::Bool(result))
        }

        Operator::GetResponseItem => {
            let (item_key, path) = item_and_path(op, args, ctx)?;
            let item = ctx
                .response(&item_key)
                .ok_or_else(|| EvalError::MissingResponse {
                    item_key: item_key.clone(),
                })?;
            let node = item
                .node_at(&path)
                .ok_or_else(|| EvalError::MissingResponsePath {
                    item_key: item_key.clone(),
                    path: path.clone(),
                })?;
            match node {
                ResponseNode::Leaf { value, .. } => Ok(value.clone().unwrap_or(Value::Null)),
                ResponseNode::Group { .. } => Err(EvalError::type_error(
                    op.name(),
                    format!(
                        "response node '{}' of item '{}' is a group, not a value",
                        path, item_key
                    ),
                )),
            }
        }

        Operator::GetResponseValueAsNum => {
            let (item_key, path) = item_and_path(op, args, ctx)?;
            let value = leaf_value(ctx, &item_key, &path);
            Ok(match value {
                Some(v) => v
                    .as_number(op.name())
                    .map(Value::Number)
                    .unwrap_or(Value::Null),
                None => Value::Null,
            })
        }

        Operator::GetResponseValueAsStr => {
            let (item_key, path) = item_and_path(op, args, ctx)?;
            let value = leaf_value(ctx, &item_key, &path);
            Ok(value
                .and_then(|v| v.to_text())
                .map(Value::Text)
                .unwrap_or(Value::Null))
        }

        Operator::CountResponseItems => {
            let (item_key, path) = item_and_path(op, args, ctx)?;
            let count = lookup_node(ctx, &item_key, &path)
                .map(|n| n.selected_keys().len())
                .unwrap_or(0);
            Ok(Value::Number(Decimal::from(count)))
        }

        Operator::GetContext => Ok(ctx.root_record()),

        Operator::GetAttribute => {
            let base = evaluate(&args[0], ctx)?;
            let name = text_arg(op, &args[1], ctx)?;
            let Value::Record(_) = base else {
                return Err(EvalError::type_error(
                    op.name(),
                    format!("attribute base must be a Record, got {}", base.type_name()),
                ));
            };
            name.split('.')
                .try_fold(&base, |value, segment| match value {
                    Value::Record(fields) => fields.get(segment),
                    _ => None,
                })
                .cloned()
                .ok_or_else(|| EvalError::MissingAttribute { name: name.clone() })
        }

        Operator::HasParticipantFlag => {
            let key = text_arg(op, &args[0], ctx)?;
            Ok(Value::Bool(participant_flag(ctx, &key).is_some()))
        }

        Operator::HasParticipantFlagKeyAndValue => {
            let key = text_arg(op, &args[0], ctx)?;
            let expected = evaluate(&args[1], ctx)?;
            let matches = match participant_flag(ctx, &key) {
                Some(actual) => numeric::values_equal(actual, &expected)?,
                None => false,
            };
            Ok(Value::Bool(matches))
        }

        Operator::TimestampWithOffset => {
            let seconds = evaluate(&args[0], ctx)?.as_number(op.name())?;
            let base = match args.get(1) {
                Some(reference) => evaluate(reference, ctx)?.as_number(op.name())?,
                None => Decimal::from(ctx.evaluation_time()),
            };
            Ok(Value::Number(numeric::offset_timestamp(base, seconds)?))
        }

        Operator::DateResponseDiffFromNow => {
            let (item_key, path) = item_and_path(op, args, ctx)?;
            let unit = text_arg(op, &args[2], ctx)?;
            let absolute = match args.get(3) {
                Some(a) => evaluate(a, ctx)?.as_bool(op.name())?,
                None => false,
            };
            let epoch = match leaf_value(ctx, &item_key, &path) {
                Some(v) => v.as_number(op.name())?,
                None => return Ok(Value::Null),
            };
            let diff = date_diff(op, epoch, ctx, &unit)?;
            let diff = if absolute { diff.abs() } else { diff };
            Ok(Value::from(diff))
        }
    }
}

// ──────────────────────────────────────────────
// Argument helpers
// ──────────────────────────────────────────────

fn text_arg(op: Operator, arg: &Expression, ctx: &ResponseContext) -> Result<String, EvalError> {
    match evaluate(arg, ctx)? {
        Value::Text(s) => Ok(s),
        other => Err(EvalError::type_error(
            op.name(),
            format!("expected Text argument, got {}", other.type_name()),
        )),
    }
}

fn item_and_path(
    op: Operator,
    args: &[Expression],
    ctx: &ResponseContext,
) -> Result<(String, String), EvalError> {
    Ok((text_arg(op, &args[0], ctx)?, text_arg(op, &args[1], ctx)?))
}

/// Option keys listed after the item and path. Numbers are accepted and
/// compared by their string form.
fn key_list(
    op: Operator,
    args: &[Expression],
    ctx: &ResponseContext,
) -> Result<Vec<String>, EvalError> {
    args.iter()
        .map(|a| {
            let v = evaluate(a, ctx)?;
            match &v {
                Value::Text(s) => Ok(s.clone()),
                Value::Number(_) => Ok(v.to_text().unwrap_or_default()),
                other => Err(EvalError::type_error(
                    op.name(),
                    format!("option keys must be Text, got {}", other.type_name()),
                )),
            }
        })
        .collect()
}

// ──────────────────────────────────────────────
// Context lookups
// ──────────────────────────────────────────────

fn lookup_node<'a>(
    ctx: &'a ResponseContext,
    item_key: &str,
    path: &str,
) -> Option<&'a ResponseNode> {
    ctx.response(item_key)?.node_at(path)
}

fn leaf_value<'a>(ctx: &'a ResponseContext, item_key: &str, path: &str) -> Option<&'a Value> {
    match lookup_node(ctx, item_key, path)? {
        ResponseNode::Leaf { value, .. } => value.as_ref().filter(|v| !v.is_null()),
        ResponseNode::Group { .. } => None,
    }
}

fn participant_flag<'a>(ctx: &'a ResponseContext, key: &str) -> Option<&'a Value> {
    match ctx.attribute("participantFlags")? {
        Value::Record(flags) => flags.get(key),
        _ => None,
    }
}

// ──────────────────────────────────────────────
// Date arithmetic
// ──────────────────────────────────────────────

/// Whole units between the evaluation time and a stored epoch, truncated
/// toward zero. Positive when the stored date lies in the future.
fn date_diff(
    op: Operator,
    epoch: Decimal,
    ctx: &ResponseContext,
    unit: &str,
) -> Result<i64, EvalError> {
    let seconds = epoch.trunc().to_i64().ok_or_else(|| EvalError::Overflow {
        message: format!("date value {} out of range", epoch),
    })?;
    let then = OffsetDateTime::from_unix_timestamp(seconds).map_err(|e| EvalError::Overflow {
        message: format!("date value {}: {}", seconds, e),
    })?;
    let now = ctx.evaluation_datetime()?;
    let span = then - now;
    match unit {
        "hours" => Ok(span.whole_hours()),
        "days" => Ok(span.whole_days()),
        "weeks" => Ok(span.whole_weeks()),
        "months" => Ok(whole_months(now, then)),
        "years" => Ok(whole_months(now, then) / 12),
        other => Err(EvalError::type_error(
            op.name(),
            format!(
                "unknown date unit '{}' (expected years, months, weeks, days or hours)",
                other
            ),
        )),
    }
}

fn whole_months(from: OffsetDateTime, to: OffsetDateTime) -> i64 {
    let mut months = (i64::from(to.year()) - i64::from(from.year())) * 12
        + (i64::from(u8::from(to.month())) - i64::from(u8::from(from.month())));
    let to_rest = (to.day(), to.time());
    let from_rest = (from.day(), from.time());
    if months > 0 && to_rest < from_rest {
        months -= 1;
    } else if months < 0 && to_rest > from_rest {
        months += 1;
    }
    months
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::build::*;
    use crate::types::ResponseItem;

    const T: i64 = 1_700_000_000;

    fn multiple_choice(item_key: &str, selected: &[&str]) -> ResponseItem {
        ResponseItem::new(
            item_key,
            ResponseNode::group(
                "rg",
                vec![ResponseNode::group(
                    "mcg",
                    selected.iter().map(|k| ResponseNode::leaf(*k)).collect(),
                )],
            ),
        )
    }

    fn ctx_with(items: Vec<ResponseItem>) -> ResponseContext {
        items
            .into_iter()
            .fold(ResponseContext::new(T), |ctx, item| ctx.with_response(item))
    }

    fn eval(expr: Expression, ctx: &ResponseContext) -> Value {
        evaluate(&expr, ctx).unwrap()
    }

    #[test]
    fn and_short_circuits_before_type_errors() {
        let ctx = ResponseContext::new(T);
        let expr = and(vec![lit(false), lit("not a bool")]);
        assert_eq!(eval(expr, &ctx), Value::Bool(false));
    }

    #[test]
    fn and_requires_booleans() {
        let ctx = ResponseContext::new(T);
        let err = evaluate(&and(vec![lit(true), lit(1)]), &ctx).unwrap_err();
        assert!(matches!(err, EvalError::TypeError { .. }));
    }

    #[test]
    fn or_and_not() {
        let ctx = ResponseContext::new(T);
        assert_eq!(eval(or(vec![lit(false), lit(true)]), &ctx), Value::Bool(true));
        assert_eq!(eval(not(lit(true)), &ctx), Value::Bool(false));
    }

    #[test]
    fn eq_coerces_to_string_when_text_involved() {
        let ctx = ResponseContext::new(T);
        assert_eq!(eval(eq(lit("2"), lit(2)), &ctx), Value::Bool(true));
        assert_eq!(eval(eq(lit(2), lit(3)), &ctx), Value::Bool(false));
    }

    #[test]
    fn direct_call_with_bad_arity_fails() {
        let ctx = ResponseContext::new(T);
        let expr = Expression::Call {
            op: Operator::Eq,
            args: vec![lit(1)],
        };
        assert!(matches!(
            evaluate(&expr, &ctx),
            Err(EvalError::Arity { got: 1, .. })
        ));
    }

    #[test]
    fn keys_any_with_no_keys_is_false() {
        let ctx = ctx_with(vec![multiple_choice("s.a", &["0"])]);
        assert_eq!(
            eval(response_has_keys_any("s.a", "rg.mcg", &[]), &ctx),
            Value::Bool(false)
        );
    }

    #[test]
    fn keys_any_matches_selection() {
        let ctx = ctx_with(vec![multiple_choice("s.a", &["0", "3"])]);
        assert_eq!(
            eval(response_has_keys_any("s.a", "rg.mcg", &["1", "3"]), &ctx),
            Value::Bool(true)
        );
        assert_eq!(
            eval(response_has_keys_any("s.a", "rg.mcg", &["1", "2"]), &ctx),
            Value::Bool(false)
        );
    }

    #[test]
    fn keys_all() {
        let ctx = ctx_with(vec![multiple_choice("s.a", &["0", "3"])]);
        assert_eq!(
            eval(response_has_keys_all("s.a", "rg.mcg", &["0", "3"]), &ctx),
            Value::Bool(true)
        );
        assert_eq!(
            eval(response_has_keys_all("s.a", "rg.mcg", &["0", "1"]), &ctx),
            Value::Bool(false)
        );
        assert_eq!(
            eval(response_has_keys_all("s.a", "rg.mcg", &[]), &ctx),
            Value::Bool(false)
        );
    }

    #[test]
    fn only_keys_other_than() {
        let ctx = ctx_with(vec![multiple_choice("s.a", &["1", "2"])]);
        assert_eq!(
            eval(response_has_only_keys_other_than("s.a", "rg.mcg", &["0"]), &ctx),
            Value::Bool(true)
        );
        assert_eq!(
            eval(response_has_only_keys_other_than("s.a", "rg.mcg", &["2"]), &ctx),
            Value::Bool(false)
        );
    }

    #[test]
    fn only_keys_other_than_requires_selection() {
        let ctx = ctx_with(vec![multiple_choice("s.a", &[])]);
        assert_eq!(
            eval(response_has_only_keys_other_than("s.a", "rg.mcg", &["0"]), &ctx),
            Value::Bool(false)
        );
    }

    #[test]
    fn cleared_selection_has_no_response() {
        let ctx = ctx_with(vec![multiple_choice("s.a", &[])]);
        assert_eq!(eval(has_response("s.a", "rg"), &ctx), Value::Bool(false));
        assert_eq!(eval(has_response("s.a", "rg.mcg"), &ctx), Value::Bool(false));

        let ctx = ctx_with(vec![multiple_choice("s.a", &["2"])]);
        assert_eq!(eval(has_response("s.a", "rg"), &ctx), Value::Bool(true));
    }

    #[test]
    fn keys_any_and_only_other_than_never_both_hold() {
        let excluded = ["0", "1"];
        let contexts = [
            (ctx_with(vec![multiple_choice("s.a", &["1"])]), "inside"),
            (ctx_with(vec![multiple_choice("s.a", &["3"])]), "outside"),
            (ctx_with(vec![multiple_choice("s.a", &["0", "3"])]), "mixed"),
            (ResponseContext::new(T), "unanswered"),
        ];
        for (ctx, label) in &contexts {
            let any = eval(response_has_keys_any("s.a", "rg.mcg", &excluded), ctx);
            let others = eval(
                response_has_only_keys_other_than("s.a", "rg.mcg", &excluded),
                ctx,
            );
            assert!(
                !(any == Value::Bool(true) && others == Value::Bool(true)),
                "both true for {label} selection"
            );
            let expected = match *label {
                "inside" | "mixed" => (true, false),
                "outside" => (false, true),
                _ => (false, false),
            };
            assert_eq!(
                (any, others),
                (Value::Bool(expected.0), Value::Bool(expected.1)),
                "{label} selection"
            );
        }
    }

    #[test]
    fn absent_item_is_false_for_presence_tests() {
        let ctx = ResponseContext::new(T);
        for expr in [
            has_response("s.x", "rg"),
            response_has_keys_any("s.x", "rg.mcg", &["0"]),
            response_has_keys_all("s.x", "rg.mcg", &["0"]),
            response_has_only_keys_other_than("s.x", "rg.mcg", &["0"]),
        ] {
            assert_eq!(eval(expr, &ctx), Value::Bool(false));
        }
    }

    #[test]
    fn get_response_item_fails_when_absent() {
        let ctx = ResponseContext::new(T);
        let err = evaluate(&get_response_item("s.x", "rg.date"), &ctx).unwrap_err();
        assert_eq!(
            err,
            EvalError::MissingResponse {
                item_key: "s.x".to_string()
            }
        );
    }

    #[test]
    fn get_response_item_reads_leaf_value() {
        let ctx = ctx_with(vec![ResponseItem::new(
            "s.d",
            ResponseNode::group("rg", vec![ResponseNode::leaf_with_value("date", T)]),
        )]);
        assert_eq!(eval(get_response_item("s.d", "rg.date"), &ctx), Value::from(T));
        let err = evaluate(&get_response_item("s.d", "rg.other"), &ctx).unwrap_err();
        assert!(matches!(err, EvalError::MissingResponsePath { .. }));
        let err = evaluate(&get_response_item("s.d", "rg"), &ctx).unwrap_err();
        assert!(matches!(err, EvalError::TypeError { .. }));
    }

    #[test]
    fn value_accessors_yield_null_when_absent() {
        let ctx = ctx_with(vec![ResponseItem::new(
            "s.n",
            ResponseNode::group("rg", vec![ResponseNode::leaf_with_value("num", "12")]),
        )]);
        assert_eq!(
            eval(get_response_value_as_num("s.n", "rg.num"), &ctx),
            Value::from(12)
        );
        assert_eq!(
            eval(get_response_value_as_num("s.missing", "rg.num"), &ctx),
            Value::Null
        );
        assert_eq!(
            eval(is_defined(get_response_item("s.missing", "rg.num")), &ctx),
            Value::Bool(false)
        );
        assert_eq!(
            eval(is_defined(get_response_item("s.n", "rg.num")), &ctx),
            Value::Bool(true)
        );
    }

    #[test]
    fn comparisons_with_null_are_false() {
        let ctx = ResponseContext::new(T);
        assert_eq!(
            eval(lt(get_response_value_as_num("s.x", "rg"), lit(5)), &ctx),
            Value::Bool(false)
        );
        assert_eq!(eval(gt(lit(6), lit(5)), &ctx), Value::Bool(true));
    }

    #[test]
    fn count_response_items() {
        let ctx = ctx_with(vec![multiple_choice("s.a", &["0", "1", "4"])]);
        let expr = Expression::Call {
            op: Operator::CountResponseItems,
            args: vec![lit("s.a"), lit("rg.mcg")],
        };
        assert_eq!(eval(expr, &ctx), Value::from(3));
    }

    #[test]
    fn timestamp_with_offset_uses_context_time() {
        let ctx = ResponseContext::new(T);
        assert_eq!(
            eval(timestamp_with_offset(-5184000), &ctx),
            Value::from(T - 5_184_000)
        );
    }

    #[test]
    fn timestamp_with_explicit_reference() {
        let ctx = ResponseContext::new(T);
        let expr = Expression::Call {
            op: Operator::TimestampWithOffset,
            args: vec![lit(60), lit(1000)],
        };
        assert_eq!(eval(expr, &ctx), Value::from(1060));
    }

    #[test]
    fn context_attribute_access() {
        let ctx = ResponseContext::new(T).with_attribute("participantFlags.prev", "1");
        let expr = get_attribute(get_attribute(get_context(), "participantFlags"), "prev");
        assert_eq!(eval(expr, &ctx), Value::from("1"));
        let dotted = get_attribute(get_context(), "participantFlags.prev");
        assert_eq!(eval(dotted, &ctx), Value::from("1"));
        let missing = get_attribute(get_context(), "participantFlags.next");
        assert_eq!(
            evaluate(&missing, &ctx).unwrap_err(),
            EvalError::MissingAttribute {
                name: "participantFlags.next".to_string()
            }
        );
    }

    #[test]
    fn get_attribute_on_scalar_is_type_error() {
        let ctx = ResponseContext::new(T);
        let err = evaluate(&get_attribute(lit(1), "x"), &ctx).unwrap_err();
        assert!(matches!(err, EvalError::TypeError { .. }));
    }

    #[test]
    fn participant_flags() {
        let ctx = ResponseContext::new(T).with_attribute("participantFlags.prev", "1");
        assert_eq!(eval(has_participant_flag("prev"), &ctx), Value::Bool(true));
        assert_eq!(eval(has_participant_flag("next"), &ctx), Value::Bool(false));
        let expr = Expression::Call {
            op: Operator::HasParticipantFlagKeyAndValue,
            args: vec![lit("prev"), lit("1")],
        };
        assert_eq!(eval(expr, &ctx), Value::Bool(true));
    }

    #[test]
    fn date_diff_in_months_truncates() {
        // 2023-11-14T22:13:20Z
        let ctx = ctx_with(vec![ResponseItem::new(
            "s.d",
            // 2023-09-20T00:00:00Z
            ResponseNode::group("rg", vec![ResponseNode::leaf_with_value("date", 1_695_168_000i64)]),
        )]);
        let months = Expression::Call {
            op: Operator::DateResponseDiffFromNow,
            args: vec![lit("s.d"), lit("rg.date"), lit("months"), lit(true)],
        };
        assert_eq!(eval(months, &ctx), Value::from(1));
        let days = Expression::Call {
            op: Operator::DateResponseDiffFromNow,
            args: vec![lit("s.d"), lit("rg.date"), lit("days")],
        };
        assert_eq!(eval(days, &ctx), Value::from(-55));
    }

    #[test]
    fn date_diff_unknown_unit() {
        let ctx = ctx_with(vec![ResponseItem::new(
            "s.d",
            ResponseNode::group("rg", vec![ResponseNode::leaf_with_value("date", T)]),
        )]);
        let expr = Expression::Call {
            op: Operator::DateResponseDiffFromNow,
            args: vec![lit("s.d"), lit("rg.date"), lit("fortnights")],
        };
        assert!(evaluate(&expr, &ctx).is_err());
    }
}
