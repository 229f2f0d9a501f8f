//! Equality, ordering and arithmetic over runtime values.
//!
//! All numeric work is done in `rust_decimal::Decimal` with checked
//! arithmetic; overflow is an `EvalError::Overflow`, never a wrap.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::types::{EvalError, Value};

/// `eq` semantics.
///
/// If either side is text, both sides are compared by their string form.
/// Otherwise booleans compare as booleans, null equals only null, and
/// everything else compares numerically.
pub fn values_equal(left: &Value, right: &Value) -> Result<bool, EvalError> {
    match (left, right) {
        (Value::Text(_), _) | (_, Value::Text(_)) => match (left.to_text(), right.to_text()) {
            (Some(l), Some(r)) => Ok(l == r),
            _ => Ok(false),
        },
        (Value::Null, Value::Null) => Ok(true),
        (Value::Null, _) | (_, Value::Null) => Ok(false),
        (Value::Bool(l), Value::Bool(r)) => Ok(l == r),
        (Value::Record(l), Value::Record(r)) => Ok(l == r),
        (Value::Record(_), other) | (other, Value::Record(_)) => Err(EvalError::type_error(
            "eq",
            format!("cannot compare Record with {}", other.type_name()),
        )),
        _ => Ok(left.as_number("eq")? == right.as_number("eq")?),
    }
}

/// Ordering for `lt`/`lte`/`gt`/`gte`.
///
/// Returns `None` when either side is null: comparisons against a missing
/// value are false rather than errors.
pub fn compare_values(
    op: &str,
    left: &Value,
    right: &Value,
) -> Result<Option<Ordering>, EvalError> {
    match (left, right) {
        (Value::Null, _) | (_, Value::Null) => Ok(None),
        (Value::Text(l), Value::Text(r)) => Ok(Some(l.cmp(r))),
        _ => {
            let l = left.as_number(op)?;
            let r = right.as_number(op)?;
            Ok(Some(l.cmp(&r)))
        }
    }
}

/// Sum of values. Nulls count as zero.
pub fn sum_values(values: &[Value]) -> Result<Decimal, EvalError> {
    values.iter().try_fold(Decimal::ZERO, |acc, v| {
        let n = if v.is_null() {
            Decimal::ZERO
        } else {
            v.as_number("sum")?
        };
        acc.checked_add(n).ok_or_else(|| EvalError::Overflow {
            message: format!("{} + {}", acc, n),
        })
    })
}

/// `base + seconds`, for timestamp arithmetic.
pub fn offset_timestamp(base: Decimal, seconds: Decimal) -> Result<Decimal, EvalError> {
    base.checked_add(seconds).ok_or_else(|| EvalError::Overflow {
        message: format!("timestamp {} offset by {}", base, seconds),
    })
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_side_forces_string_comparison() {
        assert!(values_equal(&Value::from("1"), &Value::from(1)).unwrap());
        assert!(values_equal(&Value::Number(Decimal::new(10, 1)), &Value::from("1")).unwrap());
        assert!(!values_equal(&Value::from("01"), &Value::from(1)).unwrap());
        assert!(values_equal(&Value::from("true"), &Value::from(true)).unwrap());
    }

    #[test]
    fn numeric_equality_ignores_scale() {
        let a = Value::Number(Decimal::new(250, 2));
        let b = Value::Number(Decimal::new(25, 1));
        assert!(values_equal(&a, &b).unwrap());
        assert!(values_equal(&Value::from(true), &Value::from(true)).unwrap());
        assert!(values_equal(&Value::from(true), &Value::from(1)).unwrap());
    }

    #[test]
    fn null_equality() {
        assert!(values_equal(&Value::Null, &Value::Null).unwrap());
        assert!(!values_equal(&Value::Null, &Value::from(0)).unwrap());
        assert!(!values_equal(&Value::Null, &Value::from("")).unwrap());
    }

    #[test]
    fn record_vs_scalar_is_type_error() {
        let rec = Value::Record(Default::default());
        assert!(values_equal(&rec, &Value::from(1)).is_err());
    }

    #[test]
    fn ordering() {
        assert_eq!(
            compare_values("lt", &Value::from(1), &Value::from(2)).unwrap(),
            Some(Ordering::Less)
        );
        assert_eq!(
            compare_values("gt", &Value::from("b"), &Value::from("a")).unwrap(),
            Some(Ordering::Greater)
        );
        assert_eq!(compare_values("lt", &Value::Null, &Value::from(2)).unwrap(), None);
        assert!(compare_values("lt", &Value::from("x"), &Value::from(2)).is_err());
    }

    #[test]
    fn sum_treats_null_as_zero() {
        let total = sum_values(&[Value::from(2), Value::Null, Value::from("3")]).unwrap();
        assert_eq!(total, Decimal::from(5));
    }

    #[test]
    fn sum_overflow_reported() {
        let err = sum_values(&[Value::Number(Decimal::MAX), Value::from(1)]).unwrap_err();
        assert!(matches!(err, EvalError::Overflow { .. }));
    }
}
