//! Expression trees for conditions and validation rules.
//!
//! An expression is either a literal or a call of a known operator on an
//! ordered list of argument expressions. The operator set is closed: names
//! are resolved once when an expression is parsed, and evaluation matches
//! on the enum.
//!
//! Wire form: a JSON scalar is a literal; `{"name": <op>, "args": [...]}`
//! is a call.

use std::fmt;

use crate::types::{EvalError, Value};

/// An immutable expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    Literal(Value),
    Call { op: Operator, args: Vec<Expression> },
}

/// Operators of the expression language, keyed by their wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    And,
    Or,
    Not,
    Eq,
    Lt,
    Lte,
    Gt,
    Gte,
    IsDefined,
    Sum,
    HasResponse,
    ResponseHasKeysAny,
    ResponseHasKeysAll,
    ResponseHasOnlyKeysOtherThan,
    GetResponseItem,
    GetResponseValueAsNum,
    GetResponseValueAsStr,
    CountResponseItems,
    GetContext,
    GetAttribute,
    HasParticipantFlag,
    HasParticipantFlagKeyAndValue,
    TimestampWithOffset,
    DateResponseDiffFromNow,
}

/// Accepted argument counts, inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl Arity {
    const fn exactly(n: usize) -> Self {
        Arity {
            min: n,
            max: Some(n),
        }
    }

    const fn at_least(n: usize) -> Self {
        Arity { min: n, max: None }
    }

    const fn between(min: usize, max: usize) -> Self {
        Arity {
            min,
            max: Some(max),
        }
    }

    pub fn accepts(&self, n: usize) -> bool {
        n >= self.min && self.max.map_or(true, |max| n <= max)
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "exactly {}", max),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

impl Operator {
    pub const ALL: [Operator; 24] = [
        Operator::And,
        Operator::Or,
        Operator::Not,
        Operator::Eq,
        Operator::Lt,
        Operator::Lte,
        Operator::Gt,
        Operator::Gte,
        Operator::IsDefined,
        Operator::Sum,
        Operator::HasResponse,
        Operator::ResponseHasKeysAny,
        Operator::ResponseHasKeysAll,
        Operator::ResponseHasOnlyKeysOtherThan,
        Operator::GetResponseItem,
        Operator::GetResponseValueAsNum,
        Operator::GetResponseValueAsStr,
        Operator::CountResponseItems,
        Operator::GetContext,
        Operator::GetAttribute,
        Operator::HasParticipantFlag,
        Operator::HasParticipantFlagKeyAndValue,
        Operator::TimestampWithOffset,
        Operator::DateResponseDiffFromNow,
    ];

    /// Wire name of the operator.
    pub fn name(self) -> &'static str {
        match self {
            Operator::And => "and",
            Operator::Or => "or",
            Operator::Not => "not",
            Operator::Eq => "eq",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::IsDefined => "isDefined",
            Operator::Sum => "sum",
            Operator::HasResponse => "hasResponse",
            Operator::ResponseHasKeysAny => "responseHasKeysAny",
            Operator::ResponseHasKeysAll => "responseHasKeysAll",
            Operator::ResponseHasOnlyKeysOtherThan => "responseHasOnlyKeysOtherThan",
            Operator::GetResponseItem => "getResponseItem",
            Operator::GetResponseValueAsNum => "getResponseValueAsNum",
            Operator::GetResponseValueAsStr => "getResponseValueAsStr",
            Operator::CountResponseItems => "countResponseItems",
            Operator::GetContext => "getContext",
            Operator::GetAttribute => "getAttribute",
            Operator::HasParticipantFlag => "hasParticipantFlag",
            Operator::HasParticipantFlagKeyAndValue => "hasParticipantFlagKeyAndValue",
            Operator::TimestampWithOffset => "timestampWithOffset",
            Operator::DateResponseDiffFromNow => "dateResponseDiffFromNow",
        }
    }

    pub fn from_name(name: &str) -> Option<Operator> {
        Operator::ALL.into_iter().find(|op| op.name() == name)
    }

    pub fn arity(self) -> Arity {
        match self {
            Operator::And | Operator::Or | Operator::Sum => Arity::at_least(1),
            Operator::Not | Operator::IsDefined | Operator::HasParticipantFlag => {
                Arity::exactly(1)
            }
            Operator::Eq | Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte => {
                Arity::exactly(2)
            }
            Operator::HasResponse
            | Operator::GetResponseItem
            | Operator::GetResponseValueAsNum
            | Operator::GetResponseValueAsStr
            | Operator::CountResponseItems
            | Operator::GetAttribute
            | Operator::HasParticipantFlagKeyAndValue => Arity::exactly(2),
            Operator::ResponseHasKeysAny
            | Operator::ResponseHasKeysAll
            | Operator::ResponseHasOnlyKeysOtherThan => Arity::at_least(2),
            Operator::GetContext => Arity::exactly(0),
            Operator::TimestampWithOffset => Arity::between(1, 2),
            Operator::DateResponseDiffFromNow => Arity::between(3, 4),
        }
    }

    /// Operators whose first argument names a survey item.
    pub fn references_item(self) -> bool {
        matches!(
            self,
            Operator::HasResponse
                | Operator::ResponseHasKeysAny
                | Operator::ResponseHasKeysAll
                | Operator::ResponseHasOnlyKeysOtherThan
                | Operator::GetResponseItem
                | Operator::GetResponseValueAsNum
                | Operator::GetResponseValueAsStr
                | Operator::CountResponseItems
                | Operator::DateResponseDiffFromNow
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for Operator {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operator::from_name(s).ok_or_else(|| EvalError::UnknownOperator {
            name: s.to_string(),
        })
    }
}

impl Expression {
    pub fn literal(value: impl Into<Value>) -> Self {
        Expression::Literal(value.into())
    }

    /// Build a call, checking the argument count.
    pub fn call(op: Operator, args: Vec<Expression>) -> Result<Self, EvalError> {
        let arity = op.arity();
        if !arity.accepts(args.len()) {
            return Err(EvalError::Arity {
                op: op.name().to_string(),
                expected: arity.to_string(),
                got: args.len(),
            });
        }
        Ok(Expression::Call { op, args })
    }

    /// Serialize to the wire form.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Expression::Literal(v) => v.to_json(),
            Expression::Call { op, args } => serde_json::json!({
                "name": op.name(),
                "args": args.iter().map(Expression::to_json).collect::<Vec<_>>(),
            }),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(v) => write!(f, "{}", v),
            Expression::Call { op, args } => {
                write!(f, "{}(", op)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

// ──────────────────────────────────────────────
// Wire parsing
// ──────────────────────────────────────────────

/// Parse an expression from its JSON wire form.
///
/// Unknown operator names fail with `UnknownOperator`, wrong argument
/// counts with `Arity`.
pub fn parse_expression(v: &serde_json::Value) -> Result<Expression, EvalError> {
    match v {
        serde_json::Value::Object(obj) => {
            let name = obj
                .get("name")
                .and_then(|n| n.as_str())
                .ok_or_else(|| EvalError::deserialize("call missing string field 'name'"))?;
            let op: Operator = name.parse()?;
            let args = match obj.get("args") {
                None => Vec::new(),
                Some(serde_json::Value::Array(items)) => items
                    .iter()
                    .map(parse_expression)
                    .collect::<Result<Vec<_>, _>>()?,
                Some(_) => {
                    return Err(EvalError::deserialize(format!(
                        "'args' of '{}' must be an array",
                        name
                    )))
                }
            };
            Expression::call(op, args)
        }
        serde_json::Value::Array(_) => Err(EvalError::deserialize(
            "expression must be a scalar literal or a call object",
        )),
        scalar => Ok(Expression::Literal(Value::from_json(scalar)?)),
    }
}

// ──────────────────────────────────────────────
// Constructors for authoring code
// ──────────────────────────────────────────────

/// Plain constructors that mirror the wire names. They build the tree
/// without arity checks beyond what their signatures already fix.
pub mod build {
    use super::{Expression, Operator};
    use crate::types::Value;

    fn call(op: Operator, args: Vec<Expression>) -> Expression {
        Expression::Call { op, args }
    }

    fn text(s: &str) -> Expression {
        Expression::Literal(Value::Text(s.to_string()))
    }

    fn keyed(op: Operator, item_key: &str, path: &str, keys: &[&str]) -> Expression {
        let mut args = vec![text(item_key), text(path)];
        args.extend(keys.iter().map(|k| text(k)));
        call(op, args)
    }

    pub fn lit(value: impl Into<Value>) -> Expression {
        Expression::literal(value)
    }

    pub fn and(args: Vec<Expression>) -> Expression {
        call(Operator::And, args)
    }

    pub fn or(args: Vec<Expression>) -> Expression {
        call(Operator::Or, args)
    }

    pub fn not(arg: Expression) -> Expression {
        call(Operator::Not, vec![arg])
    }

    pub fn eq(left: Expression, right: Expression) -> Expression {
        call(Operator::Eq, vec![left, right])
    }

    pub fn lt(left: Expression, right: Expression) -> Expression {
        call(Operator::Lt, vec![left, right])
    }

    pub fn gt(left: Expression, right: Expression) -> Expression {
        call(Operator::Gt, vec![left, right])
    }

    pub fn is_defined(arg: Expression) -> Expression {
        call(Operator::IsDefined, vec![arg])
    }

    pub fn has_response(item_key: &str, path: &str) -> Expression {
        keyed(Operator::HasResponse, item_key, path, &[])
    }

    pub fn response_has_keys_any(item_key: &str, path: &str, keys: &[&str]) -> Expression {
        keyed(Operator::ResponseHasKeysAny, item_key, path, keys)
    }

    pub fn response_has_keys_all(item_key: &str, path: &str, keys: &[&str]) -> Expression {
        keyed(Operator::ResponseHasKeysAll, item_key, path, keys)
    }

    pub fn response_has_only_keys_other_than(
        item_key: &str,
        path: &str,
        keys: &[&str],
    ) -> Expression {
        keyed(Operator::ResponseHasOnlyKeysOtherThan, item_key, path, keys)
    }

    pub fn get_response_item(item_key: &str, path: &str) -> Expression {
        keyed(Operator::GetResponseItem, item_key, path, &[])
    }

    pub fn get_response_value_as_num(item_key: &str, path: &str) -> Expression {
        keyed(Operator::GetResponseValueAsNum, item_key, path, &[])
    }

    pub fn get_context() -> Expression {
        call(Operator::GetContext, vec![])
    }

    pub fn get_attribute(base: Expression, name: &str) -> Expression {
        call(Operator::GetAttribute, vec![base, text(name)])
    }

    pub fn has_participant_flag(key: &str) -> Expression {
        call(Operator::HasParticipantFlag, vec![text(key)])
    }

    pub fn timestamp_with_offset(seconds: i64) -> Expression {
        call(Operator::TimestampWithOffset, vec![lit(seconds)])
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
