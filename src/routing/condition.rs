//! Condition evaluation for routing rules.
//!
//! A condition names a dotted path into the JSON view of a request
//! (`type`, `requesterInfo.name`, `payload.propertyDetails.price`, ...),
//! an operator, and a literal to compare against. Evaluation is total:
//! anything that cannot be compared is a non-match, never an error.
//!
//! # Equality coercion
//!
//! `equals` / `not_equals` use one fixed rule instead of implicit
//! dynamic-language coercion:
//!
//! 1. An absent or `null` field equals only a `null` literal.
//! 2. If either side is a JSON number and both sides read as finite
//!    numbers (numeric strings are trimmed and parsed), compare numerically.
//! 3. Two booleans compare as booleans.
//! 4. Everything else compares by string rendering: strings as-is, other
//!    values as compact JSON (so `true` equals `"true"`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operator of a routing condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    NotEquals,
    /// Case-insensitive substring match on string renderings
    Contains,
    GreaterThan,
    LessThan,
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operator::Equals => "==",
            Operator::NotEquals => "!=",
            Operator::Contains => "contains",
            Operator::GreaterThan => ">",
            Operator::LessThan => "<",
        };
        f.write_str(s)
    }
}

/// A single `{field, operator, value}` test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    /// Dotted path into the request, e.g. `payload.serviceType`
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}

impl std::fmt::Display for Condition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.field, self.operator, render(&self.value))
    }
}

/// Resolve a dotted path against a JSON value.
///
/// Object segments are looked up by key; array segments must be a
/// decimal index. Missing segments resolve to `None`.
///
/// ```
/// use serde_json::json;
/// use triage::routing::condition::resolve_path;
///
/// let request = json!({"payload": {"propertyDetails": {"price": 6000000}}});
/// assert_eq!(
///     resolve_path(&request, "payload.propertyDetails.price"),
///     Some(&json!(6000000))
/// );
/// assert_eq!(resolve_path(&request, "payload.missing.price"), None);
/// ```
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }
    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Evaluate one condition against the JSON view of a request.
///
/// ```
/// use serde_json::json;
/// use triage::routing::condition::{evaluate, Condition, Operator};
///
/// let request = json!({"payload": {"price": 6000000}});
/// let above = Condition::new("payload.price", Operator::GreaterThan, 5000000);
/// assert!(evaluate(&request, &above));
///
/// let garbage = Condition::new("payload.price", Operator::GreaterThan, "not-a-number");
/// assert!(!evaluate(&request, &garbage));
/// ```
pub fn evaluate(request: &Value, condition: &Condition) -> bool {
    let actual = resolve_path(request, &condition.field);
    let expected = &condition.value;

    match condition.operator {
        Operator::Equals => loose_eq(actual, expected),
        Operator::NotEquals => !loose_eq(actual, expected),
        Operator::Contains => match actual {
            None | Some(Value::Null) => false,
            Some(value) => render(value)
                .to_lowercase()
                .contains(&render(expected).to_lowercase()),
        },
        Operator::GreaterThan => compare(actual, expected, |a, b| a > b),
        Operator::LessThan => compare(actual, expected, |a, b| a < b),
    }
}

fn loose_eq(actual: Option<&Value>, expected: &Value) -> bool {
    let actual = match actual {
        None | Some(Value::Null) => return expected.is_null(),
        Some(value) => value,
    };
    if expected.is_null() {
        return false;
    }

    if actual.is_number() || expected.is_number() {
        if let (Some(a), Some(b)) = (as_number(actual), as_number(expected)) {
            return a == b;
        }
    }

    if let (Value::Bool(a), Value::Bool(b)) = (actual, expected) {
        return a == b;
    }

    render(actual) == render(expected)
}

fn compare(actual: Option<&Value>, expected: &Value, op: impl Fn(f64, f64) -> bool) -> bool {
    match (actual.and_then(as_number), as_number(expected)) {
        (Some(a), Some(b)) => op(a, b),
        _ => false,
    }
}

/// Read a value as a finite number. Strings are trimmed before parsing.
fn as_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
