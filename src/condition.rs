//! Parsing and evaluation of `{{@if ...}}` conditions.
//!
//! Grammar: `<path> <op> <operand>` with `op` one of `== != >= <= > <`, or a
//! bare `<path>` tested for truthiness. Operands on the right may be a
//! single-quoted string, `true`, `false`, `null`, a decimal number, or a path.
//! Nothing here ever fails: anything that does not parse falls back to a
//! truthiness check on the whole expression.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;
use tracing::trace;

use crate::ast::{CompareOp, Condition, Operand};
use crate::options::OperatorDetection;
use crate::path;
use crate::value::{loose_eq, Value};

static COMPARISON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s*(==|!=|>=|<=|>|<)\s*(.+)$").expect("valid comparison pattern")
});

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]+(?:\.[0-9]+)?$").expect("valid number pattern"));

/// Evaluate `condition` against `scope` using legacy operator detection.
pub fn evaluate(condition: &str, scope: &Value) -> bool {
    parse_condition(condition, OperatorDetection::Legacy).evaluate(scope)
}

pub fn parse_condition(condition: &str, detection: OperatorDetection) -> Condition {
    let expr = condition.trim();
    if expr.is_empty() {
        return Condition::Empty;
    }
    match detection {
        OperatorDetection::Legacy => parse_legacy(expr),
        OperatorDetection::Strict => parse_strict(expr),
    }
}

// Substring detection: any of the operator characters anywhere, including
// inside quoted literals, sends the expression through the comparison pattern.
fn parse_legacy(expr: &str) -> Condition {
    if !["==", "!=", ">", "<"].iter().any(|op| expr.contains(op)) {
        return Condition::Exists(expr.to_string());
    }
    let Some(caps) = COMPARISON.captures(expr) else {
        return Condition::Malformed(expr.to_string());
    };
    match CompareOp::from_symbol(&caps[2]) {
        Some(op) => Condition::Compare {
            left: caps[1].trim().to_string(),
            op,
            right: parse_operand(caps[3].trim()),
        },
        None => Condition::Malformed(expr.to_string()),
    }
}

fn parse_strict(expr: &str) -> Condition {
    let Some((at, symbol, op)) = find_operator(expr) else {
        return Condition::Exists(expr.to_string());
    };
    let left = expr[..at].trim();
    let right = expr[at + symbol.len()..].trim();
    if left.is_empty() || right.is_empty() {
        return Condition::Malformed(expr.to_string());
    }
    Condition::Compare {
        left: left.to_string(),
        op,
        right: parse_operand(right),
    }
}

// First operator outside single-quoted spans, longest spelling first.
fn find_operator(expr: &str) -> Option<(usize, &'static str, CompareOp)> {
    let mut quoted = false;
    for (i, c) in expr.char_indices() {
        if c == '\'' {
            quoted = !quoted;
            continue;
        }
        if quoted {
            continue;
        }
        let rest = &expr[i..];
        if let Some((symbol, op)) = CompareOp::ALL.iter().find(|(s, _)| rest.starts_with(s)) {
            return Some((i, *symbol, *op));
        }
    }
    None
}

/// Literal parsing order: quoted string, boolean, null, number, then path.
pub fn parse_operand(raw: &str) -> Operand {
    if raw.len() >= 2 && raw.starts_with('\'') && raw.ends_with('\'') {
        return Operand::Str(raw[1..raw.len() - 1].to_string());
    }
    match raw {
        "true" => Operand::Bool(true),
        "false" => Operand::Bool(false),
        "null" => Operand::Null,
        _ if NUMBER.is_match(raw) => raw
            .parse::<f64>()
            .map_or_else(|_| Operand::Path(raw.to_string()), Operand::Number),
        _ => Operand::Path(raw.to_string()),
    }
}

impl Operand {
    fn resolve(&self, scope: &Value) -> Option<Value> {
        match self {
            Operand::Str(s) => Some(Value::String(s.clone())),
            Operand::Bool(b) => Some(Value::Bool(*b)),
            Operand::Null => Some(Value::Null),
            Operand::Number(n) => Some(Value::Number(*n)),
            Operand::Path(p) => path::resolve(scope, p),
        }
    }
}

impl Condition {
    pub fn evaluate(&self, scope: &Value) -> bool {
        let result = match self {
            Condition::Empty => false,
            Condition::Exists(p) | Condition::Malformed(p) => {
                path::resolve(scope, p).is_some_and(|v| v.is_truthy())
            }
            Condition::Compare { left, op, right } => {
                let left = path::resolve(scope, left);
                let right = right.resolve(scope);
                compare(left.as_ref(), *op, right.as_ref())
            }
        };
        trace!(condition = ?self, result, "evaluated condition");
        result
    }
}

fn compare(left: Option<&Value>, op: CompareOp, right: Option<&Value>) -> bool {
    let ordering = match (left, right) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a.partial_cmp(b),
        (Some(Value::String(a)), Some(Value::String(b))) => Some(a.cmp(b)),
        _ => None,
    };
    match op {
        CompareOp::Eq => loose_eq(left, right),
        CompareOp::Ne => !loose_eq(left, right),
        CompareOp::Gt => ordering.is_some_and(Ordering::is_gt),
        CompareOp::Ge => ordering.is_some_and(Ordering::is_ge),
        CompareOp::Lt => ordering.is_some_and(Ordering::is_lt),
        CompareOp::Le => ordering.is_some_and(Ordering::is_le),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn scope() -> Value {
        Value::from(json!({
            "x": 5,
            "name": "Ada",
            "zero": 0,
            "flag": false,
            "empty": "",
            "list": [],
            "user": {"role": "admin", "age": 30},
            "other": 5
        }))
    }

    #[test]
    fn blank_is_false() {
        assert!(!evaluate("", &scope()));
        assert!(!evaluate("   ", &scope()));
    }

    #[test]
    fn numeric_comparisons() {
        let s = scope();
        assert!(evaluate("x > 3", &s));
        assert!(!evaluate("x > 5", &s));
        assert!(evaluate("x >= 5", &s));
        assert!(evaluate("x <= 5", &s));
        assert!(!evaluate("x < 5", &s));
        assert!(evaluate("x>=5", &s));
        assert!(evaluate("user.age < 31.5", &s));
        assert!(evaluate("x == other", &s));
    }

    #[test]
    fn only_plain_decimals_are_number_literals() {
        assert_eq!(parse_operand("-2.5"), Operand::Number(-2.5));
        assert_eq!(parse_operand("10"), Operand::Number(10.0));
        for raw in [".5", "5.", "1e3", "+1"] {
            assert_eq!(parse_operand(raw), Operand::Path(raw.to_string()), "{raw}");
        }
        // `.5` is looked up as a path, finds nothing, and ordering fails.
        let s = scope();
        assert!(!evaluate("x > .5", &s));
        assert!(evaluate("x > 0.5", &s));
    }

    #[test]
    fn longest_operator_wins() {
        assert_eq!(
            parse_condition("a >= 1", OperatorDetection::Legacy),
            Condition::Compare {
                left: "a".into(),
                op: CompareOp::Ge,
                right: Operand::Number(1.0)
            }
        );
        assert_eq!(
            parse_condition("a<=b", OperatorDetection::Strict),
            Condition::Compare {
                left: "a".into(),
                op: CompareOp::Le,
                right: Operand::Path("b".into())
            }
        );
    }

    #[test]
    fn string_literals_and_equality() {
        let s = scope();
        assert!(evaluate("user.role == 'admin'", &s));
        assert!(evaluate("user.role != 'guest'", &s));
        assert!(evaluate("name > 'Ab'", &s));
        assert!(evaluate("missing == null", &s));
    }

    #[test]
    fn loose_equality_is_preserved() {
        let s = scope();
        assert!(evaluate("zero == false", &s));
        assert!(evaluate("empty == 0", &s));
        assert!(evaluate("x == '5'", &s));
        assert!(!evaluate("x != 5", &s));
    }

    #[test]
    fn mismatched_types_never_order() {
        let s = Value::from(json!({"a": "x", "b": 5}));
        assert!(!evaluate("a > b", &s));
        assert!(!evaluate("a < b", &s));
        assert!(!evaluate("missing > 1", &s));
        assert!(!evaluate("missing <= 1", &s));
    }

    #[test]
    fn left_side_is_never_a_literal() {
        let s = scope();
        assert!(!evaluate("5 == 5", &s));
        assert!(evaluate("'x' == undefinedThing", &s));
    }

    #[test]
    fn existence_checks() {
        let s = scope();
        assert!(evaluate("name", &s));
        assert!(evaluate("list", &s));
        assert!(!evaluate("zero", &s));
        assert!(!evaluate("flag", &s));
        assert!(!evaluate("empty", &s));
        assert!(!evaluate("missingKey", &s));
        assert!(evaluate("  user.role  ", &s));
    }

    #[test]
    fn malformed_falls_back_to_existence() {
        assert_eq!(
            parse_condition("x >", OperatorDetection::Legacy),
            Condition::Malformed("x >".into())
        );
        assert!(!evaluate("> 3", &scope()));
        let s = Value::from(json!({"x >": true}));
        assert!(evaluate("x >", &s));
    }

    #[test]
    fn quoted_operators_only_matter_in_legacy_mode() {
        let legacy = parse_condition("title == 'a>b'", OperatorDetection::Legacy);
        let strict = parse_condition("title == 'a>b'", OperatorDetection::Strict);
        assert_eq!(
            strict,
            Condition::Compare {
                left: "title".into(),
                op: CompareOp::Eq,
                right: Operand::Str("a>b".into())
            }
        );
        assert_eq!(legacy, strict);

        // A quoted `>` on the left used to split the expression.
        assert_eq!(
            parse_condition("'a>b'", OperatorDetection::Legacy),
            Condition::Compare {
                left: "'a".into(),
                op: CompareOp::Gt,
                right: Operand::Path("b'".into())
            }
        );
        assert_eq!(
            parse_condition("'a>b'", OperatorDetection::Strict),
            Condition::Exists("'a>b'".into())
        );
    }

    #[test]
    fn operand_literals() {
        assert_eq!(parse_operand("'hi there'"), Operand::Str("hi there".into()));
        assert_eq!(parse_operand("''"), Operand::Str(String::new()));
        assert_eq!(parse_operand("true"), Operand::Bool(true));
        assert_eq!(parse_operand("null"), Operand::Null);
        assert_eq!(parse_operand("-2.5"), Operand::Number(-2.5));
        assert_eq!(parse_operand("1e3"), Operand::Path("1e3".into()));
        assert_eq!(parse_operand("a.b"), Operand::Path("a.b".into()));
    }
}
