//! Evaluating a compiled rule tree against a request context (C2).

use crate::compiled::{CompiledRule, Operand};
use crate::value::{coerce_context_value, CoercedValue};
use std::collections::HashMap;
use variantflow_core::error::RuleEvalErrorKind;
use variantflow_core::Op;

/// The outcome of evaluating a rule node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalResult {
    /// The rule matched.
    Match,
    /// The rule did not match.
    NoMatch,
    /// The rule could not be evaluated against this context.
    Error(RuleEvalErrorKind),
}

impl EvalResult {
    /// Negate a `Match`/`NoMatch`; propagate `Error` unchanged (§4.2 `not`).
    fn negate(self) -> EvalResult {
        match self {
            EvalResult::Match => EvalResult::NoMatch,
            EvalResult::NoMatch => EvalResult::Match,
            EvalResult::Error(e) => EvalResult::Error(e),
        }
    }

    /// Whether this is a hard `Match`.
    pub fn is_match(self) -> bool {
        matches!(self, EvalResult::Match)
    }
}

/// Evaluate `node` against `context`. Pure: no internal mutation (§4.2).
pub fn evaluate(node: &CompiledRule, context: &HashMap<String, serde_json::Value>) -> EvalResult {
    match node {
        CompiledRule::Field {
            field,
            op,
            field_type,
            operand,
        } => evaluate_field(field, *op, *field_type, operand, context),
        CompiledRule::And(children) => evaluate_and(children, context),
        CompiledRule::Or(children) => evaluate_or(children, context),
        CompiledRule::Not(child) => evaluate(child, context).negate(),
    }
}

fn evaluate_and(
    children: &[Box<CompiledRule>],
    context: &HashMap<String, serde_json::Value>,
) -> EvalResult {
    for child in children {
        match evaluate(child, context) {
            EvalResult::Match => continue,
            other => return other,
        }
    }
    EvalResult::Match
}

fn evaluate_or(
    children: &[Box<CompiledRule>],
    context: &HashMap<String, serde_json::Value>,
) -> EvalResult {
    let mut last_error = None;
    for child in children {
        match evaluate(child, context) {
            EvalResult::Match => return EvalResult::Match,
            EvalResult::NoMatch => continue,
            EvalResult::Error(e) => last_error = Some(e),
        }
    }
    match last_error {
        Some(e) => EvalResult::Error(e),
        None => EvalResult::NoMatch,
    }
}

fn evaluate_field(
    field: &str,
    op: Op,
    field_type: variantflow_core::FieldType,
    operand: &Operand,
    context: &HashMap<String, serde_json::Value>,
) -> EvalResult {
    let raw = match context.get(field) {
        Some(v) => v,
        None => return EvalResult::Error(RuleEvalErrorKind::MissingField),
    };

    if let Operand::Pattern(pattern) = operand {
        let s = match raw.as_str() {
            Some(s) => s,
            None => return EvalResult::Error(RuleEvalErrorKind::TypeMismatch),
        };
        let matched = pattern.matches(s);
        return to_result(match op {
            Op::Like => matched,
            Op::NotLike => !matched,
            _ => unreachable!("pattern operand only produced for like/not_like"),
        });
    }

    let coerced = match coerce_context_value(raw, field_type) {
        Ok(c) => c,
        Err(e) => return EvalResult::Error(e),
    };

    match (op, operand) {
        (Op::Eq, Operand::Single(want)) => to_result(&coerced == want),
        (Op::Neq, Operand::Single(want)) => to_result(&coerced != want),
        (Op::In, Operand::Set(set)) => to_result(set.contains(&coerced)),
        (Op::NotIn, Operand::Set(set)) => to_result(!set.contains(&coerced)),
        (Op::Gt, Operand::Ordered(want)) => compare(&coerced, want, |o| o.is_gt()),
        (Op::Gte, Operand::Ordered(want)) => compare(&coerced, want, |o| o.is_ge()),
        (Op::Lt, Operand::Ordered(want)) => compare(&coerced, want, |o| o.is_lt()),
        (Op::Lte, Operand::Ordered(want)) => compare(&coerced, want, |o| o.is_le()),
        _ => unreachable!("compiled operand shape always matches op at compile time"),
    }
}

fn compare(
    a: &CoercedValue,
    b: &CoercedValue,
    pred: impl Fn(std::cmp::Ordering) -> bool,
) -> EvalResult {
    match a.partial_cmp(b) {
        Some(ord) => to_result(pred(ord)),
        None => EvalResult::Error(RuleEvalErrorKind::TypeMismatch),
    }
}

fn to_result(b: bool) -> EvalResult {
    if b {
        EvalResult::Match
    } else {
        EvalResult::NoMatch
    }
}
