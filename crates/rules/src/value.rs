//! Coercion of rule literals and context values into a common comparable
//! form, keyed by the field's declared `FieldType`.

use crate::glob::GlobPattern;
use crate::semver::{parse_semver, SemverTuple};
use variantflow_core::error::RuleEvalErrorKind;
use variantflow_core::{FieldType, RuleValue};

/// A value coerced to its field's declared type, ready for comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum CoercedValue {
    /// A coerced string.
    Str(String),
    /// A coerced integer.
    Int(i64),
    /// A coerced float (integers widen into this for `Float` fields).
    Float(f64),
    /// A coerced boolean.
    Bool(bool),
    /// A coerced three-component version.
    Semver(SemverTuple),
}

impl CoercedValue {
    /// Numeric value for `gt`/`gte`/`lt`/`lte` comparisons, if this kind
    /// supports ordering.
    pub fn partial_cmp(&self, other: &CoercedValue) -> Option<std::cmp::Ordering> {
        match (self, other) {
            (CoercedValue::Int(a), CoercedValue::Int(b)) => a.partial_cmp(b),
            (CoercedValue::Float(a), CoercedValue::Float(b)) => a.partial_cmp(b),
            (CoercedValue::Semver(a), CoercedValue::Semver(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Coerce a literal from a rule's `values` list to `ft`. Used at compile
/// time: literals are static, so this never depends on request context.
pub fn coerce_rule_literal(
    v: &RuleValue,
    ft: FieldType,
) -> Result<CoercedValue, RuleEvalErrorKind> {
    match (ft, v) {
        (FieldType::String, RuleValue::String(s)) => Ok(CoercedValue::Str(s.clone())),
        (FieldType::Int, RuleValue::Int(i)) => Ok(CoercedValue::Int(*i)),
        (FieldType::Float, RuleValue::Float(f)) => Ok(CoercedValue::Float(*f)),
        (FieldType::Float, RuleValue::Int(i)) => Ok(CoercedValue::Float(*i as f64)),
        (FieldType::Bool, RuleValue::Bool(b)) => Ok(CoercedValue::Bool(*b)),
        (FieldType::Semver, RuleValue::String(s)) => parse_semver(s)
            .map(CoercedValue::Semver)
            .ok_or(RuleEvalErrorKind::TypeMismatch),
        _ => Err(RuleEvalErrorKind::TypeMismatch),
    }
}

/// Compile a `like`/`not_like` pattern literal.
pub fn compile_pattern_literal(v: &RuleValue) -> Result<GlobPattern, RuleEvalErrorKind> {
    match v {
        RuleValue::String(s) => Ok(GlobPattern::compile(s)),
        _ => Err(RuleEvalErrorKind::TypeMismatch),
    }
}

/// Coerce a request context value (JSON-shaped) to `ft`. Used at
/// evaluation time: context values vary per request.
pub fn coerce_context_value(
    v: &serde_json::Value,
    ft: FieldType,
) -> Result<CoercedValue, RuleEvalErrorKind> {
    match ft {
        FieldType::String => v
            .as_str()
            .map(|s| CoercedValue::Str(s.to_string()))
            .ok_or(RuleEvalErrorKind::TypeMismatch),
        FieldType::Int => v
            .as_i64()
            .map(CoercedValue::Int)
            .ok_or(RuleEvalErrorKind::TypeMismatch),
        FieldType::Float => v
            .as_f64()
            .map(CoercedValue::Float)
            .ok_or(RuleEvalErrorKind::TypeMismatch),
        FieldType::Bool => v
            .as_bool()
            .map(CoercedValue::Bool)
            .ok_or(RuleEvalErrorKind::TypeMismatch),
        FieldType::Semver => v
            .as_str()
            .and_then(parse_semver)
            .map(CoercedValue::Semver)
            .ok_or(RuleEvalErrorKind::TypeMismatch),
    }
}
