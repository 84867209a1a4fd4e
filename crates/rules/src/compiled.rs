//! Compiling a wire-format [`Rule`] into a form ready for repeated,
//! allocation-light evaluation: literals pre-coerced to their field's
//! declared type, glob patterns pre-split. Compilation happens once per
//! Snapshot build (§4.3: "the Merger performs no per-request sorting" —
//! the same discipline extends to rule compilation).

use crate::glob::GlobPattern;
use crate::value::{coerce_rule_literal, compile_pattern_literal, CoercedValue};
use smallvec::SmallVec;
use variantflow_core::error::LoadErrorKind;
use variantflow_core::limits::{MAX_RULE_DEPTH, MAX_RULE_VALUES};
use variantflow_core::{FieldType, FieldTypes, Op, Rule, RuleValue};

/// The operand shape a compiled `field` node carries, chosen by `op`'s arity.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// `eq`/`neq`: a single value to compare against.
    Single(CoercedValue),
    /// `gt`/`gte`/`lt`/`lte`: a single orderable value.
    Ordered(CoercedValue),
    /// `in`/`not_in`: the membership set.
    Set(Vec<CoercedValue>),
    /// `like`/`not_like`: a compiled glob pattern.
    Pattern(GlobPattern),
}

/// A compiled rule tree node.
#[derive(Debug, Clone, PartialEq)]
pub enum CompiledRule {
    /// Leaf node, with its operand pre-coerced to the field's declared type.
    Field {
        /// The context attribute name to look up at evaluation time.
        field: String,
        /// The operator.
        op: Op,
        /// The declared type of `field`, used to coerce the context value.
        field_type: FieldType,
        /// The pre-coerced operand.
        operand: Operand,
    },
    /// Conjunction; short-circuits left to right at evaluation time.
    And(SmallVec<[Box<CompiledRule>; 4]>),
    /// Disjunction; short-circuits left to right at evaluation time.
    Or(SmallVec<[Box<CompiledRule>; 4]>),
    /// Negation.
    Not(Box<CompiledRule>),
}

/// Compile `rule` against `field_types`, validating I3 (every referenced
/// field is declared) and the structural constraints in §4.2 (non-empty
/// boolean groups, arity matching `op`, operator legality for the
/// field's declared type).
pub fn compile(rule: &Rule, field_types: &FieldTypes) -> Result<CompiledRule, LoadErrorKind> {
    compile_depth(rule, field_types, 0)
}

fn compile_depth(
    rule: &Rule,
    field_types: &FieldTypes,
    depth: usize,
) -> Result<CompiledRule, LoadErrorKind> {
    if depth > MAX_RULE_DEPTH {
        return Err(LoadErrorKind::InvalidRule(format!(
            "rule tree exceeds max depth of {MAX_RULE_DEPTH}"
        )));
    }
    match rule {
        Rule::Field { field, op, values } => compile_field(field, *op, values, field_types),
        Rule::And { children } => {
            if children.is_empty() {
                return Err(LoadErrorKind::InvalidRule(
                    "and node has no children".to_string(),
                ));
            }
            let compiled: SmallVec<[Box<CompiledRule>; 4]> = children
                .iter()
                .map(|c| compile_depth(c, field_types, depth + 1).map(Box::new))
                .collect::<Result<_, _>>()?;
            Ok(CompiledRule::And(compiled))
        }
        Rule::Or { children } => {
            if children.is_empty() {
                return Err(LoadErrorKind::InvalidRule(
                    "or node has no children".to_string(),
                ));
            }
            let compiled: SmallVec<[Box<CompiledRule>; 4]> = children
                .iter()
                .map(|c| compile_depth(c, field_types, depth + 1).map(Box::new))
                .collect::<Result<_, _>>()?;
            Ok(CompiledRule::Or(compiled))
        }
        Rule::Not { child } => {
            Ok(CompiledRule::Not(Box::new(compile_depth(
                child,
                field_types,
                depth + 1,
            )?)))
        }
    }
}

fn compile_field(
    field: &str,
    op: Op,
    values: &[RuleValue],
    field_types: &FieldTypes,
) -> Result<CompiledRule, LoadErrorKind> {
    let field_type = *field_types
        .get(field)
        .ok_or_else(|| LoadErrorKind::UndeclaredField {
            field: field.to_string(),
        })?;

    let operand = match op {
        Op::Eq | Op::Neq => {
            require_arity(values, 1, op)?;
            Operand::Single(coerce_literal_or_invalid(&values[0], field_type)?)
        }
        Op::Gt | Op::Gte | Op::Lt | Op::Lte => {
            if !matches!(field_type, FieldType::Int | FieldType::Float | FieldType::Semver) {
                return Err(LoadErrorKind::InvalidRule(format!(
                    "operator {op:?} is not legal for field type {field_type:?}"
                )));
            }
            require_arity(values, 1, op)?;
            Operand::Ordered(coerce_literal_or_invalid(&values[0], field_type)?)
        }
        Op::In | Op::NotIn => {
            if values.is_empty() || values.len() > MAX_RULE_VALUES {
                return Err(LoadErrorKind::InvalidRule(format!(
                    "{op:?} requires between 1 and {MAX_RULE_VALUES} values"
                )));
            }
            let coerced = values
                .iter()
                .map(|v| coerce_literal_or_invalid(v, field_type))
                .collect::<Result<Vec<_>, _>>()?;
            Operand::Set(coerced)
        }
        Op::Like | Op::NotLike => {
            if field_type != FieldType::String {
                return Err(LoadErrorKind::InvalidRule(
                    "like/not_like is only legal for string fields".to_string(),
                ));
            }
            require_arity(values, 1, op)?;
            let pattern = compile_pattern_literal(&values[0]).map_err(|_| {
                LoadErrorKind::InvalidRule(format!("invalid pattern literal for field {field}"))
            })?;
            Operand::Pattern(pattern)
        }
    };

    Ok(CompiledRule::Field {
        field: field.to_string(),
        op,
        field_type,
        operand,
    })
}

fn require_arity(values: &[RuleValue], expected: usize, op: Op) -> Result<(), LoadErrorKind> {
    if values.len() != expected {
        return Err(LoadErrorKind::InvalidRule(format!(
            "{op:?} requires exactly {expected} value(s), got {}",
            values.len()
        )));
    }
    Ok(())
}

fn coerce_literal_or_invalid(
    v: &RuleValue,
    field_type: FieldType,
) -> Result<CoercedValue, LoadErrorKind> {
    coerce_rule_literal(v, field_type)
        .map_err(|_| LoadErrorKind::InvalidRule(format!("literal does not match field type {field_type:?}")))
}
