//! The rule tree: a recursive boolean sum type evaluated against a
//! request context.
//!
//! Per §3: `field{field, op, values}`, `and{children}`, `or{children}`,
//! `not{child}`. Children are stored in `SmallVec` rather than `Vec`
//! (§9 Design Notes: "arenas or small-vector storage for children yield
//! better locality"); the common case is two to four children.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Inline capacity for `and`/`or` child lists before spilling to the heap.
pub type RuleChildren = SmallVec<[Box<Rule>; 4]>;

/// Comparison/membership operator applied to a `field` rule node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Op {
    /// Scalar equality. `values` must contain exactly one element.
    Eq,
    /// Scalar inequality. `values` must contain exactly one element.
    Neq,
    /// Numeric or semver greater-than.
    Gt,
    /// Numeric or semver greater-than-or-equal.
    Gte,
    /// Numeric or semver less-than.
    Lt,
    /// Numeric or semver less-than-or-equal.
    Lte,
    /// Set membership: context value equals one of `values`.
    In,
    /// Negated set membership.
    NotIn,
    /// Glob match (`*` only) against the whole string value.
    Like,
    /// Negated glob match.
    NotLike,
}

impl Op {
    /// The operator whose result is always the logical negation of this
    /// one, where defined (P8 rule completeness).
    pub fn negation(self) -> Option<Op> {
        match self {
            Op::Eq => Some(Op::Neq),
            Op::Neq => Some(Op::Eq),
            Op::In => Some(Op::NotIn),
            Op::NotIn => Some(Op::In),
            Op::Like => Some(Op::NotLike),
            Op::NotLike => Some(Op::Like),
            // gt/gte/lt/lte have no single negating operator in this set
            // (e.g. !(a > b) is (a <= b), not representable as one op
            // applied to the same operand order without swapping).
            Op::Gt | Op::Gte | Op::Lt | Op::Lte => None,
        }
    }
}

/// A scalar value as it appears in a rule's `values` list, tagged by the
/// kind it was declared with in the layer/experiment payload. Coercion
/// against the context's `FieldType` happens at evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleValue {
    /// A string literal.
    String(String),
    /// A signed integer literal.
    Int(i64),
    /// A floating point literal.
    Float(f64),
    /// A boolean literal.
    Bool(bool),
}

/// A node in the recursive rule tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Rule {
    /// Leaf node: compare a context field against a set of values.
    Field {
        /// The context attribute name to look up.
        field: String,
        /// The comparison/membership operator.
        op: Op,
        /// The operand values. Arity depends on `op` (§4.2).
        values: Vec<RuleValue>,
    },
    /// All children must `Match`, short-circuiting left to right. Empty
    /// `children` is illegal and rejected at load time.
    And {
        /// The conjuncts.
        children: RuleChildren,
    },
    /// Any child must `Match`, short-circuiting left to right. Empty
    /// `children` is illegal and rejected at load time.
    Or {
        /// The disjuncts.
        children: RuleChildren,
    },
    /// Negates the child's `Match`/`NoMatch` result; propagates `Error`.
    Not {
        /// The negated sub-rule.
        child: Box<Rule>,
    },
}

impl Rule {
    /// An always-matching rule: an empty `and` is illegal, so the
    /// canonical "no gating rule" is represented by the experiment layer
    /// as `Option<Rule>`, not by this helper. Exposed for test fixtures
    /// that need a trivially-true leaf.
    pub fn always_true_field(field: impl Into<String>) -> Rule {
        Rule::Field {
            field: field.into(),
            op: Op::Eq,
            values: vec![RuleValue::Bool(true)],
        }
    }
}
