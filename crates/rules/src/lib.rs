//! Rule Evaluator (C2): compiles and evaluates the recursive boolean rule
//! tree defined in `variantflow_core::rule` against a request context.
//!
//! Two-phase design: [`compiled::compile`] runs once per Snapshot build,
//! validating I3 and pre-coercing literals/patterns; [`evaluate::evaluate`]
//! runs once per matching attempt on the hot evaluation path and performs
//! no allocation beyond what coercing the context value requires.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiled;
pub mod evaluate;
pub mod glob;
pub mod semver;
pub mod value;

pub use compiled::{compile, CompiledRule, Operand};
pub use evaluate::{evaluate, EvalResult};
pub use glob::GlobPattern;
pub use semver::{parse_semver, SemverTuple};
pub use value::CoercedValue;
