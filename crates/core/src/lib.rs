//! Core types and traits for VariantFlow
//!
//! This crate defines the foundational data model used throughout the
//! evaluation core:
//! - Identifiers: `LayerId`, `Eid`, `Vid`
//! - `FieldType` / `FieldTypes`: the declared type of each context attribute
//! - `Rule`: the recursive boolean rule tree evaluated against a context
//! - `Layer`, `Range`, `Experiment`, `Variant`: the configuration entities
//! - `EvaluationRequest` / `EvaluationResponse`: the request/response shapes
//! - `Error` / `Result`: the unified error type hierarchy
//! - `limits`: size and arity limits enforced at load time

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod experiment;
pub mod field_type;
pub mod ids;
pub mod layer;
pub mod limits;
pub mod request;
pub mod rule;

pub use error::{Error, LoadErrorKind, Result, RuleEvalErrorKind};
pub use experiment::{Experiment, Variant};
pub use field_type::{FieldType, FieldTypes};
pub use ids::{Eid, LayerId, Vid};
pub use layer::{Layer, Range, ServiceScope};
pub use limits::HASH_SLOTS;
pub use request::{EvaluationRequest, EvaluationResponse, ServiceResult};
pub use rule::{Op, Rule, RuleValue};

/// A JSON-shaped parameter tree, as carried by variants and returned to callers.
pub type Params = serde_json::Value;
