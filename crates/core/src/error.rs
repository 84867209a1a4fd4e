//! Error types for the evaluation core
//!
//! This module defines the unified error taxonomy used across the
//! evaluation path and the config-load path. We use `thiserror` for
//! automatic `Display` and `Error` trait implementations, matching the
//! convention used throughout this workspace's crates.
//!
//! ## Error Categories
//!
//! - **RequestInvalid**: the caller's request is malformed.
//! - **RuleEval**: a rule could not be evaluated against a context
//!   (missing field, type coercion failure, malformed operator). Treated
//!   as NoMatch for the affected group, never surfaced as a hard failure.
//! - **Load**: an entity was rejected while building a Snapshot. The rest
//!   of the Snapshot still builds; this is reported, not fatal.
//! - **Storage**: a transient failure reloading an entity from the
//!   authoritative store.
//! - **SubscriberOverflow**: a subscriber's bounded queue filled up.
//! - **Internal**: a Snapshot invariant was violated; this indicates a
//!   bug, not a caller or environment fault.
//!
//! `NoMatch` is deliberately absent from this enum: per the contract, no
//! match is not an error, it is an empty result (see
//! `variantflow_core::request::ServiceResult::empty`).

use thiserror::Error;

/// Result type alias for evaluation-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why a rule node's evaluation produced `Error` rather than `Match`/`NoMatch`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuleEvalErrorKind {
    /// The referenced field is absent from the request context.
    #[error("missing context field")]
    MissingField,
    /// The context value could not be coerced to the field's declared type.
    #[error("type coercion failure")]
    TypeMismatch,
    /// The operator is not legal for the field's declared type, or its
    /// `values` arity is wrong (e.g. `eq` with zero or multiple values).
    #[error("malformed operator")]
    MalformedOperator,
    /// An `and`/`or` node had an empty child list, which is illegal.
    #[error("empty boolean group")]
    EmptyGroup,
}

/// Why a layer or experiment was rejected while building a Snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadErrorKind {
    /// A rule referenced a field name with no entry in `field_types` (I3).
    #[error("rule references undeclared field {field:?}")]
    UndeclaredField {
        /// The offending field name.
        field: String,
    },
    /// Two ranges on the same layer overlap, or a range is out of `[0,10000)`.
    #[error("overlapping or out-of-bounds range")]
    InvalidRanges,
    /// A `vid` appears in more than one layer's range list (I2 violation).
    #[error("vid {vid} claimed by more than one layer")]
    DuplicateVid {
        /// The vid claimed twice.
        vid: i64,
    },
    /// A range's `vid` has no corresponding variant in any experiment.
    #[error("vid {vid} has no corresponding variant")]
    UnresolvedVid {
        /// The vid with no variant.
        vid: i64,
    },
    /// A rule is structurally invalid in a way knowable without a
    /// request context: an empty `and`/`or` group, a `values` arity that
    /// doesn't fit `op`, or an operator illegal for the field's declared
    /// type (§4.2: "empty children sets are illegal, rejected at load").
    #[error("invalid rule: {0}")]
    InvalidRule(String),
}

/// The unified error type for the evaluation core.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller's request was malformed (empty `services`, no keys).
    #[error("invalid request: {0}")]
    RequestInvalid(String),

    /// A rule failed to evaluate; treated as NoMatch for its group.
    #[error("rule evaluation error: {0}")]
    RuleEval(#[from] RuleEvalErrorKind),

    /// An entity was rejected while building a Snapshot.
    #[error("load error: {0}")]
    Load(#[from] LoadErrorKind),

    /// A transient failure reloading an entity from the authoritative store.
    #[error("storage error: {0}")]
    Storage(String),

    /// A subscriber's bounded queue overflowed.
    #[error("subscriber {subscriber_id} overflowed its queue")]
    SubscriberOverflow {
        /// The id of the overflowing subscriber.
        subscriber_id: String,
    },

    /// A Snapshot invariant was violated. Indicates a bug upstream of the
    /// evaluation path, not a caller fault.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether retrying the operation that produced this error could
    /// plausibly succeed (true only for transient storage failures).
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Storage(_))
    }

    /// Whether this error is the caller's fault, as opposed to an
    /// environment or internal fault.
    pub fn is_request_fault(&self) -> bool {
        matches!(self, Error::RequestInvalid(_))
    }
}
