//! Merger (C4): folds a request's matching layers into one parameter
//! bundle per requested service (§4.4).
//!
//! Built on top of the Hasher (bucket assignment), Rule Evaluator (gating),
//! and Catalog (the Snapshot being merged against). This is the
//! highest-traffic component: [`merge`] runs once per incoming evaluation
//! request and must not allocate more than the response it returns.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod deep_merge;
pub mod merge;
pub mod telemetry;

pub use deep_merge::merge_into;
pub use merge::merge;
pub use telemetry::{Counters, CountersSnapshot};
