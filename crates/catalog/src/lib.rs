//! Catalog (C3): holds the current immutable [`Snapshot`] and the logic
//! to build one from raw layers/experiments/field types.
//!
//! Building a Snapshot recomputes the priority-sorted layer list per
//! service and the `vid -> experiment` index so that the Merger performs
//! no per-request sorting (§4.3).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
pub mod snapshot;

pub use builder::{build, LoadIssue, RejectedEntity};
pub use snapshot::{CompiledExperiment, Snapshot, VariantEntry};
