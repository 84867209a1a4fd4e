//! # VariantFlow
//!
//! A distributed A/B-testing and feature-flag evaluation core: layers of
//! traffic splits, experiments with boolean gating rules, and a single
//! `evaluate(request) -> response` entry point served against a
//! lock-free, versioned Snapshot.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use variantflow::{EvaluationRequest, EvaluationService, FieldTypes, StateManager};
//! use chrono::Utc;
//!
//! # fn main() -> variantflow::Result<()> {
//! let (manager, _issues) = StateManager::bootstrap(vec![], vec![], FieldTypes::new(), Utc::now());
//! let service = EvaluationService::new(Arc::new(manager));
//!
//! let request = EvaluationRequest {
//!     services: vec!["checkout".to_string()],
//!     keys: [("user_id".to_string(), "u-123".to_string())].into(),
//!     context: Default::default(),
//! };
//! let response = service.evaluate(&request)?;
//! assert!(response.results.contains_key("checkout"));
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! | Component | Crate | Role |
//! |---|---|---|
//! | Hasher | `variantflow-hasher` | deterministic key -> bucket mapping |
//! | Rule Evaluator | `variantflow-rules` | boolean gating rule compile/evaluate |
//! | Catalog | `variantflow-catalog` | builds the immutable Snapshot |
//! | Merger | `variantflow-merger` | priority-ordered parameter merge |
//! | State Manager / Fan-out | `variantflow-concurrency` | Snapshot publication, subscriber streaming |
//! | Change-Log Poller | `variantflow-changelog` | tails the authoritative change log |
//! | Evaluation API | `variantflow-api` | the public `evaluate` facade and wire protocol |
//!
//! [`EvaluationService`] is the main entry point; the internal crates are
//! re-exported here for convenience but are not independently versioned.

#![warn(missing_docs)]

pub use variantflow_api::*;
pub use variantflow_catalog::{LoadIssue, RejectedEntity, Snapshot};
pub use variantflow_changelog::{ChangeLogSource, ExperimentStore, LayerStore, Poller, PollerConfig};
pub use variantflow_concurrency::{
    ConfigChange, ConfigChangeKind, EntityChange, FanoutEvent, StateManager, SubscriberRegistry, SubscriberStats,
};
pub use variantflow_core::{
    Eid, Error, Experiment, EvaluationRequest, EvaluationResponse, FieldType, FieldTypes, Layer, LayerId, Op, Params,
    Range, Result, Rule, RuleValue, ServiceResult, ServiceScope, Variant, Vid,
};
pub use variantflow_merger::{Counters, CountersSnapshot};
