//! The Evaluation API (C5): `evaluate(request) -> response` (§4.5).
//!
//! Steps: validate the request, acquire a reference to the current
//! Snapshot (O(1), no copy), invoke the Merger, format the response.
//! No blocking, no I/O — a thin facade that validates and delegates,
//! owning no state of its own beyond what it's handed.

use std::sync::Arc;
use variantflow_concurrency::StateManager;
use variantflow_core::{Error, EvaluationRequest, EvaluationResponse, Result};
use variantflow_merger::Counters;

/// The evaluation facade: holds a [`StateManager`] handle and the
/// process-wide skip counters, and answers [`EvaluationService::evaluate`]
/// calls against whatever Snapshot is current at request time.
pub struct EvaluationService {
    manager: Arc<StateManager>,
    counters: Counters,
}

impl EvaluationService {
    /// Wrap a [`StateManager`] behind the evaluation facade.
    pub fn new(manager: Arc<StateManager>) -> Self {
        EvaluationService { manager, counters: Counters::new() }
    }

    /// Evaluate `request` against the current Snapshot (§4.5).
    ///
    /// The evaluation path never suspends (§5): once the Snapshot `Arc`
    /// is acquired, everything downstream is pure computation.
    pub fn evaluate(&self, request: &EvaluationRequest) -> Result<EvaluationResponse> {
        request.validate().map_err(Error::RequestInvalid)?;
        let snapshot = self.manager.current();
        let response = variantflow_merger::merge(request, &snapshot, &self.counters);
        Ok(response)
    }

    /// The skip-reason counters accumulated across every [`Self::evaluate`]
    /// call so far.
    pub fn counters(&self) -> variantflow_merger::CountersSnapshot {
        self.counters.snapshot()
    }

    /// The Snapshot version currently being served.
    pub fn current_version(&self) -> u64 {
        self.manager.current().version()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;
    use std::collections::HashMap;
    use variantflow_core::{Eid, Experiment, FieldTypes, Layer, LayerId, Range, ServiceScope, Variant, Vid};
    use variantflow_concurrency::StateManager;

    fn layer() -> Layer {
        Layer::new(
            LayerId::new("l1"),
            "v1".to_string(),
            100,
            "user_id".to_string(),
            None,
            true,
            vec![Range { start: 0, end: 10_000, vid: Vid(1) }],
            ServiceScope::Single("checkout".to_string()),
        )
        .unwrap()
    }

    fn experiment() -> Experiment {
        Experiment {
            eid: Eid(1),
            service: "checkout".to_string(),
            rule: None,
            variants: vec![Variant { vid: Vid(1), params: json!({"timeout": 50}) }],
        }
    }

    #[test]
    fn evaluate_rejects_empty_services() {
        let (manager, _) = StateManager::bootstrap(vec![], vec![], FieldTypes::new(), Utc::now());
        let service = EvaluationService::new(Arc::new(manager));
        let req = EvaluationRequest {
            services: vec![],
            keys: HashMap::from([("user_id".to_string(), "u1".to_string())]),
            context: HashMap::new(),
        };
        let err = service.evaluate(&req).unwrap_err();
        assert!(err.is_request_fault());
    }

    #[test]
    fn evaluate_returns_merged_parameters() {
        let (manager, _) = StateManager::bootstrap(vec![layer()], vec![experiment()], FieldTypes::new(), Utc::now());
        let service = EvaluationService::new(Arc::new(manager));
        let req = EvaluationRequest {
            services: vec!["checkout".to_string()],
            keys: HashMap::from([("user_id".to_string(), "u1".to_string())]),
            context: HashMap::new(),
        };
        let resp = service.evaluate(&req).unwrap();
        assert_eq!(resp.results["checkout"].parameters, json!({"timeout": 50}));
    }

    #[test]
    fn evaluate_observes_the_current_version_each_call() {
        let (manager, _) = StateManager::bootstrap(vec![], vec![], FieldTypes::new(), Utc::now());
        let manager = Arc::new(manager);
        let service = EvaluationService::new(manager.clone());
        let v0 = service.current_version();
        manager.apply(variantflow_concurrency::EntityChange::Layer(layer()), Utc::now());
        assert!(service.current_version() > v0);
    }
}
