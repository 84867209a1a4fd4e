//! Evaluation request/response shapes (§3, §6).

use crate::ids::{LayerId, Vid};
use crate::Params;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A caller's evaluation request: the services to evaluate, the
/// identifying keys used for bucketing, and the context attributes used
/// for rule gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// The services to produce a parameter bundle for.
    pub services: Vec<String>,
    /// Identifying keys, keyed by the name a layer's `hash_key` selects.
    pub keys: HashMap<String, String>,
    /// Context attributes used to gate experiment rules.
    #[serde(default)]
    pub context: HashMap<String, Params>,
}

impl EvaluationRequest {
    /// Validate the request per §4.5: non-empty `services`, at least one key.
    pub fn validate(&self) -> Result<(), String> {
        if self.services.is_empty() {
            return Err("services must not be empty".to_string());
        }
        if self.keys.is_empty() {
            return Err("keys must not be empty".to_string());
        }
        Ok(())
    }
}

/// The merged result for one requested service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceResult {
    /// The merged JSON-shaped parameter bundle.
    pub parameters: Params,
    /// Variant ids that matched, in the order their layers were processed.
    pub vids: Vec<Vid>,
    /// Layer ids that matched, in the order they were processed.
    pub matched_layers: Vec<LayerId>,
}

impl ServiceResult {
    /// The result for a service with no matching layers: empty
    /// parameters, empty `matched_layers`/`vids`. Not an error (§7 NoMatch).
    pub fn empty() -> Self {
        ServiceResult {
            parameters: serde_json::Value::Object(serde_json::Map::new()),
            vids: Vec::new(),
            matched_layers: Vec::new(),
        }
    }
}

/// The evaluation response: one `ServiceResult` per requested service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResponse {
    /// Results, keyed by service name.
    pub results: HashMap<String, ServiceResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_validation_rejects_empty_services() {
        let req = EvaluationRequest {
            services: vec![],
            keys: HashMap::from([("user_id".to_string(), "u1".to_string())]),
            context: HashMap::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn request_validation_rejects_empty_keys() {
        let req = EvaluationRequest {
            services: vec!["s1".to_string()],
            keys: HashMap::new(),
            context: HashMap::new(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn request_validation_accepts_minimal_valid_request() {
        let req = EvaluationRequest {
            services: vec!["s1".to_string()],
            keys: HashMap::from([("user_id".to_string(), "u1".to_string())]),
            context: HashMap::new(),
        };
        assert!(req.validate().is_ok());
    }

    #[test]
    fn service_result_empty_has_no_matches() {
        let r = ServiceResult::empty();
        assert!(r.vids.is_empty());
        assert!(r.matched_layers.is_empty());
        assert!(r.parameters.as_object().unwrap().is_empty());
    }
}
