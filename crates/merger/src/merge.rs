//! The Merger (C4): for each requested service, walks its layers in
//! priority order and folds matching variants into one parameter bundle
//! (§4.4).
//!
//! Every failure mode here is a silent skip, never a hard error (§7): a
//! missing key, a disabled layer, an unmatched bucket, and a rule that
//! errors against the request's context all just drop that layer out of
//! the merge. [`crate::telemetry::Counters`] is how an operator tells
//! those apart after the fact.

use crate::deep_merge::merge_into;
use crate::telemetry::Counters;
use serde_json::{Map, Value};
use std::collections::HashMap;
use variantflow_catalog::Snapshot;
use variantflow_core::{EvaluationRequest, EvaluationResponse, ServiceResult};
use variantflow_rules::EvalResult;

/// Evaluate `request` against `snapshot`, producing one [`ServiceResult`]
/// per requested service. Unknown services (no layers registered) come
/// back as [`ServiceResult::empty`], not an error (§4.5: unknown service
/// names are tolerated).
pub fn merge(request: &EvaluationRequest, snapshot: &Snapshot, counters: &Counters) -> EvaluationResponse {
    let mut results = HashMap::with_capacity(request.services.len());
    for service in &request.services {
        let result = merge_service(service, request, snapshot, counters);
        results.insert(service.clone(), result);
    }
    EvaluationResponse { results }
}

fn merge_service(
    service: &str,
    request: &EvaluationRequest,
    snapshot: &Snapshot,
    counters: &Counters,
) -> ServiceResult {
    let mut acc_params = Value::Object(Map::new());
    let mut matched_layers = Vec::new();
    let mut vids = Vec::new();

    for layer in snapshot.layers_for(service) {
        if !layer.enabled {
            counters.inc_disabled_layer();
            continue;
        }

        let key = match request.keys.get(&layer.hash_key) {
            Some(k) => k,
            None => {
                counters.inc_missing_key();
                continue;
            }
        };

        let b = variantflow_hasher::bucket(key, &layer.salt);
        let range = match layer.range_for_bucket(b) {
            Some(r) => r,
            None => {
                counters.inc_no_range_match();
                continue;
            }
        };

        let variant = match snapshot.variant(range.vid) {
            Some(v) => v,
            None => {
                // I1 guarantees this never happens once a Snapshot is
                // built; surfacing it as a skip-with-telemetry rather
                // than a panic keeps one bad Catalog build from taking
                // the whole evaluation path down with it.
                tracing::warn!(vid = range.vid.0, "variant missing from snapshot index");
                counters.inc_internal_inconsistency();
                continue;
            }
        };

        let matched = match &variant.rule {
            None => true,
            Some(rule) => match variantflow_rules::evaluate(rule, &request.context) {
                EvalResult::Match => true,
                EvalResult::NoMatch => false,
                EvalResult::Error(kind) => {
                    tracing::debug!(?kind, eid = variant.eid.0, "rule evaluation error, skipping layer");
                    counters.inc_rule_error();
                    false
                }
            },
        };

        if !matched {
            counters.inc_rule_no_match();
            continue;
        }

        merge_into(&mut acc_params, &variant.params);
        matched_layers.push(layer.layer_id.clone());
        vids.push(range.vid);
    }

    ServiceResult {
        parameters: acc_params,
        vids,
        matched_layers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use std::collections::HashMap as StdHashMap;
    use variantflow_catalog::builder::build;
    use variantflow_core::{Eid, Experiment, FieldType, FieldTypes, Layer, LayerId, Op, Range, Rule, RuleValue, ServiceScope, Variant, Vid};

    fn layer(id: &str, priority: i32, hash_key: &str, ranges: Vec<Range>) -> Layer {
        Layer::new(
            LayerId::new(id),
            "v1".to_string(),
            priority,
            hash_key.to_string(),
            None,
            true,
            ranges,
            ServiceScope::Single("checkout".to_string()),
        )
        .unwrap()
    }

    fn range(start: u32, end: u32, vid: i64) -> Range {
        Range { start, end, vid: Vid(vid) }
    }

    fn request(keys: &[(&str, &str)], context: &[(&str, Value)]) -> EvaluationRequest {
        EvaluationRequest {
            services: vec!["checkout".to_string()],
            keys: keys.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            context: context.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        }
    }

    // §8 scenario 1: single layer, bucket match.
    #[test]
    fn scenario_single_layer_bucket_match() {
        let l1 = layer("l1", 100, "user_id", vec![range(0, 10_000, 1)]);
        let exp = Experiment {
            eid: Eid(1),
            service: "checkout".to_string(),
            rule: None,
            variants: vec![Variant { vid: Vid(1), params: json!({"timeout": 50}) }],
        };
        let (snapshot, issues) = build(&vec![l1], &vec![exp], FieldTypes::new(), 1);
        assert!(issues.is_empty());

        let counters = Counters::new();
        let req = request(&[("user_id", "anything")], &[]);
        let resp = merge(&req, &snapshot, &counters);
        let result = &resp.results["checkout"];
        assert_eq!(result.parameters, json!({"timeout": 50}));
        assert_eq!(result.matched_layers, vec![LayerId::new("l1")]);
        assert_eq!(result.vids, vec![Vid(1)]);
    }

    // §8 scenario 2: priority merge across two layers covering the whole
    // key space, higher priority's keys win on conflict.
    #[test]
    fn scenario_priority_merge_across_layers() {
        let l_high = layer("high", 200, "user_id", vec![range(0, 10_000, 1)]);
        let l_low = layer("low", 100, "user_id", vec![range(0, 10_000, 2)]);
        let exp_high = Experiment {
            eid: Eid(1),
            service: "checkout".to_string(),
            rule: None,
            variants: vec![Variant { vid: Vid(1), params: json!({"timeout": 100, "cfg": {"x": 1, "y": 2}}) }],
        };
        let exp_low = Experiment {
            eid: Eid(2),
            service: "checkout".to_string(),
            rule: None,
            variants: vec![Variant { vid: Vid(2), params: json!({"timeout": 200, "cfg": {"x": 10, "z": 3}, "extra": "v"}) }],
        };
        let (snapshot, issues) = build(&vec![l_high, l_low], &vec![exp_high, exp_low], FieldTypes::new(), 1);
        assert!(issues.is_empty());

        let counters = Counters::new();
        let req = request(&[("user_id", "u1")], &[]);
        let resp = merge(&req, &snapshot, &counters);
        let result = &resp.results["checkout"];
        assert_eq!(
            result.parameters,
            json!({"timeout": 100, "cfg": {"x": 1, "y": 2, "z": 3}, "extra": "v"})
        );
        assert_eq!(result.matched_layers, vec![LayerId::new("high"), LayerId::new("low")]);
    }

    // §8 scenario 3: rule gating skips a layer whose experiment rule
    // doesn't match the request context.
    #[test]
    fn scenario_rule_gating_skips_non_matching_layer() {
        let mut ft = FieldTypes::new();
        ft.insert("country".to_string(), FieldType::String);
        let l1 = layer("l1", 100, "user_id", vec![range(0, 10_000, 1)]);
        let exp = Experiment {
            eid: Eid(1),
            service: "checkout".to_string(),
            rule: Some(Rule::Field {
                field: "country".to_string(),
                op: Op::Eq,
                values: vec![RuleValue::String("US".to_string())],
            }),
            variants: vec![Variant { vid: Vid(1), params: json!({"timeout": 50}) }],
        };
        let (snapshot, issues) = build(&vec![l1], &vec![exp], ft, 1);
        assert!(issues.is_empty());

        let counters = Counters::new();

        let matching = request(&[("user_id", "u1")], &[("country", json!("US"))]);
        let resp = merge(&matching, &snapshot, &counters);
        assert_eq!(resp.results["checkout"].parameters, json!({"timeout": 50}));

        let non_matching = request(&[("user_id", "u1")], &[("country", json!("CA"))]);
        let resp = merge(&non_matching, &snapshot, &counters);
        assert_eq!(resp.results["checkout"].parameters, json!({}));
        assert!(resp.results["checkout"].matched_layers.is_empty());
        assert_eq!(counters.snapshot().rule_no_match, 1);
    }

    // §8 scenario 4: salt independence. Two layers on the same hash_key
    // but distinct (default) salts can assign the same key to different
    // variants; each layer's own bucket decision is unaffected by the
    // other's salt.
    #[test]
    fn scenario_salt_independence() {
        let l1 = layer("l1", 200, "user_id", vec![range(0, 10_000, 1)]);
        let l2 = layer("l2", 100, "user_id", vec![range(0, 10_000, 2)]);
        let exp1 = Experiment {
            eid: Eid(1),
            service: "checkout".to_string(),
            rule: None,
            variants: vec![Variant { vid: Vid(1), params: json!({"from": "l1"}) }],
        };
        let exp2 = Experiment {
            eid: Eid(2),
            service: "checkout".to_string(),
            rule: None,
            variants: vec![Variant { vid: Vid(2), params: json!({"from": "l2"}) }],
        };
        let (snapshot, issues) = build(&vec![l1, l2], &vec![exp1, exp2], FieldTypes::new(), 1);
        assert!(issues.is_empty());

        let counters = Counters::new();
        let req = request(&[("user_id", "same-key")], &[]);
        let resp = merge(&req, &snapshot, &counters);
        let result = &resp.results["checkout"];
        // Both layers cover the full bucket space with distinct salts,
        // so both always match regardless of which variant each picks.
        assert_eq!(result.matched_layers.len(), 2);
        assert!(result.parameters.get("from").is_some());
    }

    #[test]
    fn missing_key_skips_layer_silently() {
        let l1 = layer("l1", 100, "user_id", vec![range(0, 10_000, 1)]);
        let exp = Experiment {
            eid: Eid(1),
            service: "checkout".to_string(),
            rule: None,
            variants: vec![Variant { vid: Vid(1), params: json!({"timeout": 50}) }],
        };
        let (snapshot, _) = build(&vec![l1], &vec![exp], FieldTypes::new(), 1);

        let counters = Counters::new();
        let req = request(&[("session_id", "s1")], &[]);
        let resp = merge(&req, &snapshot, &counters);
        assert_eq!(resp.results["checkout"].parameters, json!({}));
        assert_eq!(counters.snapshot().missing_key, 1);
    }

    #[test]
    fn disabled_layer_is_skipped() {
        let disabled = Layer::new(
            LayerId::new("l1"),
            "v1".to_string(),
            100,
            "user_id".to_string(),
            None,
            false,
            vec![range(0, 10_000, 1)],
            ServiceScope::Single("checkout".to_string()),
        )
        .unwrap();
        let exp = Experiment {
            eid: Eid(1),
            service: "checkout".to_string(),
            rule: None,
            variants: vec![Variant { vid: Vid(1), params: json!({"timeout": 50}) }],
        };
        let (snapshot, _) = build(&vec![disabled], &vec![exp], FieldTypes::new(), 1);

        let counters = Counters::new();
        let req = request(&[("user_id", "u1")], &[]);
        let resp = merge(&req, &snapshot, &counters);
        assert_eq!(resp.results["checkout"].parameters, json!({}));
        assert_eq!(counters.snapshot().disabled_layer, 1);
    }

    #[test]
    fn unknown_service_returns_empty_result_not_error() {
        let (snapshot, _) = build(&vec![], &vec![], FieldTypes::new(), 1);
        let counters = Counters::new();
        let req = EvaluationRequest {
            services: vec!["nonexistent".to_string()],
            keys: StdHashMap::from([("user_id".to_string(), "u1".to_string())]),
            context: StdHashMap::new(),
        };
        let resp = merge(&req, &snapshot, &counters);
        assert_eq!(resp.results["nonexistent"], ServiceResult::empty());
    }

    #[test]
    fn multiple_requested_services_are_independent() {
        let l1 = layer("l1", 100, "user_id", vec![range(0, 10_000, 1)]);
        let exp = Experiment {
            eid: Eid(1),
            service: "checkout".to_string(),
            rule: None,
            variants: vec![Variant { vid: Vid(1), params: json!({"timeout": 50}) }],
        };
        let (snapshot, _) = build(&vec![l1], &vec![exp], FieldTypes::new(), 1);

        let counters = Counters::new();
        let req = EvaluationRequest {
            services: vec!["checkout".to_string(), "search".to_string()],
            keys: StdHashMap::from([("user_id".to_string(), "u1".to_string())]),
            context: StdHashMap::new(),
        };
        let resp = merge(&req, &snapshot, &counters);
        assert_eq!(resp.results["checkout"].parameters, json!({"timeout": 50}));
        assert_eq!(resp.results["search"], ServiceResult::empty());
    }
}
