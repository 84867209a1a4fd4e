//! Builds a validated [`Snapshot`] from raw layers/experiments/field
//! types, per §4.3/§4.7. Invalid entities are skipped, not fatal (§7
//! LoadError: "that entity omitted from the Snapshot; the rest succeeds").

use crate::snapshot::{CompiledExperiment, Snapshot, VariantEntry};
use std::collections::HashMap;
use std::sync::Arc;
use variantflow_core::error::LoadErrorKind;
use variantflow_core::layer::layer_priority_order;
use variantflow_core::{Eid, Experiment, FieldTypes, Layer, LayerId, Vid};

/// One entity rejected while building a Snapshot, for telemetry (§7:
/// "counted, logged at warn").
#[derive(Debug, Clone, PartialEq)]
pub struct LoadIssue {
    /// What kind of entity was rejected.
    pub entity: RejectedEntity,
    /// Why it was rejected.
    pub reason: LoadErrorKind,
}

/// Identifies the rejected entity for telemetry/logging purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectedEntity {
    /// A layer was rejected.
    Layer(LayerId),
    /// An experiment was rejected.
    Experiment(Eid),
}

/// Build a Snapshot at `version` from the given entities. Never fails:
/// invalid entities are reported in the returned issue list and omitted
/// from the Snapshot; the rest of the build still succeeds.
pub fn build(
    layers: &[Layer],
    experiments: &[Experiment],
    field_types: FieldTypes,
    version: u64,
) -> (Snapshot, Vec<LoadIssue>) {
    let mut issues = Vec::new();
    let field_types = Arc::new(field_types);

    let mut compiled_experiments: HashMap<Eid, Arc<CompiledExperiment>> = HashMap::new();
    let mut variant_owner: HashMap<Vid, (Eid, variantflow_core::Params)> = HashMap::new();

    for exp in experiments {
        match compile_experiment(exp, &field_types) {
            Ok(compiled) => {
                for v in &exp.variants {
                    variant_owner.insert(v.vid, (exp.eid, v.params.clone()));
                }
                compiled_experiments.insert(exp.eid, Arc::new(compiled));
            }
            Err(reason) => {
                tracing::warn!(eid = exp.eid.0, ?reason, "rejecting experiment at snapshot build");
                issues.push(LoadIssue {
                    entity: RejectedEntity::Experiment(exp.eid),
                    reason,
                });
            }
        }
    }

    let mut layers_by_id = HashMap::new();
    let mut variant_index: HashMap<Vid, VariantEntry> = HashMap::new();
    let mut claimed_vids: HashMap<Vid, LayerId> = HashMap::new();
    let mut accepted_layers: Vec<Arc<Layer>> = Vec::new();

    for layer in layers {
        match resolve_layer(layer, &compiled_experiments, &variant_owner, &claimed_vids) {
            Ok(entries) => {
                for vid in layer.ranges.iter().map(|r| r.vid) {
                    claimed_vids.insert(vid, layer.layer_id.clone());
                }
                for (vid, entry) in entries {
                    variant_index.insert(vid, entry);
                }
                let arc_layer = Arc::new(layer.clone());
                layers_by_id.insert(layer.layer_id.clone(), arc_layer.clone());
                accepted_layers.push(arc_layer);
            }
            Err(reason) => {
                tracing::warn!(layer_id = %layer.layer_id, ?reason, "rejecting layer at snapshot build");
                issues.push(LoadIssue {
                    entity: RejectedEntity::Layer(layer.layer_id.clone()),
                    reason,
                });
            }
        }
    }

    let mut layers_by_service: HashMap<String, Vec<Arc<Layer>>> = HashMap::new();
    for layer in &accepted_layers {
        for service in layer.scope.iter() {
            layers_by_service
                .entry(service.to_string())
                .or_default()
                .push(layer.clone());
        }
    }
    for list in layers_by_service.values_mut() {
        list.sort_by(|a, b| layer_priority_order(a, b));
    }

    tracing::info!(
        version,
        layers = layers_by_id.len(),
        experiments = compiled_experiments.len(),
        rejected = issues.len(),
        "built snapshot"
    );

    let snapshot = Snapshot::from_parts(
        layers_by_id,
        compiled_experiments,
        variant_index,
        layers_by_service,
        field_types,
        version,
    );
    (snapshot, issues)
}

fn compile_experiment(
    exp: &Experiment,
    field_types: &FieldTypes,
) -> Result<CompiledExperiment, LoadErrorKind> {
    let rule = match &exp.rule {
        Some(r) => Some(Arc::new(variantflow_rules::compile(r, field_types)?)),
        None => None,
    };
    Ok(CompiledExperiment {
        eid: exp.eid,
        service: exp.service.clone(),
        rule,
    })
}

/// Resolve every range in `layer` to a `VariantEntry`, or reject the
/// whole layer (I2/I3 granularity: §9 "the snapshot refuses the layer
/// that references it").
fn resolve_layer(
    layer: &Layer,
    compiled_experiments: &HashMap<Eid, Arc<CompiledExperiment>>,
    variant_owner: &HashMap<Vid, (Eid, variantflow_core::Params)>,
    claimed_vids: &HashMap<Vid, LayerId>,
) -> Result<Vec<(Vid, VariantEntry)>, LoadErrorKind> {
    let mut entries = Vec::with_capacity(layer.ranges.len());
    for range in &layer.ranges {
        if let Some(owner) = claimed_vids.get(&range.vid) {
            if owner != &layer.layer_id {
                return Err(LoadErrorKind::DuplicateVid { vid: range.vid.0 });
            }
        }
        let (eid, params) = variant_owner
            .get(&range.vid)
            .ok_or(LoadErrorKind::UnresolvedVid { vid: range.vid.0 })?;
        let compiled_exp = compiled_experiments
            .get(eid)
            .ok_or(LoadErrorKind::UnresolvedVid { vid: range.vid.0 })?;
        entries.push((
            range.vid,
            VariantEntry {
                eid: *eid,
                rule: compiled_exp.rule.clone(),
                params: params.clone(),
            },
        ));
    }
    Ok(entries)
}
