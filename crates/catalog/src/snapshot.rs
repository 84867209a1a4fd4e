//! The immutable Snapshot (C3): the in-memory view of all layers,
//! experiments, and field types at a version.

use std::collections::HashMap;
use std::sync::Arc;
use variantflow_core::{Eid, FieldTypes, Layer, LayerId, Vid};
use variantflow_rules::CompiledRule;

/// A compiled experiment: its gating rule (if any) and its variants,
/// ready for the Merger to consult via `variant_index` without walking
/// the full experiment.
#[derive(Debug, Clone)]
pub struct CompiledExperiment {
    /// Experiment identifier.
    pub eid: Eid,
    /// The service this experiment's parameters apply to.
    pub service: String,
    /// Compiled gating rule; `None` means "always match" (empty rule).
    pub rule: Option<Arc<CompiledRule>>,
}

/// An entry in the Snapshot's `variant_index`: everything the Merger
/// needs to evaluate and apply one matched variant without a second
/// lookup.
#[derive(Debug, Clone)]
pub struct VariantEntry {
    /// The owning experiment's id.
    pub eid: Eid,
    /// The owning experiment's compiled gating rule.
    pub rule: Option<Arc<CompiledRule>>,
    /// This variant's JSON-shaped parameter tree.
    pub params: variantflow_core::Params,
}

/// Immutable tuple `(layers_by_id, experiments_by_eid, variant_index,
/// layers_by_service, field_types, version)` per §3. Built once by
/// [`crate::builder::build`], then shared read-only across every reader
/// for as long as they hold a reference (I4: evaluation never observes a
/// half-applied change).
#[derive(Debug, Clone)]
pub struct Snapshot {
    layers_by_id: HashMap<LayerId, Arc<Layer>>,
    experiments_by_eid: HashMap<Eid, Arc<CompiledExperiment>>,
    variant_index: HashMap<Vid, VariantEntry>,
    layers_by_service: HashMap<String, Vec<Arc<Layer>>>,
    field_types: Arc<FieldTypes>,
    version: u64,
}

impl Snapshot {
    /// Construct a Snapshot from its already-validated parts. Only
    /// [`crate::builder::build`] should call this; it is the single
    /// place that upholds I1/I2.
    pub(crate) fn from_parts(
        layers_by_id: HashMap<LayerId, Arc<Layer>>,
        experiments_by_eid: HashMap<Eid, Arc<CompiledExperiment>>,
        variant_index: HashMap<Vid, VariantEntry>,
        layers_by_service: HashMap<String, Vec<Arc<Layer>>>,
        field_types: Arc<FieldTypes>,
        version: u64,
    ) -> Self {
        Snapshot {
            layers_by_id,
            experiments_by_eid,
            variant_index,
            layers_by_service,
            field_types,
            version,
        }
    }

    /// An empty Snapshot at version 0, for tests and cold starts.
    pub fn empty(version: u64) -> Self {
        Snapshot {
            layers_by_id: HashMap::new(),
            experiments_by_eid: HashMap::new(),
            variant_index: HashMap::new(),
            layers_by_service: HashMap::new(),
            field_types: Arc::new(FieldTypes::new()),
            version,
        }
    }

    /// The layers scoped to `service`, already ordered by priority
    /// descending then `layer_id` ascending (§3, §4.3): the Merger
    /// performs no per-request sorting.
    pub fn layers_for(&self, service: &str) -> &[Arc<Layer>] {
        self.layers_by_service
            .get(service)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Look up a variant by its vid.
    pub fn variant(&self, vid: Vid) -> Option<&VariantEntry> {
        self.variant_index.get(&vid)
    }

    /// Look up a layer by id.
    pub fn layer(&self, layer_id: &str) -> Option<&Arc<Layer>> {
        self.layers_by_id.get(layer_id)
    }

    /// Look up a compiled experiment by id.
    pub fn experiment(&self, eid: Eid) -> Option<&Arc<CompiledExperiment>> {
        self.experiments_by_eid.get(&eid)
    }

    /// The declared field types for this Snapshot.
    pub fn field_types(&self) -> &FieldTypes {
        &self.field_types
    }

    /// The monotonically non-decreasing Snapshot version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of layers currently held by this Snapshot.
    pub fn layer_count(&self) -> usize {
        self.layers_by_id.len()
    }

    /// Number of experiments currently held by this Snapshot.
    pub fn experiment_count(&self) -> usize {
        self.experiments_by_eid.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_snapshot_has_no_layers_for_any_service() {
        let snap = Snapshot::empty(1);
        assert!(snap.layers_for("checkout").is_empty());
        assert_eq!(snap.version(), 1);
        assert_eq!(snap.layer_count(), 0);
    }

    static_assertions::assert_impl_all!(Snapshot: Send, Sync);
}
