//! The raw entity store backing Snapshot (re)builds.
//!
//! The Catalog's [`variantflow_catalog::build`] needs the full set of
//! layers and experiments on every build (§4.7: "recompute the affected
//! service lists and the `variant_index`"); this module holds that set
//! so the State Manager can apply one change-log entry and rebuild.

use std::collections::HashMap;
use variantflow_core::{Eid, Experiment, FieldTypes, Layer, LayerId};

/// The authoritative-store mirror the State Manager mutates as
/// change-log entries are applied.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    layers: HashMap<LayerId, Layer>,
    experiments: HashMap<Eid, Experiment>,
    field_types: FieldTypes,
}

impl EntityStore {
    /// Build a store from an initial full load (§4.7 startup: "Load all
    /// layers and experiments from the authoritative store").
    pub fn new(layers: Vec<Layer>, experiments: Vec<Experiment>, field_types: FieldTypes) -> Self {
        EntityStore {
            layers: layers.into_iter().map(|l| (l.layer_id.clone(), l)).collect(),
            experiments: experiments.into_iter().map(|e| (e.eid, e)).collect(),
            field_types,
        }
    }

    /// Insert or replace a layer; returns whether one was already present
    /// (distinguishes `create` from `update` for the emitted `ConfigChange`).
    pub fn upsert_layer(&mut self, layer: Layer) -> bool {
        self.layers.insert(layer.layer_id.clone(), layer).is_some()
    }

    /// Remove a layer by id; returns the removed layer, if any.
    pub fn remove_layer(&mut self, id: &LayerId) -> Option<Layer> {
        self.layers.remove(id)
    }

    /// Insert or replace an experiment; returns whether one was already present.
    pub fn upsert_experiment(&mut self, experiment: Experiment) -> bool {
        self.experiments.insert(experiment.eid, experiment).is_some()
    }

    /// Remove an experiment by id; returns the removed experiment, if any.
    pub fn remove_experiment(&mut self, eid: Eid) -> Option<Experiment> {
        self.experiments.remove(&eid)
    }

    /// Replace the declared field types wholesale (§6 `set_field_types`).
    pub fn set_field_types(&mut self, field_types: FieldTypes) {
        self.field_types = field_types;
    }

    /// The current field types (§6 `get_field_types`).
    pub fn field_types(&self) -> &FieldTypes {
        &self.field_types
    }

    /// Snapshot the current layers as an owned `Vec`, for a Catalog rebuild.
    pub fn layers_vec(&self) -> Vec<Layer> {
        self.layers.values().cloned().collect()
    }

    /// Snapshot the current experiments as an owned `Vec`, for a Catalog rebuild.
    pub fn experiments_vec(&self) -> Vec<Experiment> {
        self.experiments.values().cloned().collect()
    }

    /// Look up a layer by id.
    pub fn layer(&self, id: &LayerId) -> Option<&Layer> {
        self.layers.get(id)
    }

    /// Look up an experiment by id.
    pub fn experiment(&self, eid: Eid) -> Option<&Experiment> {
        self.experiments.get(&eid)
    }
}
