//! Per-kind skip counters for the Merger's silent-skip failure modes
//! (§4.4, §7): missing key, disabled layer, no bucket match, rule error,
//! rule no-match. Exposed as plain atomics (readable without a `tracing`
//! subscriber) alongside `tracing::debug!` events for structured
//! observability.

use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot-friendly counters for why layers were skipped during a merge.
#[derive(Debug, Default)]
pub struct Counters {
    disabled_layer: AtomicU64,
    missing_key: AtomicU64,
    no_range_match: AtomicU64,
    rule_no_match: AtomicU64,
    rule_error: AtomicU64,
    internal_inconsistency: AtomicU64,
}

/// A point-in-time read of [`Counters`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    /// Layers skipped because `enabled` was false.
    pub disabled_layer: u64,
    /// Layers skipped because the request lacked the layer's `hash_key`.
    pub missing_key: u64,
    /// Layers skipped because no range contained the computed bucket.
    pub no_range_match: u64,
    /// Layers skipped because the experiment's rule evaluated to NoMatch.
    pub rule_no_match: u64,
    /// Layers skipped because the experiment's rule errored (§7 RuleEvalError).
    pub rule_error: u64,
    /// Layers skipped because the Snapshot's `variant_index` was missing
    /// an entry I1 guarantees should exist. Indicates a Catalog bug, not
    /// a request or config fault.
    pub internal_inconsistency: u64,
}

impl Counters {
    /// A fresh, zeroed set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn inc_disabled_layer(&self) {
        self.disabled_layer.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_missing_key(&self) {
        self.missing_key.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_no_range_match(&self) {
        self.no_range_match.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_rule_no_match(&self) {
        self.rule_no_match.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_rule_error(&self) {
        self.rule_error.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_internal_inconsistency(&self) {
        self.internal_inconsistency.fetch_add(1, Ordering::Relaxed);
    }

    /// Read a point-in-time snapshot of all counters.
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            disabled_layer: self.disabled_layer.load(Ordering::Relaxed),
            missing_key: self.missing_key.load(Ordering::Relaxed),
            no_range_match: self.no_range_match.load(Ordering::Relaxed),
            rule_no_match: self.rule_no_match.load(Ordering::Relaxed),
            rule_error: self.rule_error.load(Ordering::Relaxed),
            internal_inconsistency: self.internal_inconsistency.load(Ordering::Relaxed),
        }
    }
}
