//! `Layer`: an independent experimentation stratum, and its bucket ranges.

use crate::error::LoadErrorKind;
use crate::ids::{LayerId, Vid};
use crate::limits::{HASH_SLOTS, MAX_RANGES_PER_LAYER};
use serde::{Deserialize, Serialize};

/// A contiguous bucket interval `[start, end)` bound to a variant id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    /// Inclusive lower bound, in `[0, HASH_SLOTS)`.
    pub start: u32,
    /// Exclusive upper bound, in `(start, HASH_SLOTS]`.
    pub end: u32,
    /// The variant this range assigns a bucket to.
    pub vid: Vid,
}

impl Range {
    /// Whether bucket `b` falls in `[start, end)`.
    pub fn contains(&self, b: u32) -> bool {
        b >= self.start && b < self.end
    }
}

/// Which services a layer's ranges apply to: a single service, or an
/// explicit list (§3: "`service` or `services`").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServiceScope {
    /// Restricted to one service.
    Single(String),
    /// Restricted to an explicit set of services.
    Many(Vec<String>),
}

impl ServiceScope {
    /// Whether this scope includes `service`.
    pub fn contains(&self, service: &str) -> bool {
        match self {
            ServiceScope::Single(s) => s == service,
            ServiceScope::Many(list) => list.iter().any(|s| s == service),
        }
    }

    /// Iterate the services this scope restricts to.
    pub fn iter(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            ServiceScope::Single(s) => Box::new(std::iter::once(s.as_str())),
            ServiceScope::Many(list) => Box::new(list.iter().map(String::as_str)),
        }
    }
}

/// An independent experimentation stratum with its own traffic split.
///
/// Invariants enforced by [`Layer::new`] (I2, and the range shape from
/// §3): ranges are non-overlapping, each within `[0, HASH_SLOTS)`, and no
/// two ranges (on this layer) share a `vid`. Cross-layer vid uniqueness
/// (the rest of I2) is enforced by the Catalog at Snapshot build time,
/// since it requires seeing every layer at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Unique layer identifier.
    pub layer_id: LayerId,
    /// Layer version string.
    pub version: String,
    /// Merge priority; larger wins, ties broken by lexicographic `layer_id`.
    pub priority: i32,
    /// Name of the identifying key used to bucket requests for this layer.
    pub hash_key: String,
    /// Salt mixed into the hash. Defaults to `{layer_id}_{version}`.
    pub salt: String,
    /// Whether this layer currently participates in merges.
    pub enabled: bool,
    /// Non-overlapping bucket ranges, each bound to a variant.
    pub ranges: Vec<Range>,
    /// The service(s) this layer's ranges apply to.
    pub scope: ServiceScope,
}

impl Layer {
    /// Construct and validate a `Layer`.
    ///
    /// `salt` of `None` resolves to `{layer_id}_{version}`, per §3.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        layer_id: LayerId,
        version: String,
        priority: i32,
        hash_key: String,
        salt: Option<String>,
        enabled: bool,
        ranges: Vec<Range>,
        scope: ServiceScope,
    ) -> Result<Self, LoadErrorKind> {
        if ranges.len() > MAX_RANGES_PER_LAYER {
            return Err(LoadErrorKind::InvalidRanges);
        }
        validate_ranges(&ranges)?;
        let salt = salt.unwrap_or_else(|| format!("{}_{}", layer_id, version));
        Ok(Layer {
            layer_id,
            version,
            priority,
            hash_key,
            salt,
            enabled,
            ranges,
            scope,
        })
    }

    /// The unique range containing bucket `b`, if any.
    pub fn range_for_bucket(&self, b: u32) -> Option<&Range> {
        self.ranges.iter().find(|r| r.contains(b))
    }
}

/// Validate that ranges are within bounds, non-overlapping, and carry no
/// duplicate `vid` within this layer.
fn validate_ranges(ranges: &[Range]) -> Result<(), LoadErrorKind> {
    let mut sorted: Vec<&Range> = ranges.iter().collect();
    sorted.sort_by_key(|r| r.start);

    let mut seen_vids = std::collections::HashSet::new();
    let mut prev_end: Option<u32> = None;
    for r in &sorted {
        if r.start >= r.end || r.end > HASH_SLOTS {
            return Err(LoadErrorKind::InvalidRanges);
        }
        if let Some(prev) = prev_end {
            if r.start < prev {
                return Err(LoadErrorKind::InvalidRanges);
            }
        }
        if !seen_vids.insert(r.vid) {
            return Err(LoadErrorKind::DuplicateVid { vid: r.vid.0 });
        }
        prev_end = Some(r.end);
    }
    Ok(())
}

/// Ordering used by the Catalog to sort a service's layers: priority
/// descending, ties broken by `layer_id` ascending (§3).
pub fn layer_priority_order(a: &Layer, b: &Layer) -> std::cmp::Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.layer_id.cmp(&b.layer_id))
}
