//! Size and arity limits enforced when loading configuration entities.
//!
//! Named constants rather than magic numbers scattered through the loader.

/// Number of hash buckets, fixed per §6 ("`hash_slots` fixed at 10000
/// unless explicitly rebuilt"). The Catalog and Hasher both key off this.
pub const HASH_SLOTS: u32 = 10_000;

/// Maximum nesting depth of an `and`/`or`/`not` rule tree, to bound
/// recursive evaluation and prevent stack exhaustion on a malicious or
/// malformed payload.
pub const MAX_RULE_DEPTH: usize = 64;

/// Maximum number of `values` entries accepted by an `in`/`not_in` rule
/// node.
pub const MAX_RULE_VALUES: usize = 4096;

/// Maximum number of ranges a single layer may declare.
pub const MAX_RANGES_PER_LAYER: usize = 4096;
