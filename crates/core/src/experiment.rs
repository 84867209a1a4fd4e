//! `Experiment`: a set of variants under a common service and gating rule.

use crate::ids::{Eid, Vid};
use crate::rule::Rule;
use crate::Params;
use serde::{Deserialize, Serialize};

/// One arm of an experiment: a variant id plus its parameter bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    /// Variant identifier, unique across the whole snapshot (I2).
    pub vid: Vid,
    /// The JSON-shaped parameter tree this variant contributes on match.
    pub params: Params,
}

/// The set of variants under a common service and gating rule.
///
/// Invariant (enforced by the Catalog, since it spans layers): each `vid`
/// referenced here appears in exactly one layer's range list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    /// Experiment identifier.
    pub eid: Eid,
    /// The service this experiment's parameters apply to.
    pub service: String,
    /// The boolean rule gating assignment to this experiment's variants.
    /// `None` means the experiment has an empty rule and always matches
    /// (§8 scenario 1: "empty rule").
    pub rule: Option<Rule>,
    /// Variants, in the order they were declared.
    pub variants: Vec<Variant>,
}

impl Experiment {
    /// Find a variant by id within this experiment.
    pub fn variant(&self, vid: Vid) -> Option<&Variant> {
        self.variants.iter().find(|v| v.vid == vid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn variant_lookup_by_vid() {
        let exp = Experiment {
            eid: Eid(100),
            service: "checkout".to_string(),
            rule: None,
            variants: vec![
                Variant {
                    vid: Vid(1001),
                    params: json!({"algo": "baseline"}),
                },
                Variant {
                    vid: Vid(1002),
                    params: json!({"algo": "new"}),
                },
            ],
        };
        assert_eq!(
            exp.variant(Vid(1002)).unwrap().params,
            json!({"algo": "new"})
        );
        assert!(exp.variant(Vid(9999)).is_none());
    }
}
