//! Declared attribute types for rule evaluation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The declared kind of a context attribute, per §3: "mapping from
/// attribute name to one of {string,int,float,bool,semver}". Defines
/// what kinds are legal in rule values and how comparisons are performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// UTF-8 string, compared by value or `like`/`not_like` glob.
    String,
    /// Signed 64-bit integer.
    Int,
    /// 64-bit float.
    Float,
    /// Boolean.
    Bool,
    /// Three-component `MAJOR.MINOR.PATCH` version, compared with integer
    /// tuple semantics (10 > 2 at any component).
    Semver,
}

/// Mapping from attribute name to its declared `FieldType`.
pub type FieldTypes = HashMap<String, FieldType>;
