//! Three-component semver parsing with integer tuple comparison semantics.
//!
//! Per §4.2: "for `semver`, compare by the three-component tuple with
//! integer semantics (10 > 2)." Pre-release and build-metadata suffixes
//! are rejected: only the bare `MAJOR.MINOR.PATCH` integer-tuple
//! comparison is defined here, and extending to full SemVer precedence
//! rules is out of scope.

/// A parsed `MAJOR.MINOR.PATCH` version, ordered as an integer tuple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SemverTuple(pub u64, pub u64, pub u64);

/// Parse a bare `MAJOR.MINOR.PATCH` string. Rejects leading/trailing
/// whitespace, missing components, non-numeric components, and any
/// `-prerelease`/`+build` suffix.
pub fn parse_semver(s: &str) -> Option<SemverTuple> {
    let mut parts = s.split('.');
    let major = parts.next()?.parse::<u64>().ok()?;
    let minor = parts.next()?.parse::<u64>().ok()?;
    let patch = parts.next()?.parse::<u64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(SemverTuple(major, minor, patch))
}
