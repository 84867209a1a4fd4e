//! `*`-only glob matching for the `like`/`not_like` operators.
//!
//! Per §4.2: "`*` matches any run of characters, no other metacharacters.
//! Matching is against the whole value, not substring." Patterns are
//! compiled once (split into literal segments around `*`) at Snapshot
//! build time rather than per evaluation.

/// A compiled `*`-glob pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlobPattern {
    /// Literal segments between `*` wildcards, in order. A pattern with
    /// no `*` has exactly one segment.
    segments: Vec<String>,
    /// Whether the original pattern contained at least one `*`.
    has_wildcard: bool,
}

impl GlobPattern {
    /// Compile a pattern string.
    pub fn compile(pattern: &str) -> Self {
        let has_wildcard = pattern.contains('*');
        let segments = pattern.split('*').map(|s| s.to_string()).collect();
        GlobPattern {
            segments,
            has_wildcard,
        }
    }

    /// Whether `value` matches this pattern in its entirety.
    pub fn matches(&self, value: &str) -> bool {
        if !self.has_wildcard {
            return self.segments.len() == 1 && self.segments[0] == value;
        }

        let mut rest = value;
        for (i, seg) in self.segments.iter().enumerate() {
            let is_first = i == 0;
            let is_last = i == self.segments.len() - 1;
            if is_first && !is_last {
                if !rest.starts_with(seg.as_str()) {
                    return false;
                }
                rest = &rest[seg.len()..];
            } else if is_last {
                if !rest.ends_with(seg.as_str()) {
                    return false;
                }
                if seg.len() > rest.len() {
                    return false;
                }
            } else {
                match rest.find(seg.as_str()) {
                    Some(idx) => rest = &rest[idx + seg.len()..],
                    None => return false,
                }
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_pattern_requires_exact_match() {
        let p = GlobPattern::compile("US");
        assert!(p.matches("US"));
        assert!(!p.matches("USA"));
        assert!(!p.matches("us"));
    }

    #[test]
    fn leading_wildcard() {
        let p = GlobPattern::compile("*.example.com");
        assert!(p.matches("api.example.com"));
        assert!(p.matches(".example.com"));
        assert!(!p.matches("api.example.com.evil"));
    }

    #[test]
    fn trailing_wildcard() {
        let p = GlobPattern::compile("admin-*");
        assert!(p.matches("admin-1"));
        assert!(p.matches("admin-"));
        assert!(!p.matches("not-admin-1"));
    }

    #[test]
    fn wildcard_in_middle() {
        let p = GlobPattern::compile("ab*cd");
        assert!(p.matches("abcd"));
        assert!(p.matches("abXYZcd"));
        assert!(!p.matches("abXYZcde"));
        assert!(!p.matches("xabcd"));
    }

    #[test]
    fn bare_wildcard_matches_anything() {
        let p = GlobPattern::compile("*");
        assert!(p.matches(""));
        assert!(p.matches("anything at all"));
    }

    #[test]
    fn multiple_wildcards() {
        let p = GlobPattern::compile("*-staging-*");
        assert!(p.matches("svc-staging-1"));
        assert!(p.matches("-staging-"));
        assert!(!p.matches("svc-prod-1"));
    }

    #[test]
    fn matches_whole_value_not_substring() {
        let p = GlobPattern::compile("foo");
        assert!(!p.matches("xfooy"));
    }
}
