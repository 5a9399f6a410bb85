//! Path matching logic.
//!
//! # Responsibilities
//! - Match path prefixes (case-sensitive)
//! - Recognise static assets by prefix or file extension
//! - Combine matchers with OR semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Plain prefix comparison: "/admin" also covers "/administrator"
//! - No regex to guarantee O(n) matching

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Matches asset paths: a known asset prefix, or a final segment with a dot.
#[derive(Debug, Clone)]
pub struct StaticAssetMatcher {
    prefixes: Vec<PathPrefixMatcher>,
}

impl StaticAssetMatcher {
    pub fn new(prefixes: &[String]) -> Self {
        Self {
            prefixes: prefixes.iter().map(PathPrefixMatcher::new).collect(),
        }
    }
}

impl Matcher for StaticAssetMatcher {
    fn matches(&self, path: &str) -> bool {
        if self.prefixes.iter().any(|p| p.matches(path)) {
            return true;
        }
        path.rsplit('/')
            .next()
            .is_some_and(|segment| segment.contains('.'))
    }
}

/// Matches when any inner matcher does.
#[derive(Debug)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// One [`PathPrefixMatcher`] per prefix.
    pub fn prefixes(prefixes: &[String]) -> Self {
        Self::new(
            prefixes
                .iter()
                .map(|p| Box::new(PathPrefixMatcher::new(p.clone())) as Box<dyn Matcher>)
                .collect(),
        )
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/api");
        assert!(matcher.matches("/api/v1"));
        assert!(!matcher.matches("/images"));
        assert!(!matcher.matches("/API/v1")); // Case sensitive
    }

    #[test]
    fn test_static_asset_matcher() {
        let matcher = StaticAssetMatcher::new(&["/_next/".to_string(), "/static/".to_string()]);
        assert!(matcher.matches("/_next/chunks/app"));
        assert!(matcher.matches("/static/cv"));
        assert!(matcher.matches("/favicon.ico"));
        assert!(matcher.matches("/images/hero.webp"));
        assert!(!matcher.matches("/work/my.project/detail"));
        assert!(!matcher.matches("/about"));
    }

    #[test]
    fn test_any_matcher() {
        let matcher = AnyMatcher::prefixes(&["/admin".to_string(), "/api/upload".to_string()]);
        assert!(matcher.matches("/admin/projects"));
        assert!(matcher.matches("/api/upload/image"));
        assert!(!matcher.matches("/api/projects"));
        assert!(!AnyMatcher::new(Vec::new()).matches("/"));
    }
}
