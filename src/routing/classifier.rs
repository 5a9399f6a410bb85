//! Request path classification.
//!
//! # Responsibilities
//! - Compile the route table into matchers once at startup
//! - Assign every path exactly one [`RouteClass`]
//!
//! # Design Decisions
//! - Protected prefixes are checked before the static asset rule, so a dotted
//!   path under "/admin" never skips the session check. This deliberately
//!   differs from the site renderer's own middleware, which bypasses asset-like
//!   paths first: here `/api/upload/photo.jpg` still needs a token
//! - Deterministic: same input always yields the same class

use crate::config::RouteTableConfig;
use crate::routing::matcher::{AnyMatcher, Matcher, PathPrefixMatcher, StaticAssetMatcher};

/// How the gate treats a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    /// Bypasses every check, no headers added.
    StaticAsset,
    /// Requires an admin session.
    Protected,
    /// Under a protected prefix but exempt (the login page).
    PublicAuth,
    /// Other API path.
    Api,
    /// Other page.
    Page,
}

impl RouteClass {
    pub fn as_str(self) -> &'static str {
        match self {
            RouteClass::StaticAsset => "static",
            RouteClass::Protected => "protected",
            RouteClass::PublicAuth => "public_auth",
            RouteClass::Api => "api",
            RouteClass::Page => "page",
        }
    }
}

/// Compiled route table.
#[derive(Debug)]
pub struct RouteClassifier {
    protected: AnyMatcher,
    public: AnyMatcher,
    assets: StaticAssetMatcher,
    api: PathPrefixMatcher,
    login_path: String,
}

impl RouteClassifier {
    pub fn from_config(config: &RouteTableConfig) -> Self {
        Self {
            protected: AnyMatcher::prefixes(&config.protected_prefixes),
            public: AnyMatcher::prefixes(&config.public_prefixes),
            assets: StaticAssetMatcher::new(&config.static_prefixes),
            api: PathPrefixMatcher::new(config.api_prefix.clone()),
            login_path: config.login_path.clone(),
        }
    }

    pub fn classify(&self, path: &str) -> RouteClass {
        if self.protected.matches(path) {
            if self.public.matches(path) {
                RouteClass::PublicAuth
            } else {
                RouteClass::Protected
            }
        } else if self.assets.matches(path) {
            RouteClass::StaticAsset
        } else if self.is_api(path) {
            RouteClass::Api
        } else {
            RouteClass::Page
        }
    }

    /// API paths answer with JSON errors and are rate limited.
    pub fn is_api(&self, path: &str) -> bool {
        self.api.matches(path)
    }

    pub fn login_path(&self) -> &str {
        &self.login_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> RouteClassifier {
        RouteClassifier::from_config(&RouteTableConfig::default())
    }

    #[test]
    fn test_classification_table() {
        let c = classifier();
        let cases = [
            ("/_next/static/chunk", RouteClass::StaticAsset),
            ("/favicon.ico", RouteClass::StaticAsset),
            ("/admin", RouteClass::Protected),
            ("/admin/projects", RouteClass::Protected),
            ("/api/upload", RouteClass::Protected),
            ("/admin/login", RouteClass::PublicAuth),
            ("/api/projects", RouteClass::Api),
            ("/api/admin/login", RouteClass::Api),
            ("/", RouteClass::Page),
            ("/work/portfolio-site", RouteClass::Page),
        ];
        for (path, expected) in cases {
            assert_eq!(c.classify(path), expected, "path {}", path);
        }
    }

    #[test]
    fn test_dotted_protected_path_is_not_static() {
        assert_eq!(classifier().classify("/admin/export.json"), RouteClass::Protected);
        assert_eq!(classifier().classify("/api/upload/photo.jpg"), RouteClass::Protected);
    }

    #[test]
    fn test_protected_api_detection() {
        let c = classifier();
        assert!(c.is_api("/api/upload"));
        assert!(!c.is_api("/admin"));
        assert_eq!(c.login_path(), "/admin/login");
    }
}
