//! Package selection using glob patterns
//!
//! Include/exclude matching on package ids, backed by GlobSet.

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::{Error, Result};

/// Pattern matcher using GlobSet for efficient matching
#[derive(Debug, Clone)]
struct PatternMatcher {
    globset: GlobSet,
}

impl PatternMatcher {
    fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let glob = Glob::new(pattern).map_err(|e| Error::invalid_pattern(pattern, e))?;
            builder.add(glob);
        }

        let globset = builder
            .build()
            .map_err(|e| Error::invalid_pattern(&patterns.join(","), e))?;

        Ok(Self { globset })
    }

    fn matches(&self, id: &str) -> bool {
        self.globset.is_match(id)
    }
}

/// Include/exclude filter over package ids
#[derive(Debug, Clone)]
pub struct PackageFilter {
    include_matcher: Option<PatternMatcher>,
    /// Overrides includes
    exclude_matcher: Option<PatternMatcher>,
}

impl PackageFilter {
    /// Create a new package filter
    pub fn new(include_patterns: &[String], exclude_patterns: &[String]) -> Result<Self> {
        let include_matcher = if !include_patterns.is_empty() {
            Some(PatternMatcher::new(include_patterns)?)
        } else {
            None
        };

        let exclude_matcher = if !exclude_patterns.is_empty() {
            Some(PatternMatcher::new(exclude_patterns)?)
        } else {
            None
        };

        Ok(Self {
            include_matcher,
            exclude_matcher,
        })
    }

    /// A filter that accepts every package
    pub fn allow_all() -> Self {
        Self {
            include_matcher: None,
            exclude_matcher: None,
        }
    }

    /// Check if a package should be included
    ///
    /// Rules:
    /// 1. If the id matches an exclude pattern -> false
    /// 2. If there are no include patterns -> true
    /// 3. Otherwise the id must match an include pattern
    pub fn should_include(&self, id: &str) -> bool {
        if let Some(ref exclude) = self.exclude_matcher
            && exclude.matches(id)
        {
            return false;
        }

        if let Some(ref include) = self.include_matcher {
            include.matches(id)
        } else {
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_patterns_accepts_everything() {
        let filter = PackageFilter::new(&[], &[]).unwrap();
        assert!(filter.should_include("com.example.orders"));
        assert!(filter.should_include("anything"));
    }

    #[test]
    fn test_include_only() {
        let filter = PackageFilter::new(&patterns(&["com.example.*"]), &[]).unwrap();
        assert!(filter.should_include("com.example.orders"));
        assert!(!filter.should_include("org.other.billing"));
    }

    #[test]
    fn test_exclude_overrides_include() {
        let filter =
            PackageFilter::new(&patterns(&["com.*"]), &patterns(&["*.sandbox"])).unwrap();
        assert!(filter.should_include("com.example.orders"));
        assert!(!filter.should_include("com.example.sandbox"));
    }

    #[test]
    fn test_exclude_only() {
        let filter = PackageFilter::new(&[], &patterns(&["Deprecated*"])).unwrap();
        assert!(filter.should_include("Orders"));
        assert!(!filter.should_include("DeprecatedOrders"));
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let error = PackageFilter::new(&patterns(&["a[b"]), &[]).unwrap_err();
        assert!(error.to_string().contains("a[b"));
    }
}
