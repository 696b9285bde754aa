//! Listing filter compilation
//!
//! Free-text `services` and `location` parameters are split on whitespace,
//! lowercased and merged into a single [`FilterSet`]. A record matches the set
//! when its combined tag set shares **at least one** term with it.
//!
//! The match is a logical OR across every term, service and location alike:
//! `services=seo&location=boston` returns agencies tagged `seo` that are not in
//! Boston, and Boston agencies that do no SEO. Listing pages and the store
//! queries both depend on this; do not tighten it to AND.

use std::collections::BTreeSet;

/// Cache key used when no filter terms were supplied
///
/// Compiled terms are never empty, so no filtered set maps to this key.
pub const UNFILTERED_KEY: &str = "";

/// Normalized, deduplicated set of lowercase match terms
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterSet {
    terms: BTreeSet<String>,
}

impl FilterSet {
    /// Compiles raw service and location text into a filter set
    ///
    /// # Examples
    ///
    /// ```
    /// use agency_core::filter::FilterSet;
    ///
    /// let filters = FilterSet::compile(Some("SEO  Marketing"), Some("Boston"));
    /// assert_eq!(filters.canonical_key(), "boston marketing seo");
    ///
    /// assert!(FilterSet::compile(None, Some("  ")).is_empty());
    /// ```
    pub fn compile(services: Option<&str>, location: Option<&str>) -> Self {
        let terms = [services, location]
            .into_iter()
            .flatten()
            .flat_map(str::split_whitespace)
            .map(str::to_lowercase)
            .collect();

        Self { terms }
    }

    /// An empty set means the unfiltered collection
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Terms in ascending order
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Stable string form: sorted terms joined by a space, or
    /// [`UNFILTERED_KEY`] for the empty set
    pub fn canonical_key(&self) -> String {
        if self.terms.is_empty() {
            return UNFILTERED_KEY.to_string();
        }
        self.terms().collect::<Vec<_>>().join(" ")
    }

    /// OR match against a record's combined tag set
    ///
    /// The empty set matches everything.
    pub fn matches<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        self.is_empty() || tags.iter().any(|tag| self.terms.contains(tag.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_splits_and_lowercases() {
        let filters = FilterSet::compile(Some("SEO Web-Design"), None);
        let terms: Vec<_> = filters.terms().collect();
        assert_eq!(terms, vec!["seo", "web-design"]);
    }

    #[test]
    fn test_compile_unions_services_and_location() {
        let filters = FilterSet::compile(Some("seo"), Some("boston"));
        assert_eq!(filters.len(), 2);
        assert_eq!(filters.canonical_key(), "boston seo");
    }

    #[test]
    fn test_compile_handles_irregular_whitespace() {
        let filters = FilterSet::compile(Some("  seo\tppc \n"), Some(" new  york "));
        assert_eq!(filters.canonical_key(), "new ppc seo york");
    }

    #[test]
    fn test_compile_deduplicates_across_inputs() {
        let filters = FilterSet::compile(Some("SEO seo"), Some("Seo"));
        assert_eq!(filters.len(), 1);
    }

    #[test]
    fn test_compile_empty_inputs() {
        assert!(FilterSet::compile(None, None).is_empty());
        assert!(FilterSet::compile(Some(""), Some("   ")).is_empty());
        assert_eq!(FilterSet::compile(None, None).canonical_key(), UNFILTERED_KEY);
    }

    #[test]
    fn test_canonical_key_is_order_insensitive() {
        let a = FilterSet::compile(Some("ppc seo"), Some("boston"));
        let b = FilterSet::compile(Some("boston"), Some("seo ppc"));
        assert_eq!(a.canonical_key(), b.canonical_key());
        assert_eq!(a, b);
    }

    #[test]
    fn test_wildcard_term_is_not_the_unfiltered_key() {
        let star = FilterSet::compile(Some("*"), None);
        assert!(!star.is_empty());
        assert_eq!(star.canonical_key(), "*");
        assert_ne!(star.canonical_key(), FilterSet::default().canonical_key());
        assert_ne!(star.canonical_key(), UNFILTERED_KEY);
    }

    #[test]
    fn test_matches_is_or_not_and() {
        let filters = FilterSet::compile(Some("seo"), Some("boston"));

        // Only the service term: still a match.
        assert!(filters.matches(&["seo"]));
        // Only the location term: still a match.
        assert!(filters.matches(&["boston", "ppc"]));
        assert!(filters.matches(&["seo", "boston"]));
        assert!(!filters.matches(&["ppc", "chicago"]));
        assert!(!filters.matches::<&str>(&[]));
    }

    #[test]
    fn test_empty_set_matches_everything() {
        let filters = FilterSet::default();
        assert!(filters.matches::<&str>(&[]));
        assert!(filters.matches(&["anything"]));
    }
}
