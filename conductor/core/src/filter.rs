//! Catalog Filtering
//!
//! A pure filter over figures by search text and category, plus
//! [`FilterIndex`], which holds the current browse query and memoizes the
//! result for it.

use crate::catalog::{Catalog, Figure};

/// Sentinel category that matches every figure
pub const ALL_CATEGORIES: &str = "All";

/// Category half of a browse query
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    /// Match every category
    #[default]
    All,
    /// Match one category exactly (case-sensitive)
    Named(String),
}

impl CategoryFilter {
    /// Parse a raw category name; `"All"` maps to [`CategoryFilter::All`]
    #[must_use]
    pub fn parse(name: &str) -> Self {
        if name == ALL_CATEGORIES {
            Self::All
        } else {
            Self::Named(name.to_string())
        }
    }

    /// The raw name, as shown on a category tab
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Named(name) => name,
        }
    }

    /// Whether `figure` belongs to this category
    #[must_use]
    pub fn matches(&self, figure: &Figure) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => figure.category == *name,
        }
    }
}

/// Filter figures by search text and category, preserving input order
///
/// A figure matches the query if the lower-cased query is a substring of its
/// lower-cased name or description. The query is plain text, never a
/// pattern; an empty query matches everything.
#[must_use]
pub fn filter<'a>(figures: &'a [Figure], query: &str, category: &str) -> Vec<&'a Figure> {
    let category = CategoryFilter::parse(category);
    filter_by(figures, &query.to_lowercase(), &category)
}

fn filter_by<'a>(figures: &'a [Figure], needle: &str, category: &CategoryFilter) -> Vec<&'a Figure> {
    matching(figures, needle, category).map(|(_, figure)| figure).collect()
}

/// Matching figures with their catalog positions; `needle` is lower-cased
fn matching<'a: 'q, 'q>(
    figures: &'a [Figure],
    needle: &'q str,
    category: &'q CategoryFilter,
) -> impl Iterator<Item = (usize, &'a Figure)> + 'q {
    figures
        .iter()
        .enumerate()
        .filter(move |(_, figure)| category.matches(figure) && matches_query(figure, needle))
}

fn matches_query(figure: &Figure, needle: &str) -> bool {
    needle.is_empty()
        || figure.name.to_lowercase().contains(needle)
        || figure.description.to_lowercase().contains(needle)
}

/// Browse query state over a catalog with a memoized result
///
/// The result is recomputed synchronously whenever the query or the category
/// actually changes; repeated reads are free.
#[derive(Clone, Debug)]
pub struct FilterIndex {
    catalog: Catalog,
    query: String,
    category: CategoryFilter,
    /// Indices into `catalog.all()` matching the current pair
    matches: Vec<usize>,
}

impl FilterIndex {
    /// Create an index with an empty query and the `"All"` category
    #[must_use]
    pub fn new(catalog: Catalog) -> Self {
        let mut index = Self {
            catalog,
            query: String::new(),
            category: CategoryFilter::All,
            matches: Vec::new(),
        };
        index.recompute();
        index
    }

    /// The catalog being filtered
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Current search text
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Current category
    #[must_use]
    pub fn category(&self) -> &CategoryFilter {
        &self.category
    }

    /// Replace the search text
    pub fn set_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        if query != self.query {
            self.query = query;
            self.recompute();
        }
    }

    /// Replace the category by raw name
    pub fn set_category(&mut self, name: &str) {
        let category = CategoryFilter::parse(name);
        if category != self.category {
            self.category = category;
            self.recompute();
        }
    }

    /// Figures matching the current query, in catalog order
    #[must_use]
    pub fn results(&self) -> Vec<&Figure> {
        let all = self.catalog.all();
        self.matches.iter().map(|&i| &all[i]).collect()
    }

    /// Number of figures matching the current query
    #[must_use]
    pub fn result_count(&self) -> usize {
        self.matches.len()
    }

    fn recompute(&mut self) {
        let needle = self.query.to_lowercase();
        self.matches = matching(self.catalog.all(), &needle, &self.category)
            .map(|(i, _)| i)
            .collect();

        tracing::debug!(
            query = %self.query,
            category = %self.category.as_str(),
            matches = self.matches.len(),
            "Recomputed figure filter"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names<'a>(figures: &[&'a Figure]) -> Vec<&'a str> {
        figures.iter().map(|f| f.name.as_str()).collect()
    }

    /// True if `sub` appears in `all` in the same relative order
    fn is_ordered_subsequence(sub: &[&Figure], all: &[Figure]) -> bool {
        let mut rest = all.iter();
        sub.iter().all(|s| rest.any(|f| f.id == s.id))
    }

    #[test]
    fn test_empty_query_all_returns_full_catalog() {
        let catalog = Catalog::builtin();
        let result = filter(catalog.all(), "", "All");
        assert_eq!(result.len(), catalog.len());
        assert!(result.iter().zip(catalog.all()).all(|(a, b)| a.id == b.id));
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let catalog = Catalog::builtin();
        assert_eq!(names(&filter(catalog.all(), "MARCUS", "All")), vec!["Marcus Aurelius"]);
        assert_eq!(names(&filter(catalog.all(), "marcus", "All")), vec!["Marcus Aurelius"]);
    }

    #[test]
    fn test_query_matches_description() {
        let catalog = Catalog::builtin();
        // "Gita" only appears in Krishna's description
        assert_eq!(names(&filter(catalog.all(), "gita", "All")), vec!["Krishna"]);
    }

    #[test]
    fn test_category_exact_match() {
        let catalog = Catalog::builtin();
        assert_eq!(names(&filter(catalog.all(), "", "Science")), vec!["Albert Einstein"]);
        // "Arts & Science" is a different category, and matching is case-sensitive
        assert!(filter(catalog.all(), "", "science").is_empty());
    }

    #[test]
    fn test_query_and_category_combined() {
        let catalog = Catalog::builtin();
        let result = filter(catalog.all(), "philosopher", "Philosophy");
        assert_eq!(names(&result), vec!["Marcus Aurelius", "Adi Shankaracharya"]);

        let result = filter(catalog.all(), "philosopher", "Spiritual");
        assert!(result.is_empty());
    }

    #[test]
    fn test_query_is_plain_text() {
        let catalog = Catalog::builtin();
        assert!(filter(catalog.all(), ".*", "All").is_empty());
        assert_eq!(names(&filter(catalog.all(), "\"meditations\"", "All")), vec!["Marcus Aurelius"]);
    }

    #[test]
    fn test_results_are_ordered_subsequences() {
        let catalog = Catalog::builtin();
        let queries = ["", "a", "an", "the", "of", "x", "renaissance"];
        for category in catalog.categories() {
            for query in queries {
                let result = filter(catalog.all(), query, &category);
                assert!(
                    is_ordered_subsequence(&result, catalog.all()),
                    "query={query:?} category={category:?}"
                );
                // Deterministic
                assert_eq!(names(&result), names(&filter(catalog.all(), query, &category)));
            }
        }
    }

    #[test]
    fn test_category_filter_parse() {
        assert_eq!(CategoryFilter::parse("All"), CategoryFilter::All);
        assert_eq!(
            CategoryFilter::parse("Science"),
            CategoryFilter::Named("Science".to_string())
        );
        assert_eq!(CategoryFilter::parse("Science").as_str(), "Science");
        assert_eq!(CategoryFilter::All.as_str(), "All");
    }

    #[test]
    fn test_index_tracks_query_and_category() {
        let mut index = FilterIndex::new(Catalog::builtin());
        assert_eq!(index.result_count(), 8);

        index.set_category("Spiritual");
        assert_eq!(names(&index.results()), vec!["Buddha", "Jesus Christ", "Krishna"]);

        index.set_query("BUDDH");
        assert_eq!(names(&index.results()), vec!["Buddha"]);
        assert_eq!(index.query(), "BUDDH");

        index.set_category("All");
        index.set_query("");
        assert_eq!(index.result_count(), 8);
        assert_eq!(index.category(), &CategoryFilter::All);
    }

    #[test]
    fn test_index_and_filter_agree_on_injected_catalog() {
        let catalog = Catalog::new(vec![
            Figure::new(1, "Hypatia", "4th century", "Science", "Mathematician of ALEXANDRIA"),
            Figure::new(2, "Ptolemy", "2nd century", "Science", "Astronomer in Alexandria"),
            Figure::new(3, "Sappho", "6th century BC", "Arts", "Lyric poet of Lesbos"),
            Figure::new(4, "Alexander", "4th century BC", "Arts & Science", "Student of Aristotle"),
        ])
        .unwrap();
        let mut index = FilterIndex::new(catalog.clone());

        index.set_query("alexand");
        assert_eq!(names(&index.results()), vec!["Hypatia", "Ptolemy", "Alexander"]);
        assert_eq!(names(&index.results()), names(&filter(catalog.all(), "alexand", "All")));

        index.set_category("Science");
        assert_eq!(names(&index.results()), vec!["Hypatia", "Ptolemy"]);
        assert_eq!(
            names(&index.results()),
            names(&filter(catalog.all(), "alexand", "Science"))
        );
    }

    #[test]
    fn test_index_matches_pure_filter() {
        let catalog = Catalog::builtin();
        let mut index = FilterIndex::new(catalog.clone());
        for category in catalog.categories() {
            index.set_category(&category);
            for query in ["", "e", "ancient", "Teacher"] {
                index.set_query(query);
                assert_eq!(
                    names(&index.results()),
                    names(&filter(catalog.all(), query, &category))
                );
            }
        }
    }
}
