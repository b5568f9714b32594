//! Figure Catalog
//!
//! The fixed registry of historical figures a user can talk to.
//!
//! A [`Catalog`] is built once at process start (either the built-in set or
//! an injected list loaded from configuration) and is never mutated
//! afterwards. Clones share the same immutable storage.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::ALL_CATEGORIES;

/// Figure identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FigureId(pub u32);

impl fmt::Display for FigureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A historical persona available for conversation
///
/// Serializes with exactly the five catalog fields, which is also the shape
/// sent to the exchange endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Figure {
    /// Unique identifier within the catalog
    pub id: FigureId,
    /// Display name
    pub name: String,
    /// Free-text period label (e.g. "Renaissance")
    pub era: String,
    /// Category from a small open set (e.g. "Philosophy")
    pub category: String,
    /// One-line description
    pub description: String,
}

impl Figure {
    /// Create a figure
    pub fn new(
        id: u32,
        name: impl Into<String>,
        era: impl Into<String>,
        category: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: FigureId(id),
            name: name.into(),
            era: era.into(),
            category: category.into(),
            description: description.into(),
        }
    }
}

/// Errors raised while building a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Two figures share an id
    #[error("duplicate figure id {0}")]
    DuplicateId(FigureId),

    /// A catalog file could not be parsed
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),
}

/// On-disk catalog layout (`[[figures]]` tables)
#[derive(Debug, Deserialize)]
struct CatalogToml {
    figures: Vec<Figure>,
}

/// Immutable registry of figures, in definition order
#[derive(Clone, Debug)]
pub struct Catalog {
    figures: Arc<[Figure]>,
}

impl Catalog {
    /// Build a catalog from an explicit list
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateId`] if two figures share an id.
    pub fn new(figures: Vec<Figure>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(figures.len());
        for figure in &figures {
            if !seen.insert(figure.id) {
                return Err(CatalogError::DuplicateId(figure.id));
            }
        }

        Ok(Self {
            figures: figures.into(),
        })
    }

    /// Parse a catalog from TOML
    ///
    /// ```toml
    /// [[figures]]
    /// id = 1
    /// name = "Hypatia"
    /// era = "4th Century CE"
    /// category = "Science"
    /// description = "Alexandrian mathematician and astronomer"
    /// ```
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or ids repeat.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let parsed: CatalogToml = toml::from_str(content)?;
        Self::new(parsed.figures)
    }

    /// The built-in catalog
    #[must_use]
    pub fn builtin() -> Self {
        let figures = vec![
            Figure::new(
                1,
                "Marcus Aurelius",
                "Roman Emperor & Philosopher",
                "Philosophy",
                "Roman Emperor and Stoic philosopher known for \"Meditations\"",
            ),
            Figure::new(
                2,
                "Buddha",
                "5th Century BCE",
                "Spiritual",
                "Founder of Buddhism, teacher of the path to enlightenment",
            ),
            Figure::new(
                3,
                "Adi Shankaracharya",
                "8th Century CE",
                "Philosophy",
                "Indian philosopher who consolidated the doctrine of Advaita Vedanta",
            ),
            Figure::new(
                4,
                "Jesus Christ",
                "1st Century CE",
                "Spiritual",
                "Central figure of Christianity and influential spiritual teacher",
            ),
            Figure::new(
                5,
                "Krishna",
                "Ancient India",
                "Spiritual",
                "Divine figure in Hinduism, speaker of the Bhagavad Gita",
            ),
            Figure::new(
                6,
                "Albert Einstein",
                "20th Century",
                "Science",
                "Revolutionary physicist, father of modern physics",
            ),
            Figure::new(
                7,
                "Leonardo da Vinci",
                "Renaissance",
                "Arts & Science",
                "Renaissance polymath, artist, and inventor",
            ),
            Figure::new(
                8,
                "Cleopatra",
                "Ancient Egypt",
                "Leadership",
                "Last active ruler of the Ptolemaic Kingdom of Egypt",
            ),
        ];

        Self {
            figures: figures.into(),
        }
    }

    /// All figures, in definition order
    #[must_use]
    pub fn all(&self) -> &[Figure] {
        &self.figures
    }

    /// Distinct categories, with the `"All"` sentinel first
    ///
    /// Categories keep the order in which they first appear in the catalog.
    #[must_use]
    pub fn categories(&self) -> Vec<String> {
        let mut categories = vec![ALL_CATEGORIES.to_string()];
        for figure in self.figures.iter() {
            if !categories.iter().any(|c| c == &figure.category) {
                categories.push(figure.category.clone());
            }
        }
        categories
    }

    /// Look up a figure by id
    #[must_use]
    pub fn get(&self, id: FigureId) -> Option<&Figure> {
        self.figures.iter().find(|f| f.id == id)
    }

    /// Number of figures
    #[must_use]
    pub fn len(&self) -> usize {
        self.figures.len()
    }

    /// Whether the catalog has no figures
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.figures.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
