//! The category -> terms mapping.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::VocabularyError;

/// Category name -> ordered, duplicate-free term list.
///
/// Categories iterate in lexicographic order. Terms are case-sensitive and may
/// appear under several categories, but never twice within one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Vocabulary {
    categories: BTreeMap<String, Vec<String>>,
}

impl Vocabulary {
    /// Create an empty vocabulary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw category lists, rejecting duplicated terms.
    pub fn from_map(categories: BTreeMap<String, Vec<String>>) -> Result<Self, VocabularyError> {
        let vocabulary = Self { categories };
        vocabulary.check()?;
        Ok(vocabulary)
    }

    /// Verify that no category lists a term twice.
    pub fn check(&self) -> Result<(), VocabularyError> {
        for (category, terms) in &self.categories {
            for (i, term) in terms.iter().enumerate() {
                if terms[..i].contains(term) {
                    return Err(VocabularyError::DuplicateTerm {
                        category: category.clone(),
                        term: term.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Number of categories.
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    /// Whether there are no categories.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Total number of (category, term) entries.
    pub fn term_count(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    /// Category names in lexicographic order.
    pub fn category_names(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Iterate `(category, terms)` in lexicographic category order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.categories
            .iter()
            .map(|(name, terms)| (name.as_str(), terms.as_slice()))
    }

    /// Terms of one category.
    pub fn terms(&self, category: &str) -> Option<&[String]> {
        self.categories.get(category).map(Vec::as_slice)
    }

    /// Whether a category exists.
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.contains_key(category)
    }

    /// Whether `term` is listed under `category`.
    pub fn category_contains(&self, category: &str, term: &str) -> bool {
        self.categories
            .get(category)
            .is_some_and(|terms| terms.iter().any(|t| t == term))
    }

    /// Whether `term` is listed under any category.
    pub fn contains_term(&self, term: &str) -> bool {
        self.categories
            .values()
            .any(|terms| terms.iter().any(|t| t == term))
    }

    /// Create `category` with no terms if it does not exist yet.
    ///
    /// Returns true if the category was created.
    pub fn ensure_category(&mut self, category: &str) -> bool {
        if self.categories.contains_key(category) {
            return false;
        }
        self.categories.insert(category.to_string(), Vec::new());
        true
    }

    /// Append `term` to `category` (creating it) unless already present.
    ///
    /// Returns true if the term was added.
    pub fn add_term(&mut self, category: &str, term: &str) -> bool {
        let terms = self.categories.entry(category.to_string()).or_default();
        if terms.iter().any(|t| t == term) {
            return false;
        }
        terms.push(term.to_string());
        true
    }
}

impl<C, T> FromIterator<(C, Vec<T>)> for Vocabulary
where
    C: Into<String>,
    T: Into<String>,
{
    /// Collect categories, silently dropping repeated terms.
    fn from_iter<I: IntoIterator<Item = (C, Vec<T>)>>(iter: I) -> Self {
        let mut vocabulary = Vocabulary::new();
        for (category, terms) in iter {
            let category = category.into();
            vocabulary.ensure_category(&category);
            for term in terms {
                vocabulary.add_term(&category, &term.into());
            }
        }
        vocabulary
    }
}
