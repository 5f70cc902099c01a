//! Counting matches between detected names and category terms.

use std::collections::BTreeMap;

use crate::vocabulary::Vocabulary;

/// Per-category match counts.
///
/// [`candidate_scores`] only keeps categories with at least one match; the
/// tie-break pass scores every tied category, so zeros can appear there.
pub type CategoryScores = BTreeMap<String, usize>;

/// How many entries of `detected` appear in `terms`.
///
/// Every occurrence counts, so a name detected twice scores twice.
pub fn score(terms: &[String], detected: &[String]) -> usize {
    detected.iter().filter(|d| terms.contains(d)).count()
}

/// Score every category of `vocabulary` against `detected`.
pub fn candidate_scores(vocabulary: &Vocabulary, detected: &[String]) -> CategoryScores {
    vocabulary
        .iter()
        .filter_map(|(category, terms)| {
            let s = score(terms, detected);
            (s > 0).then(|| (category.to_string(), s))
        })
        .collect()
}

/// Categories sharing the highest score, in lexicographic order.
pub fn top_tied(scores: &CategoryScores) -> Vec<String> {
    let Some(best) = scores.values().copied().max() else {
        return Vec::new();
    };
    scores
        .iter()
        .filter(|(_, s)| **s == best)
        .map(|(c, _)| c.clone())
        .collect()
}

/// Highest-scoring category; equal scores go to the smallest name.
///
/// A best score of zero means nothing was informative and yields `None`.
pub fn pick_winner(scores: &CategoryScores) -> Option<String> {
    let best = scores.values().copied().max()?;
    if best == 0 {
        return None;
    }
    top_tied(scores).into_iter().next()
}
