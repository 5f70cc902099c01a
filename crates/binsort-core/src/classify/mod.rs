//! Category resolution: coarse scoring plus label-based tie-break.

mod resolver;
pub mod scoring;

pub use resolver::CategoryResolver;
pub use scoring::{candidate_scores, pick_winner, CategoryScores};
