//! Scoring functions for catalog search.
//!
//! This module contains:
//! - Contains scoring (exact substring, 0 or 100)
//! - Fuzzy similarity scoring (0 to 100)
//! - Row scoring across several columns

use crate::models::Value;
use crate::normalize::normalize;

// ============================================================================
// Score Thresholds
// ============================================================================

/// Minimum score for a row to be returned in contains mode (exclusive).
pub const CONTAINS_THRESHOLD: f64 = 0.0;

/// Minimum score for a row to be returned in fuzzy mode (inclusive).
pub const FUZZY_THRESHOLD: f64 = 50.0;

pub const PERFECT_SCORE: f64 = 100.0;

// ============================================================================
// Search Mode
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchMode {
    /// The normalized query must be a substring of the normalized cell.
    Contains,
    /// Similarity ratio between the normalized query and cell.
    Fuzzy,
}

impl SearchMode {
    pub fn from_contains(contains: bool) -> Self {
        if contains {
            SearchMode::Contains
        } else {
            SearchMode::Fuzzy
        }
    }

    pub fn accepts(self, score: f64) -> bool {
        match self {
            SearchMode::Contains => score > CONTAINS_THRESHOLD,
            SearchMode::Fuzzy => score >= FUZZY_THRESHOLD,
        }
    }
}

// ============================================================================
// Similarity
// ============================================================================

/// 100 if `query` is a substring of `cell`, else 0. Both are already normalized.
pub fn contains_score(query: &str, cell: &str) -> f64 {
    if cell.contains(query) {
        PERFECT_SCORE
    } else {
        0.0
    }
}

/// Length of the longest common subsequence of two char sequences.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut row = vec![0usize; b.len() + 1];
    for &ca in a {
        let mut diag = 0;
        for (j, &cb) in b.iter().enumerate() {
            let up = row[j + 1];
            row[j + 1] = if ca == cb { diag + 1 } else { up.max(row[j]) };
            diag = up;
        }
    }
    row[b.len()]
}

/// Insertion/deletion similarity ratio scaled to 0..=100:
/// `2 * lcs / (len(a) + len(b))`, counted in chars.
/// Identical strings (including two empty strings) score 100.
pub fn fuzzy_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return PERFECT_SCORE;
    }
    2.0 * lcs_len(&a, &b) as f64 / total as f64 * PERFECT_SCORE
}

/// Score one cell against an already normalized query.
pub fn score_cell(query_norm: &str, cell: &Value, mode: SearchMode) -> f64 {
    let cell_norm = normalize(cell, false);
    match mode {
        SearchMode::Contains => contains_score(query_norm, &cell_norm),
        SearchMode::Fuzzy => fuzzy_ratio(query_norm, &cell_norm),
    }
}

/// Best score across the given cells of a row.
pub fn score_row<'a>(
    query_norm: &str,
    cells: impl IntoIterator<Item = &'a Value>,
    mode: SearchMode,
) -> f64 {
    cells
        .into_iter()
        .map(|cell| score_cell(query_norm, cell, mode))
        .fold(0.0, f64::max)
}
