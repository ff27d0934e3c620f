//! Per-field similarity between two value sets
//!
//! Two modes exist. When every value on both sides parses as an integer the
//! field is compared numerically, otherwise by Jaccard overlap. The choice is
//! made once over the combined values, never per value. All functions return
//! 1.0 for identical non-empty sets.

use std::collections::BTreeSet;

/// Added to the numeric denominator so an all-zero field never divides by zero
pub const NUMERIC_EPSILON: f64 = 1e-9;

/// How a field pair was compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimilarityMode {
    /// Summed integer magnitudes
    Numeric,
    /// Set overlap
    Jaccard,
}

/// Parse a profile value as an integer.
///
/// Accepts an optional sign and single underscores between digits
/// (`1_000`). Values outside the `i128` range are not integers here.
pub fn parse_integer(value: &str) -> Option<i128> {
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(trimmed);
    if digits.starts_with('_') || digits.ends_with('_') || digits.contains("__") {
        return None;
    }
    trimmed.replace('_', "").parse::<i128>().ok()
}

fn parse_all(values: &BTreeSet<String>) -> Option<BTreeSet<i128>> {
    values.iter().map(|v| parse_integer(v)).collect()
}

/// Decide the comparison mode for a pair of sets
pub fn similarity_mode(a: &BTreeSet<String>, b: &BTreeSet<String>) -> SimilarityMode {
    if a.iter().chain(b.iter()).all(|v| parse_integer(v).is_some()) {
        SimilarityMode::Numeric
    } else {
        SimilarityMode::Jaccard
    }
}

/// Numeric similarity: `1 - |sum(a) - sum(b)| / (max(max(a), max(b), 0) + ε)`
///
/// Values are deduplicated after parsing, so `"7"` and `"07"` count once.
/// Returns `None` when any value is not an integer. The result is not
/// clamped; sets whose sums differ by more than their largest member score
/// below zero.
pub fn numeric_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> Option<f64> {
    let ints_a = parse_all(a)?;
    let ints_b = parse_all(b)?;

    let sum = |ints: &BTreeSet<i128>| ints.iter().fold(0i128, |acc, v| acc.saturating_add(*v));
    let max_val = ints_a
        .iter()
        .chain(ints_b.iter())
        .copied()
        .fold(0i128, i128::max);

    let diff = sum(&ints_a).saturating_sub(sum(&ints_b)).unsigned_abs() as f64;
    Some(1.0 - diff / (max_val as f64 + NUMERIC_EPSILON))
}

/// Jaccard index `|a ∩ b| / |a ∪ b|`, 0 when both are empty
pub fn jaccard_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Similarity of two value sets, picking the mode from their contents
pub fn field_similarity(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    match numeric_similarity(a, b) {
        Some(similarity) => similarity,
        None => jaccard_similarity(a, b),
    }
}
