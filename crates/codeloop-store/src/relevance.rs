// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
use std::collections::HashSet;

/// Minimum Jaccard overlap between a query and a stored prompt for the
/// stored prompt to be considered relevant.
pub const DEFAULT_MIN_SIMILARITY: f64 = 0.15;

fn bag_of_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|w| w.to_string())
        .collect()
}

/// Bag-of-words Jaccard similarity: overlap of the two word sets divided by
/// their union. Symmetric, 0.0 for disjoint sets, 1.0 for identical ones.
pub fn jaccard_similarity(a: &str, b: &str) -> f64 {
    let a = bag_of_words(a);
    let b = bag_of_words(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let overlap = a.intersection(&b).count();
    let union = a.union(&b).count();
    overlap as f64 / union as f64
}

/// Keeps only the entries whose text is relevant to `query`, ranked by
/// similarity, and truncated to `max_results`.
pub fn filter_relevant<'a, T>(
    query: &str,
    items: &'a [T],
    text_of: impl Fn(&T) -> &str,
    max_results: usize,
) -> Vec<&'a T> {
    let mut scored: Vec<(f64, &T)> = items
        .iter()
        .map(|item| (jaccard_similarity(query, text_of(item)), item))
        .filter(|(score, _)| *score >= DEFAULT_MIN_SIMILARITY)
        .collect();
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap());
    scored.into_iter().take(max_results).map(|(_, item)| item).collect()
}
