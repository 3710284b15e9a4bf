use std::cmp::Ordering;
use std::collections::HashSet;

use crate::catalog::{Catalog, PropertyRecord};

use super::similarity;

pub const DEFAULT_THRESHOLD: f64 = 0.62;
pub const DEFAULT_TOP_N: usize = 5;

/// Tuning for the fuzzy phase. Both values were picked empirically.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatcherConfig {
    pub threshold: f64,
    pub top_n: usize,
}

impl Default for MatcherConfig {
    fn default() -> MatcherConfig {
        MatcherConfig {
            threshold: DEFAULT_THRESHOLD,
            top_n: DEFAULT_TOP_N,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MatchPhase {
    Exact,
    Fuzzy,
    Nothing,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScoredName<'a> {
    pub name: &'a str,
    pub score: f64,
}

#[derive(Debug)]
pub struct MatchSet<'a> {
    pub phase: MatchPhase,
    /// Matched rows in catalog order.
    pub rows: Vec<&'a PropertyRecord>,
    /// Names kept by the fuzzy phase, best first. Empty for exact matches.
    pub candidates: Vec<ScoredName<'a>>,
}

impl<'a> MatchSet<'a> {
    fn empty() -> MatchSet<'a> {
        MatchSet {
            phase: MatchPhase::Nothing,
            rows: Vec::new(),
            candidates: Vec::new(),
        }
    }
}

/// Every row whose normalized name contains the query.
pub fn exact_matches<'a>(catalog: &'a Catalog, normalized_query: &str) -> Vec<&'a PropertyRecord> {
    catalog
        .records()
        .iter()
        .filter(|record| record.property_normalized.contains(normalized_query))
        .collect()
}

/// The best `top_n` distinct names scoring at least `threshold`.
/// Equal scores keep catalog order.
pub fn fuzzy_candidates<'a>(
    catalog: &'a Catalog,
    normalized_query: &str,
    config: &MatcherConfig,
) -> Vec<ScoredName<'a>> {
    let mut scored: Vec<ScoredName> = catalog
        .unique_names()
        .iter()
        .map(|name| ScoredName {
            name: name.as_str(),
            score: similarity::ratio(normalized_query, name),
        })
        .filter(|candidate| candidate.score >= config.threshold)
        .collect();

    // sort_by is stable.
    scored.sort_by(|left, right| right.score.partial_cmp(&left.score).unwrap_or(Ordering::Equal));
    scored.truncate(config.top_n);
    scored
}

pub fn match_query<'a>(
    catalog: &'a Catalog,
    normalized_query: &str,
    config: &MatcherConfig,
) -> MatchSet<'a> {
    if normalized_query.is_empty() {
        return MatchSet::empty();
    }

    let exact = exact_matches(catalog, normalized_query);
    if !exact.is_empty() {
        return MatchSet {
            phase: MatchPhase::Exact,
            rows: exact,
            candidates: Vec::new(),
        };
    }

    let candidates = fuzzy_candidates(catalog, normalized_query, config);
    if candidates.is_empty() {
        return MatchSet::empty();
    }

    let names: HashSet<&str> = candidates.iter().map(|candidate| candidate.name).collect();
    let rows = catalog
        .records()
        .iter()
        .filter(|record| names.contains(record.property_normalized.as_str()))
        .collect();

    MatchSet {
        phase: MatchPhase::Fuzzy,
        rows,
        candidates,
    }
}
