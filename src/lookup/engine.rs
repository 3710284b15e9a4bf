use failure::Fail;

use log::debug;

use crate::catalog::Catalog;

use super::aggregator::aggregate;
use super::lookup_types::QueryResult;
use super::matcher::{match_query, MatchPhase, MatcherConfig};
use super::normalizer::normalize;

#[derive(Debug, Fail, PartialEq)]
pub enum LookupError {
    /// Nothing is left of the query after normalization.
    #[fail(display = "Invalid query: {:?}", _0)]
    InvalidQuery(String),
}

/// Answers queries against one catalog snapshot. Holds no mutable state, so a
/// single engine can serve any number of threads.
#[derive(Clone, Copy, Debug)]
pub struct LookupEngine<'a> {
    catalog: &'a Catalog,
    config: MatcherConfig,
}

impl<'a> LookupEngine<'a> {
    pub fn new(catalog: &'a Catalog, config: MatcherConfig) -> LookupEngine<'a> {
        LookupEngine { catalog, config }
    }

    #[inline]
    pub fn catalog(&self) -> &'a Catalog {
        self.catalog
    }

    pub fn lookup(&self, raw_query: &str) -> Result<QueryResult, LookupError> {
        let query = raw_query.trim();
        let normalized = normalize(query);
        if normalized.is_empty() {
            return Err(LookupError::InvalidQuery(raw_query.to_owned()));
        }

        let matches = match_query(self.catalog, &normalized, &self.config);
        match matches.phase {
            MatchPhase::Exact => debug!(
                "{:?}: {} exact matches, first {:?}",
                normalized,
                matches.rows.len(),
                matches.rows.first().map(|record| &record.property_name)
            ),
            MatchPhase::Fuzzy => debug!(
                "{:?}: no exact match, fuzzy candidates {:?}",
                normalized, matches.candidates
            ),
            MatchPhase::Nothing => debug!("{:?}: nothing found", normalized),
        }

        Ok(aggregate(query, &matches.rows))
    }
}
