pub mod aggregator;
pub mod engine;
pub mod lookup_types;
pub mod matcher;
pub mod normalizer;
pub mod similarity;

pub use engine::{LookupEngine, LookupError};
pub use lookup_types::{FieldStats, QueryResult, Summary};
pub use matcher::MatcherConfig;
