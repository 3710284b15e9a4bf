use serde::Serialize;

/// Min, median and max of one numeric column over the matched rows.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStats {
    Available { min: f64, median: f64, max: f64 },
    /// None of the matched rows had a usable value.
    NoNumericData,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub records_count: usize,
    /// Property value in millions.
    pub property: FieldStats,
    /// Tariff in percent.
    pub tarif: FieldStats,
    pub insurance_type_mode: Option<String>,
    pub insurer_mode: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QueryResult {
    NotFound { query: String },
    Found { query: String, summary: Summary },
}

impl QueryResult {
    pub fn summary(&self) -> Option<&Summary> {
        match self {
            QueryResult::NotFound { .. } => None,
            QueryResult::Found { summary, .. } => Some(summary),
        }
    }
}
