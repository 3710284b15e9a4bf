use std::cmp::Ordering;
use std::collections::HashMap;

use crate::catalog::PropertyRecord;

use super::lookup_types::{FieldStats, QueryResult, Summary};

const MILLION: f64 = 1_000_000.0;

/// Exact ties round to even, as the reports always did.
#[inline]
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}

/// Expects finite values only.
fn median_of_sorted(sorted: &[f64]) -> f64 {
    let middle = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[middle - 1] + sorted[middle]) / 2.0
    } else {
        sorted[middle]
    }
}

fn field_stats<I>(values: I, scale: f64, decimals: i32) -> FieldStats
where
    I: Iterator<Item = Option<f64>>,
{
    let mut present: Vec<f64> = values.flatten().filter(|v| v.is_finite()).collect();
    if present.is_empty() {
        return FieldStats::NoNumericData;
    }

    present.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

    FieldStats::Available {
        min: round_to(present[0] / scale, decimals),
        median: round_to(median_of_sorted(&present) / scale, decimals),
        max: round_to(present[present.len() - 1] / scale, decimals),
    }
}

/// Most frequent non-empty value. Ties go to the lexicographically smallest
/// value so the result does not depend on row order.
fn mode<'a, I>(values: I) -> Option<String>
where
    I: Iterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.filter(|v| !v.is_empty()) {
        *counts.entry(value).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(left, left_count), (right, right_count)| {
            left_count.cmp(right_count).then_with(|| right.cmp(left))
        })
        .map(|(value, _)| value.to_owned())
}

pub fn aggregate(query: &str, rows: &[&PropertyRecord]) -> QueryResult {
    if rows.is_empty() {
        return QueryResult::NotFound {
            query: query.to_owned(),
        };
    }

    let summary = Summary {
        records_count: rows.len(),
        property: field_stats(rows.iter().map(|r| r.property_value), MILLION, 3),
        tarif: field_stats(rows.iter().map(|r| r.tarif), 1.0, 2),
        insurance_type_mode: mode(rows.iter().map(|r| r.insurance_type.as_str())),
        insurer_mode: mode(rows.iter().map(|r| r.insurer.as_str())),
    };

    QueryResult::Found {
        query: query.to_owned(),
        summary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn record(value: Option<f64>, tarif: Option<f64>, kind: &str, insurer: &str) -> PropertyRecord {
        PropertyRecord::new("Haval Jolion", value, tarif, kind, insurer)
    }

    fn haval_rows() -> Vec<PropertyRecord> {
        vec![
            record(Some(2_000_000.0), Some(1.5), "КАСКО", "Ingosstrakh"),
            record(Some(2_500_000.0), Some(1.8), "КАСКО", "Ingosstrakh"),
            record(Some(3_000_000.0), Some(2.0), "ОСАГО", "Ingosstrakh"),
        ]
    }

    #[test]
    fn it_should_return_not_found_for_no_rows() {
        assert_eq!(
            aggregate("anything", &[]),
            QueryResult::NotFound { query: "anything".to_owned() }
        );
    }

    #[test]
    fn it_should_summarize_matched_rows() {
        let rows = haval_rows();
        let refs: Vec<&PropertyRecord> = rows.iter().collect();

        let result = aggregate("haval jolion", &refs);
        let summary = result.summary().unwrap();

        assert_eq!(summary.records_count, 3);
        assert_eq!(summary.property, FieldStats::Available { min: 2.0, median: 2.5, max: 3.0 });
        assert_eq!(summary.tarif, FieldStats::Available { min: 1.5, median: 1.8, max: 2.0 });
        assert_eq!(summary.insurance_type_mode.as_deref(), Some("КАСКО"));
        assert_eq!(summary.insurer_mode.as_deref(), Some("Ingosstrakh"));
    }

    #[test]
    fn it_should_average_the_middle_pair_for_even_counts() {
        let rows = vec![
            record(Some(1_000_000.0), Some(1.0), "КАСКО", "Sogaz"),
            record(Some(2_000_000.0), Some(1.25), "КАСКО", "Sogaz"),
            record(Some(4_000_000.0), Some(2.0), "КАСКО", "Sogaz"),
            record(Some(9_000_000.0), Some(3.0), "КАСКО", "Sogaz"),
        ];
        let refs: Vec<&PropertyRecord> = rows.iter().collect();

        let summary = aggregate("q", &refs).summary().cloned().unwrap();

        assert_eq!(summary.property, FieldStats::Available { min: 1.0, median: 3.0, max: 9.0 });
        assert_eq!(summary.tarif, FieldStats::Available { min: 1.0, median: 1.62, max: 3.0 });
    }

    #[test]
    fn it_should_round_values() {
        let rows = vec![record(Some(1_234_567.0), Some(1.23456), "КАСКО", "Sogaz")];
        let refs: Vec<&PropertyRecord> = rows.iter().collect();

        let summary = aggregate("q", &refs).summary().cloned().unwrap();

        assert_eq!(summary.property, FieldStats::Available { min: 1.235, median: 1.235, max: 1.235 });
        assert_eq!(summary.tarif, FieldStats::Available { min: 1.23, median: 1.23, max: 1.23 });
    }

    #[test]
    fn it_should_round_exact_ties_to_even() {
        let rows = vec![
            record(Some(1_062_500.0), Some(0.125), "КАСКО", "Sogaz"),
            record(Some(1_062_500.0), Some(0.125), "КАСКО", "Sogaz"),
        ];
        let refs: Vec<&PropertyRecord> = rows.iter().collect();

        let summary = aggregate("q", &refs).summary().cloned().unwrap();

        assert_eq!(summary.tarif, FieldStats::Available { min: 0.12, median: 0.12, max: 0.12 });
        assert_eq!(summary.property, FieldStats::Available { min: 1.062, median: 1.062, max: 1.062 });
    }

    #[test]
    fn it_should_skip_missing_numbers_but_count_the_row() {
        let rows = vec![
            record(None, Some(1.0), "КАСКО", "Sogaz"),
            record(Some(5_000_000.0), None, "ОСАГО", "Sogaz"),
            record(None, Some(3.0), "ОСАГО", "RESO"),
        ];
        let refs: Vec<&PropertyRecord> = rows.iter().collect();

        let summary = aggregate("q", &refs).summary().cloned().unwrap();

        assert_eq!(summary.records_count, 3);
        assert_eq!(summary.property, FieldStats::Available { min: 5.0, median: 5.0, max: 5.0 });
        assert_eq!(summary.tarif, FieldStats::Available { min: 1.0, median: 2.0, max: 3.0 });
        assert_eq!(summary.insurance_type_mode.as_deref(), Some("ОСАГО"));
    }

    #[test]
    fn it_should_flag_columns_without_any_number() {
        let rows = vec![record(None, Some(1.0), "КАСКО", "Sogaz"), record(None, Some(2.0), "КАСКО", "Sogaz")];
        let refs: Vec<&PropertyRecord> = rows.iter().collect();

        let result = aggregate("q", &refs);

        assert_matches!(
            result,
            QueryResult::Found { summary: Summary { property: FieldStats::NoNumericData, .. }, .. }
        );
    }

    #[test]
    fn it_should_break_mode_ties_the_same_way_regardless_of_order() {
        let rows = vec![
            record(Some(1.0), Some(1.0), "ОСАГО", "Sogaz"),
            record(Some(1.0), Some(1.0), "КАСКО", "RESO"),
        ];
        let forward: Vec<&PropertyRecord> = rows.iter().collect();
        let backward: Vec<&PropertyRecord> = rows.iter().rev().collect();

        let first = aggregate("q", &forward);
        let second = aggregate("q", &backward);

        assert_eq!(first, second);
        assert_eq!(first.summary().unwrap().insurance_type_mode.as_deref(), Some("КАСКО"));
        assert_eq!(first.summary().unwrap().insurer_mode.as_deref(), Some("RESO"));
    }

    #[test]
    fn it_should_not_depend_on_row_order() {
        let mut rows = haval_rows();
        rows.push(record(None, Some(2.4), "ОСАГО", "Sogaz"));
        rows.push(record(Some(7_100_000.0), None, "", "Sogaz"));

        let reference: Vec<&PropertyRecord> = rows.iter().collect();
        let expected = aggregate("q", &reference);

        let mut shuffled = reference.clone();
        for step in 0..shuffled.len() {
            shuffled.rotate_left(1);
            shuffled.swap(0, step);
            assert_eq!(aggregate("q", &shuffled), expected);
        }
    }

    #[test]
    fn it_should_ignore_empty_categories_in_the_mode() {
        let rows = vec![record(Some(1.0), Some(1.0), "", ""), record(Some(1.0), Some(1.0), "", "")];
        let refs: Vec<&PropertyRecord> = rows.iter().collect();

        let summary = aggregate("q", &refs).summary().cloned().unwrap();

        assert_eq!(summary.insurance_type_mode, None);
        assert_eq!(summary.insurer_mode, None);
    }

    fn arb_record() -> impl Strategy<Value = PropertyRecord> {
        (
            prop::option::of(0.0f64..100_000_000.0),
            prop::option::of(0.0f64..10.0),
            prop::sample::select(vec!["КАСКО", "ОСАГО", "Спецтехника", ""]),
            prop::sample::select(vec!["Ingosstrakh", "Sogaz", "RESO", ""]),
        )
            .prop_map(|(value, tarif, kind, insurer)| record(value, tarif, kind, insurer))
    }

    fn arb_rows_and_shuffle() -> impl Strategy<Value = (Vec<PropertyRecord>, Vec<PropertyRecord>)> {
        prop::collection::vec(arb_record(), 1..20)
            .prop_flat_map(|rows| (Just(rows.clone()), Just(rows).prop_shuffle()))
    }

    proptest! {
        #[test]
        fn it_should_not_depend_on_any_row_order((rows, shuffled) in arb_rows_and_shuffle()) {
            let original: Vec<&PropertyRecord> = rows.iter().collect();
            let reordered: Vec<&PropertyRecord> = shuffled.iter().collect();

            prop_assert_eq!(aggregate("q", &original), aggregate("q", &reordered));
        }
    }
}
