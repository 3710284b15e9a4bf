use serde::Deserialize;

/// Columns every catalog source must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = ["property", "property_value", "tarif", "type", "insurer"];

/// One row of the source file, as read. Numeric cells stay textual until parsed.
#[derive(Debug, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub property: Option<String>,
    #[serde(default)]
    pub property_value: Option<String>,
    #[serde(default)]
    pub tarif: Option<String>,
    #[serde(default, rename = "type")]
    pub insurance_type: Option<String>,
    #[serde(default)]
    pub insurer: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PropertyRecord {
    pub property_name: String,
    pub property_normalized: String,
    pub property_value: Option<f64>,
    pub tarif: Option<f64>,
    pub insurance_type: String,
    pub insurer: String,
}

/// Lenient numeric parsing: inner spaces are dropped and a decimal comma is accepted.
/// Anything that does not end up as a finite number is missing.
pub fn parse_number(cell: &str) -> Option<f64> {
    let compact: String = cell
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| if c == ',' { '.' } else { c })
        .collect();

    if compact.is_empty() {
        return None;
    }

    compact.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_should_parse_plain_and_grouped_numbers() {
        assert_eq!(parse_number("2500000"), Some(2_500_000.0));
        assert_eq!(parse_number(" 2 500 000 "), Some(2_500_000.0));
        assert_eq!(parse_number("1,8"), Some(1.8));
        assert_eq!(parse_number("1.5"), Some(1.5));
    }

    #[test]
    fn it_should_treat_garbage_as_missing() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("   "), None);
        assert_eq!(parse_number("n/a"), None);
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("1,5,6"), None);
    }
}
