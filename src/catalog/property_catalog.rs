use failure::Fail;

use std::collections::HashSet;
use std::fs::File;
use std::io;
use std::path;

use super::catalog_types::{parse_number, PropertyRecord, RawRecord, REQUIRED_COLUMNS};
use crate::lookup::normalizer::normalize;

use log::{debug, info};

#[derive(Debug, Fail)]
pub enum DataLoadError {
    #[fail(display = "I/O error: {}", _0)]
    Io(io::Error),
    #[fail(display = "Csv error: {}", _0)]
    Csv(csv::Error),
    #[fail(display = "Missing required columns: {:?}", _0)]
    MissingColumns(Vec<String>),
    #[fail(display = "Catalog has no records")]
    Empty,
}

impl From<io::Error> for DataLoadError {
    fn from(err: io::Error) -> DataLoadError {
        DataLoadError::Io(err)
    }
}

impl From<csv::Error> for DataLoadError {
    fn from(err: csv::Error) -> DataLoadError {
        info!("Error parsing catalog: {}", err);
        DataLoadError::Csv(err)
    }
}

/// Read-only snapshot of every insured-property record.
///
/// Besides the rows it keeps the distinct normalized names, in the order they
/// first appear, as the candidate list for fuzzy matching.
#[derive(Clone, Debug)]
pub struct Catalog {
    records: Vec<PropertyRecord>,
    unique_names: Vec<String>,
}

impl Catalog {
    pub fn new(records: Vec<PropertyRecord>) -> Catalog {
        let mut seen = HashSet::new();
        let unique_names = records
            .iter()
            .filter(|record| seen.insert(record.property_normalized.as_str()))
            .map(|record| record.property_normalized.clone())
            .collect();

        Catalog { records, unique_names }
    }

    pub fn load<P: AsRef<path::Path>>(path: P, delimiter: u8) -> Result<Catalog, DataLoadError> {
        info!("Loading catalog from {}", path.as_ref().display());
        let file = File::open(&path)?;
        Catalog::from_reader(io::BufReader::new(file), delimiter)
    }

    pub fn from_reader<R: io::Read>(reader: R, delimiter: u8) -> Result<Catalog, DataLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::Headers)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|column| !headers.iter().any(|header| header == **column))
            .map(|column| column.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(DataLoadError::MissingColumns(missing));
        }

        let mut records = Vec::new();
        let mut unparsable_cells = 0;

        for raw in csv_reader.deserialize::<RawRecord>() {
            let record = PropertyRecord::from_raw(raw?);
            if record.property_value.is_none() {
                unparsable_cells += 1;
            }
            if record.tarif.is_none() {
                unparsable_cells += 1;
            }
            records.push(record);
        }

        if records.is_empty() {
            return Err(DataLoadError::Empty);
        }
        if unparsable_cells > 0 {
            debug!("{} numeric cells are missing or unparsable", unparsable_cells);
        }

        let catalog = Catalog::new(records);
        info!(
            "Catalog loaded: {} records, {} distinct names",
            catalog.len(),
            catalog.unique_names().len()
        );

        Ok(catalog)
    }

    #[inline]
    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    #[inline]
    pub fn unique_names(&self) -> &[String] {
        &self.unique_names
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }
}

impl PropertyRecord {
    pub fn new(
        property_name: &str,
        property_value: Option<f64>,
        tarif: Option<f64>,
        insurance_type: &str,
        insurer: &str,
    ) -> PropertyRecord {
        PropertyRecord {
            property_name: property_name.to_owned(),
            property_normalized: normalize(property_name),
            property_value,
            tarif,
            insurance_type: insurance_type.trim().to_owned(),
            insurer: insurer.trim().to_owned(),
        }
    }

    fn from_raw(raw: RawRecord) -> PropertyRecord {
        PropertyRecord::new(
            raw.property.as_ref().map(String::as_str).unwrap_or_default(),
            raw.property_value.as_ref().and_then(|v| parse_number(v)),
            raw.tarif.as_ref().and_then(|v| parse_number(v)),
            raw.insurance_type.as_ref().map(String::as_str).unwrap_or_default(),
            raw.insurer.as_ref().map(String::as_str).unwrap_or_default(),
        )
    }
}
