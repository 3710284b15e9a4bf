mod catalog_types;
mod property_catalog;

pub use catalog_types::PropertyRecord;
pub use property_catalog::{Catalog, DataLoadError};
