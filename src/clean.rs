//! Row filters that turn the raw dataset into the chart-ready table

use crate::dataset::Dataset;

/// Labels in the OWID data that name aggregates rather than countries
pub const AGGREGATE_REGIONS: [&str; 13] = [
    "World",
    "Asia",
    "Europe",
    "North America",
    "South America",
    "Africa",
    "Oceania",
    "Upper-middle-income countries",
    "High-income countries",
    "Lower-middle-income countries",
    "Low-income countries",
    "European Union (27)",
    "European Union (28)",
];

/// A cleaned row: every field present
#[derive(Debug, Clone, PartialEq)]
pub struct EmissionRecord {
    pub country: String,
    pub iso_code: String,
    pub year: i32,
    /// Annual emissions, million tonnes
    pub co2: f64,
}

/// Read-only table after cleaning
#[derive(Debug, Clone, Default)]
pub struct CleanTable {
    pub records: Vec<EmissionRecord>,
}

impl CleanTable {
    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Drop rows with no co2 or ISO code, then rows naming an aggregate region.
/// Row order is kept.
pub fn clean(dataset: &Dataset, exclude: &[String]) -> CleanTable {
    let mut missing = 0usize;
    let mut aggregates = 0usize;

    let records: Vec<EmissionRecord> = dataset
        .records
        .iter()
        .filter_map(|r| {
            let (Some(co2), Some(iso_code)) = (r.co2, r.iso_code.as_ref()) else {
                missing += 1;
                return None;
            };
            if exclude.iter().any(|e| e == &r.country) {
                aggregates += 1;
                return None;
            }
            Some(EmissionRecord {
                country: r.country.clone(),
                iso_code: iso_code.clone(),
                year: r.year,
                co2,
            })
        })
        .collect();

    log::debug!("Dropped {} rows missing co2 or iso_code", missing);
    log::debug!("Dropped {} aggregate-region rows", aggregates);
    log::info!(
        "Cleaned table: {} of {} rows kept",
        records.len(),
        dataset.records.len()
    );

    CleanTable { records }
}
