//! Emissions dataset: raw CSV tables and typed records
//!
//! A source hands back a [`RawTable`] (tokenized CSV, no typing). Column
//! mapping into [`RawRecord`]s happens in [`Dataset::from_table`], after the
//! fetch fallback has been decided.

use anyhow::{Context, Result};
use csv::StringRecord;
use std::io::Read;

/// Cell contents read as a missing value (the usual CSV NA spellings)
const MISSING_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Tokenized CSV: header row plus data rows
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: StringRecord,
    pub rows: Vec<StringRecord>,
}

impl RawTable {
    /// Tokenize CSV text. Short rows are kept (absent trailing cells read as
    /// missing); rows with more fields than the header are an error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers = rdr.headers().context("Failed to read CSV header")?.clone();
        let mut rows = Vec::new();
        for (i, result) in rdr.records().enumerate() {
            let row = result.context("Malformed CSV row")?;
            if row.len() > headers.len() {
                anyhow::bail!(
                    "Line {}: expected {} fields, saw {}",
                    i + 2,
                    headers.len(),
                    row.len()
                );
            }
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h.trim() == name)
            .with_context(|| {
                format!(
                    "Missing required column '{}' (found: {})",
                    name,
                    self.headers.iter().collect::<Vec<_>>().join(", ")
                )
            })
    }
}

/// One row before cleaning
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub country: String,
    pub iso_code: Option<String>,
    pub year: i32,
    /// Annual emissions, million tonnes
    pub co2: Option<f64>,
}

/// Where the rows came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    Fetched { location: String },
    Fallback,
}

/// The loaded dataset
#[derive(Debug, Clone)]
pub struct Dataset {
    pub records: Vec<RawRecord>,
    pub origin: Origin,
}

impl Dataset {
    /// Map a raw table onto typed records by column name. `country`, `year`,
    /// `co2` and `iso_code` are required, anything else is ignored.
    pub fn from_table(table: &RawTable, location: &str) -> Result<Self> {
        let country_idx = table.column("country")?;
        let year_idx = table.column("year")?;
        let co2_idx = table.column("co2")?;
        let iso_idx = table.column("iso_code")?;

        let mut records = Vec::with_capacity(table.rows.len());
        for (i, row) in table.rows.iter().enumerate() {
            // +2: header is line 1, rows are 1-based
            let line = i + 2;

            let country = cell(row, country_idx).unwrap_or_default().to_string();

            let year_raw = cell(row, year_idx)
                .with_context(|| format!("Line {}: missing year", line))?;
            let year = parse_year(year_raw)
                .with_context(|| format!("Line {}: invalid year '{}'", line, year_raw))?;

            let co2 = match cell(row, co2_idx) {
                Some(raw) => {
                    let value: f64 = raw
                        .parse()
                        .with_context(|| format!("Line {}: invalid co2 value '{}'", line, raw))?;
                    value.is_finite().then_some(value)
                }
                None => None,
            };

            let iso_code = cell(row, iso_idx).map(|s| s.to_string());

            records.push(RawRecord { country, iso_code, year, co2 });
        }

        log::debug!("Mapped {} rows from {}", records.len(), location);

        Ok(Self {
            records,
            origin: Origin::Fetched { location: location.to_string() },
        })
    }

    /// Small embedded sample used when the real dataset cannot be fetched
    pub fn fallback() -> Self {
        let rows: [(&str, i32, f64, &str); 6] = [
            ("USA", 2020, 4500.0, "USA"),
            ("USA", 2021, 4600.0, "USA"),
            ("China", 2020, 10000.0, "CHN"),
            ("China", 2021, 10500.0, "CHN"),
            ("India", 2020, 2300.0, "IND"),
            ("India", 2021, 2500.0, "IND"),
        ];

        let records = rows
            .iter()
            .map(|&(country, year, co2, iso)| RawRecord {
                country: country.to_string(),
                iso_code: Some(iso.to_string()),
                year,
                co2: Some(co2),
            })
            .collect();

        Self { records, origin: Origin::Fallback }
    }

    #[cfg(test)]
    pub fn is_fallback(&self) -> bool {
        self.origin == Origin::Fallback
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

/// Trimmed cell, `None` for absent cells and missing-value tokens.
/// Tokens match the raw cell, so whitespace alone is not missing.
fn cell(row: &StringRecord, idx: usize) -> Option<&str> {
    let value = row.get(idx)?;
    if MISSING_TOKENS.contains(&value) {
        None
    } else {
        Some(value.trim())
    }
}

/// Years are integers, but some exports write them as `1990.0`
fn parse_year(raw: &str) -> Result<i32> {
    if let Ok(year) = raw.parse::<i32>() {
        return Ok(year);
    }
    let value: f64 = raw.parse()?;
    if value.fract() != 0.0 || value.abs() > i32::MAX as f64 {
        anyhow::bail!("not a whole year");
    }
    Ok(value as i32)
}
