//! Derived views of the cleaned table, one per chart

use crate::clean::{CleanTable, EmissionRecord};
use std::collections::BTreeMap;

/// Summed emissions for one country
#[derive(Debug, Clone, PartialEq)]
pub struct CountryTotal {
    pub country: String,
    /// Cumulative emissions, million tonnes
    pub co2: f64,
}

/// Rows for the selected countries, in table order
pub fn line_view<'a>(table: &'a CleanTable, countries: &[String]) -> Vec<&'a EmissionRecord> {
    table
        .records
        .iter()
        .filter(|r| countries.iter().any(|c| c == &r.country))
        .collect()
}

/// Group by country, sum co2 and keep the `n` largest totals (descending).
/// Equal totals stay in alphabetical order.
pub fn top_emitters(table: &CleanTable, n: usize) -> Vec<CountryTotal> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();
    for record in &table.records {
        *sums.entry(record.country.as_str()).or_insert(0.0) += record.co2;
    }

    let mut totals: Vec<CountryTotal> = sums
        .into_iter()
        .map(|(country, co2)| CountryTotal { country: country.to_string(), co2 })
        .collect();

    // Stable sort keeps the alphabetical order from the BTreeMap among ties
    totals.sort_by(|a, b| b.co2.total_cmp(&a.co2));
    totals.truncate(n);
    totals
}

/// Rows from `start_year` onwards
pub fn map_view(table: &CleanTable, start_year: i32) -> Vec<&EmissionRecord> {
    table
        .records
        .iter()
        .filter(|r| r.year >= start_year)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clean::{clean, AGGREGATE_REGIONS};
    use crate::dataset::Dataset;

    fn record(country: &str, year: i32, co2: f64) -> EmissionRecord {
        EmissionRecord {
            country: country.to_string(),
            iso_code: country.chars().take(3).collect::<String>().to_uppercase(),
            year,
            co2,
        }
    }

    fn fallback_table() -> CleanTable {
        let exclude: Vec<String> = AGGREGATE_REGIONS.iter().map(|s| s.to_string()).collect();
        clean(&Dataset::fallback(), &exclude)
    }

    #[test]
    fn test_top_emitters_fallback() {
        let totals = top_emitters(&fallback_table(), 15);

        // Only 3 distinct countries in the sample
        assert_eq!(totals.len(), 3);
        assert_eq!(totals[0].country, "China");
        assert_eq!(totals[0].co2, 20500.0);
        assert_eq!(totals[1].country, "USA");
        assert_eq!(totals[1].co2, 9100.0);
        assert_eq!(totals[2].country, "India");
        assert_eq!(totals[2].co2, 4800.0);
    }

    #[test]
    fn test_top_emitters_limits_and_sorts() {
        let records = (0..20)
            .map(|i| record(&format!("Country{:02}", i), 2000, (i * 10) as f64))
            .collect();
        let table = CleanTable { records };

        let totals = top_emitters(&table, 15);
        assert_eq!(totals.len(), 15);
        assert_eq!(totals[0].country, "Country19");
        assert!(totals.windows(2).all(|w| w[0].co2 >= w[1].co2));
        // Smallest five are cut
        assert!(totals.iter().all(|t| t.co2 >= 50.0));
    }

    #[test]
    fn test_top_emitters_ties_alphabetical() {
        let table = CleanTable {
            records: vec![
                record("Peru", 2000, 5.0),
                record("Chad", 2000, 5.0),
                record("Mali", 2000, 5.0),
            ],
        };
        let names: Vec<String> = top_emitters(&table, 2).into_iter().map(|t| t.country).collect();
        assert_eq!(names, vec!["Chad", "Mali"]);
    }

    #[test]
    fn test_top_emitters_empty() {
        assert!(top_emitters(&CleanTable::default(), 15).is_empty());
    }

    #[test]
    fn test_line_view() {
        let table = CleanTable {
            records: vec![
                record("China", 2000, 3500.0),
                record("France", 2000, 400.0),
                record("Japan", 2000, 1250.0),
                record("China", 2001, 3600.0),
            ],
        };
        let countries = vec!["China".to_string(), "Japan".to_string()];
        let rows = line_view(&table, &countries);

        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.country != "France"));
        assert_eq!(rows[2].year, 2001);
    }

    #[test]
    fn test_line_view_fallback_uses_exact_names() {
        // The sample says "USA", not "United States"
        let countries: Vec<String> = ["United States", "China", "India"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let table = fallback_table();
        let rows = line_view(&table, &countries);
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn test_map_view_cutoff() {
        let table = CleanTable {
            records: vec![
                record("Spain", 1949, 20.0),
                record("Spain", 1950, 21.0),
                record("Spain", 2020, 210.0),
            ],
        };
        let rows = map_view(&table, 1950);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.year >= 1950));
    }
}
