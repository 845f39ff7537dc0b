//! co2viz: interactive charts of national CO2 emissions
//!
//! Loads the Our World in Data CO2 dataset (or a small embedded sample when
//! it cannot be fetched), drops incomplete rows and aggregate regions, then
//! shows three Plotly charts:
//! 1. Annual emissions over time for a handful of major emitters
//! 2. Top emitters by cumulative emissions
//! 3. An animated world map of annual emissions per year

use anyhow::Result;
use clap::Parser;
use log::{info, warn};
use std::path::PathBuf;

mod chart;
mod clean;
mod config;
mod dataset;
mod display;
mod source;
mod views;

use crate::config::Config;
use crate::dataset::Origin;
use crate::display::Display;

/// Show interactive charts of national CO2 emissions
#[derive(Parser, Debug)]
#[command(name = "co2viz")]
#[command(version)]
#[command(about = "Fetch the OWID CO2 dataset, clean it and show line, bar and map charts")]
struct Cli {
    /// YAML configuration file (all settings optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Dataset URL or local CSV path (overrides the config file)
    #[arg(short, long)]
    url: Option<String>,

    /// Write the charts as HTML files into this directory instead of
    /// opening them in the browser
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .target(env_logger::Target::Stdout)
        .init();

    info!("co2viz v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.url {
        config.source.url = url;
    }
    config.validate()?;

    let display = match cli.output_dir {
        Some(dir) => Display::Directory(dir),
        None => Display::Browser,
    };

    run(&config, &display)
}

/// load → clean → three independent charts
fn run(config: &Config, display: &Display) -> Result<()> {
    // === 1. Load ===
    let source = source::source_for(&config.source.url)?;
    let dataset = source::load_with_fallback(source.as_ref())?;
    match &dataset.origin {
        Origin::Fetched { location } => info!("Loaded {} rows from {}", dataset.len(), location),
        Origin::Fallback => warn!("Charts are drawn from the embedded sample, not the real dataset"),
    }

    // === 2. Clean ===
    let table = clean::clean(&dataset, &config.cleaning.exclude);
    if table.is_empty() {
        warn!("No rows left after cleaning, charts will be empty");
    }

    // === 3. Charts ===
    let line_rows = views::line_view(&table, &config.charts.line_countries);
    info!("Line chart: {} rows", line_rows.len());
    display.show(&chart::line_chart(&line_rows), "line")?;

    let totals = views::top_emitters(&table, config.charts.top_n);
    if let Some(top) = totals.first() {
        info!(
            "Bar chart: {} countries, top emitter {} ({:.1} Mt)",
            totals.len(),
            top.country,
            top.co2
        );
    }
    display.show(&chart::bar_chart(&totals, config.charts.top_n), "bar")?;

    let map_rows = views::map_view(&table, config.charts.map_start_year);
    info!(
        "Map: {} rows from {} onwards",
        map_rows.len(),
        config.charts.map_start_year
    );
    display.show(&chart::choropleth_map(&map_rows), "map")?;

    info!("Done!");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_writes_all_charts_from_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.source.url = "/nonexistent/owid-co2-data.csv".to_string();

        run(&config, &Display::Directory(dir.path().to_path_buf())).unwrap();

        for name in ["line", "bar", "map"] {
            let html = std::fs::read_to_string(dir.path().join(format!("{}.html", name))).unwrap();
            assert!(html.contains("Plotly.newPlot"));
        }

        let bar = std::fs::read_to_string(dir.path().join("bar.html")).unwrap();
        assert!(bar.contains("\"x\":[\"China\",\"USA\",\"India\"]"));
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::parse_from(["co2viz", "-u", "data.csv", "-o", "out", "-v"]);
        assert_eq!(cli.url.as_deref(), Some("data.csv"));
        assert_eq!(cli.output_dir, Some(PathBuf::from("out")));
        assert!(cli.verbose);
        assert!(cli.config.is_none());
    }
}
