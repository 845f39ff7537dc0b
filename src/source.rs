//! Dataset sources and the fetch fallback
//!
//! A [`DataSource`] only downloads and tokenizes. Any failure at that stage
//! swaps in the embedded sample; failures after it (column mapping) are
//! left to propagate.

use crate::dataset::{Dataset, RawTable};
use anyhow::{Context, Result};
use std::path::PathBuf;

/// Something that can hand back the raw emissions table
pub trait DataSource {
    /// Human-readable location (URL or path)
    fn location(&self) -> String;

    /// Download/read and tokenize the table
    fn fetch(&self) -> Result<RawTable>;
}

/// Blocking HTTP(S) download
pub struct HttpSource {
    url: String,
    http: reqwest::blocking::Client,
}

impl HttpSource {
    pub fn new(url: &str) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("co2viz/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { url: url.to_string(), http })
    }
}

impl DataSource for HttpSource {
    fn location(&self) -> String {
        self.url.clone()
    }

    fn fetch(&self) -> Result<RawTable> {
        let resp = self
            .http
            .get(&self.url)
            .send()
            .with_context(|| format!("Request to {} failed", self.url))?
            .error_for_status()?;
        let body = resp
            .bytes()
            .with_context(|| format!("Failed to read response body from {}", self.url))?;
        log::debug!("Downloaded {} bytes from {}", body.len(), self.url);
        RawTable::from_reader(body.as_ref())
    }
}

/// Local CSV file
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl DataSource for FileSource {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<RawTable> {
        let file = std::fs::File::open(&self.path)
            .with_context(|| format!("Failed to open dataset: {}", self.path.display()))?;
        RawTable::from_reader(std::io::BufReader::new(file))
    }
}

/// Pick a source from a URL or a path
pub fn source_for(location: &str) -> Result<Box<dyn DataSource>> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location)?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}

/// Line logged when the fetch fails, with the full error chain
fn fetch_error_message(err: &anyhow::Error) -> String {
    format!("Error loading data: {:#}", err)
}

/// Fetch the dataset, or fall back to the embedded sample if fetching fails
pub fn load_with_fallback(source: &dyn DataSource) -> Result<Dataset> {
    let location = source.location();
    log::info!("Loading dataset from {}", location);

    match source.fetch() {
        Ok(table) => {
            log::info!("Fetched {} rows", table.rows.len());
            Dataset::from_table(&table, &location)
        }
        Err(e) => {
            log::error!("{}", fetch_error_message(&e));
            log::warn!("Continuing with the embedded {}-row sample", Dataset::fallback().len());
            Ok(Dataset::fallback())
        }
    }
}
