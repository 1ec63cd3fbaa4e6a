mod outline;

pub use outline::load_outline;

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Columns every dataset file must carry
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "ID",
    "NM_LOCALID",
    "LAT",
    "LONG",
    "ALT",
    "UF",
    "UF_SIGLA",
    "NM_REGIAO",
    "REGIAO_SIGLA",
];

/// One geocoded settlement record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locality {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "NM_LOCALID")]
    pub name: String,
    #[serde(rename = "LAT")]
    pub lat: f64,
    #[serde(rename = "LONG")]
    pub lon: f64,
    #[serde(rename = "ALT")]
    pub alt: f64,
    /// State name (e.g. "AMAZONAS")
    #[serde(rename = "UF")]
    pub state_name: String,
    /// State code (e.g. "AM"), the state identifier used by selections
    #[serde(rename = "UF_SIGLA")]
    pub state: String,
    /// Region name (e.g. "Norte"), the region identifier used by selections
    #[serde(rename = "NM_REGIAO")]
    pub region: String,
    #[serde(rename = "REGIAO_SIGLA")]
    pub region_code: String,
}

/// Errors raised while loading the localities table
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open dataset {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to read dataset header: {0}")]
    Header(#[source] csv::Error),
    #[error("dataset is missing required column `{0}`")]
    MissingColumn(String),
    #[error("malformed record at line {line}: {source}")]
    Malformed { line: u64, source: csv::Error },
}

/// The immutable table of localities, in file order
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    localities: Vec<Locality>,
}

impl Dataset {
    pub fn new(localities: Vec<Locality>) -> Self {
        Self { localities }
    }

    /// Load the dataset from a CSV file
    pub fn load(path: &Path, delimiter: u8) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let dataset = Self::load_from_reader(file, delimiter)?;
        tracing::info!(path = %path.display(), rows = dataset.len(), "loaded dataset");
        Ok(dataset)
    }

    /// Load the dataset from any CSV source. Extra columns are ignored.
    pub fn load_from_reader<R: Read>(reader: R, delimiter: u8) -> Result<Self, LoadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = rdr.headers().map_err(LoadError::Header)?.clone();
        for column in REQUIRED_COLUMNS {
            if !headers.iter().any(|h| h == column) {
                return Err(LoadError::MissingColumn(column.to_string()));
            }
        }

        let mut localities = Vec::new();
        for result in rdr.deserialize::<Locality>() {
            let locality = result.map_err(|source| LoadError::Malformed {
                line: source.position().map(|p| p.line()).unwrap_or(0),
                source,
            })?;
            localities.push(locality);
        }

        if localities.is_empty() {
            tracing::warn!("dataset has no rows");
        }

        Ok(Self { localities })
    }

    pub fn localities(&self) -> &[Locality] {
        &self.localities
    }

    pub fn len(&self) -> usize {
        self.localities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.localities.is_empty()
    }

    /// Bounding box of all localities as (min_lon, min_lat, max_lon, max_lat)
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let first = self.localities.first()?;
        let init = (first.lon, first.lat, first.lon, first.lat);
        Some(self.localities.iter().fold(init, |(x0, y0, x1, y1), l| {
            (x0.min(l.lon), y0.min(l.lat), x1.max(l.lon), y1.max(l.lat))
        }))
    }

    /// Altitude range of all localities as (min, max)
    pub fn altitude_range(&self) -> Option<(f64, f64)> {
        let first = self.localities.first()?;
        Some(
            self.localities
                .iter()
                .fold((first.alt, first.alt), |(lo, hi), l| (lo.min(l.alt), hi.max(l.alt))),
        )
    }
}
