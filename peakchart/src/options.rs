use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use dirs::config_dir;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::OptionsError;
use crate::record::MeasurementRecord;
use crate::series_color::SeriesColorOptions;

pub const OPTIONS_PATH_ENV: &str = "PEAKCHART_OPTIONS_PATH";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// One category per precursor; series split by isotope label only.
    #[default]
    PeptideComparison,
    /// One category per replicate or annotation value; series by charge and label.
    ReplicateComparison,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    #[default]
    PeakArea,
    RetentionTime,
}

impl Metric {
    pub fn value_of(self, record: &MeasurementRecord) -> Option<f64> {
        match self {
            Metric::PeakArea => record.area,
            Metric::RetentionTime => record.retention_time,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub chart_kind: ChartKind,
    pub metric: Metric,
    /// Replicate annotation whose values split (or replace) the categories.
    pub group_by_annotation: Option<String>,
    /// Keeps only records whose grouping annotation has this value.
    pub filter_by_annotation_value: Option<String>,
    pub cv_mode: bool,
    pub log_mode: bool,
    /// Unset means: sort by value for peptide comparisons without annotation
    /// grouping, by label otherwise.
    pub sort_by_value: Option<bool>,
    pub series_colors: SeriesColorOptions,
}

impl ChartOptions {
    pub fn sorts_by_value(&self) -> bool {
        self.sort_by_value.unwrap_or(
            self.chart_kind == ChartKind::PeptideComparison && self.group_by_annotation.is_none(),
        )
    }

    /// Loads options from [`get_options_path`]. A missing file yields defaults.
    pub fn load() -> Result<Self, OptionsError> {
        let path = get_options_path()?;
        Self::load_from_path(path)
    }

    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, OptionsError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no chart options file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }
}

pub fn get_options_path() -> Result<PathBuf, OptionsError> {
    if let Ok(custom) = env::var(OPTIONS_PATH_ENV) {
        return Ok(PathBuf::from(custom));
    }
    let base = config_dir().ok_or(OptionsError::MissingConfigDir)?;
    Ok(base.join("peakchart").join("options.json"))
}
