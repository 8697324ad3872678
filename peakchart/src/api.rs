use serde::{Deserialize, Serialize};

use crate::aggregate::{CategoryAggregator, ComparisonDataset};
use crate::options::ChartOptions;
use crate::record::{Lookups, MeasurementRecord};

/// One chart's worth of input, as handed over by the data layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRequest {
    pub records: Vec<MeasurementRecord>,
    #[serde(default)]
    pub lookups: Lookups,
    /// Falls back to the caller's configured defaults when absent.
    #[serde(default)]
    pub options: Option<ChartOptions>,
}

impl ChartRequest {
    pub fn build(&self, defaults: &ChartOptions) -> ComparisonDataset {
        let options = self.options.clone().unwrap_or_else(|| defaults.clone());
        CategoryAggregator::new(options).build(&self.records, &self.lookups)
    }
}
