//! Categorization, labeling and coloring for peptide and replicate
//! comparison charts.

pub mod aggregate;
pub mod api;
pub mod category;
pub mod color;
pub mod error;
pub mod labels;
pub mod options;
pub mod palette;
pub mod prefix;
pub mod record;
pub mod series_color;

pub use aggregate::{AxisMagnitude, AxisScale, CategoryAggregator, ComparisonDataset};
pub use api::ChartRequest;
pub use category::{Category, Labeled, SeriesItem, SeriesKey};
pub use color::ColorAssigner;
pub use error::{OptionsError, PaletteError};
pub use options::{ChartKind, ChartOptions, Metric};
pub use palette::{Color, Palette};
pub use record::{IsotopeLabel, Lookups, MeasurementRecord, Precursor};

#[cfg(test)]
#[ctor::ctor]
unsafe fn init_test_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
