//! Turns flat measurement records into a sorted, rectangular comparison
//! dataset: one row per category, one column per series.

use std::collections::{BTreeSet, HashMap};

use serde::Serialize;
use tracing::{debug, warn};

use crate::category::{
    Category, CategoryId, CategoryItem, GroupCategory, Labeled, PrecursorCategory, SeriesItem,
    SeriesKey,
};
use crate::color::{CategoryColors, ColorAssigner};
use crate::labels::{self, LabelMap};
use crate::options::{ChartKind, ChartOptions};
use crate::palette::{Color, Palette};
use crate::prefix;
use crate::record::{Lookups, MeasurementRecord, Precursor};
use crate::series_color::SeriesColorIndexer;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisMagnitude {
    Units,
    Thousands,
    Millions,
}

impl AxisMagnitude {
    pub fn for_max(max: f64) -> Self {
        let thousands = max / 1000.0;
        if thousands < 1.0 {
            AxisMagnitude::Units
        } else if thousands > 1000.0 {
            AxisMagnitude::Millions
        } else {
            AxisMagnitude::Thousands
        }
    }

    pub fn scale(self) -> f64 {
        match self {
            AxisMagnitude::Units => 1.0,
            AxisMagnitude::Thousands => 1_000.0,
            AxisMagnitude::Millions => 1_000_000.0,
        }
    }

    /// Suffix appended to the axis title.
    pub fn suffix(self) -> &'static str {
        match self {
            AxisMagnitude::Units => "",
            AxisMagnitude::Thousands => "10^3",
            AxisMagnitude::Millions => "10^6",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AxisScale {
    pub magnitude: AxisMagnitude,
    pub scale: f64,
    pub suffix: String,
}

impl AxisScale {
    pub fn for_max(max: f64) -> Self {
        let magnitude = AxisMagnitude::for_max(max);
        Self {
            magnitude,
            scale: magnitude.scale(),
            suffix: magnitude.suffix().to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CategoryEntry {
    pub sorting_label: String,
    pub display_label: String,
    pub color: Color,
    pub max_value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SeriesEntry {
    pub key: SeriesKey,
    pub label: String,
    pub color: Color,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SeriesCell {
    pub value: f64,
    pub deviation: f64,
    pub statistical: bool,
    pub count: usize,
    /// Value divided by the axis scale, or raw in log mode.
    pub display_value: f64,
    pub display_deviation: f64,
}

impl SeriesCell {
    fn new(item: SeriesItem, scale: f64) -> Self {
        Self {
            value: item.value(),
            deviation: item.deviation(),
            statistical: item.is_statistical(),
            count: item.count(),
            display_value: item.value() / scale,
            display_deviation: item.deviation() / scale,
        }
    }
}

/// Everything the renderer needs for one comparison chart.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ComparisonDataset {
    pub categories: Vec<CategoryEntry>,
    pub series: Vec<SeriesEntry>,
    /// `cells[category][series]`; absent pairs hold zero placeholders.
    pub cells: Vec<Vec<SeriesCell>>,
    pub axis: AxisScale,
    pub log_mode: bool,
    pub is_statistical: bool,
    /// Sorting label to display label, for axis ticks.
    pub minimized_labels: LabelMap,
    pub dropped_records: usize,
}

impl ComparisonDataset {
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn series_color(&self, key: &SeriesKey) -> Option<Color> {
        self.series
            .iter()
            .find(|entry| &entry.key == key)
            .map(|entry| entry.color)
    }

    pub fn cell(&self, category: usize, series: usize) -> Option<&SeriesCell> {
        self.cells.get(category)?.get(series)
    }

    pub fn display_labels(&self) -> Vec<&str> {
        self.categories
            .iter()
            .map(|entry| entry.display_label.as_str())
            .collect()
    }
}

struct Bucket {
    category: Category,
    color_group: String,
    values: HashMap<SeriesKey, Vec<f64>>,
}

struct Row {
    category: Category,
    sorting_label: String,
    color_group: String,
    item: CategoryItem,
}

/// True for labels like `12`, `-3`, `+0.25`.
pub fn is_numeric_label(label: &str) -> bool {
    let unsigned = label.strip_prefix(&['+', '-'][..]).unwrap_or(label);
    let (whole, fraction) = match unsigned.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (unsigned, None),
    };

    let all_digits = |part: &str| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit());
    match fraction {
        Some(fraction) => all_digits(whole) && all_digits(fraction),
        None => all_digits(whole),
    }
}

fn sort_rows(rows: &mut [Row], by_value: bool) {
    if by_value {
        rows.sort_by(|a, b| {
            b.item
                .max_value()
                .total_cmp(&a.item.max_value())
                .then_with(|| a.sorting_label.cmp(&b.sorting_label))
        });
    } else if rows.iter().all(|row| is_numeric_label(&row.sorting_label)) {
        let number = |row: &Row| row.sorting_label.parse::<f64>().unwrap_or(0.0);
        rows.sort_by(|a, b| {
            number(a)
                .total_cmp(&number(b))
                .then_with(|| a.sorting_label.cmp(&b.sorting_label))
        });
    } else {
        rows.sort_by(|a, b| a.sorting_label.cmp(&b.sorting_label));
    }
}

fn color_key(category: &Category) -> &str {
    match category {
        Category::Peptide(precursor) | Category::Molecule(precursor) => &precursor.sequence,
        Category::Replicate(_) | Category::Annotation(_) => category.category_label(),
    }
}

#[derive(Clone, Debug)]
pub struct CategoryAggregator<'a> {
    options: ChartOptions,
    palette: Palette<'a>,
}

impl CategoryAggregator<'static> {
    pub fn new(options: ChartOptions) -> Self {
        Self::with_palette(options, Palette::standard())
    }
}

impl<'a> CategoryAggregator<'a> {
    pub fn with_palette(options: ChartOptions, palette: Palette<'a>) -> Self {
        Self { options, palette }
    }

    pub fn options(&self) -> &ChartOptions {
        &self.options
    }

    /// Color for an entity keyed by name, avoiding colors of its siblings.
    pub fn category_color(&self, key: Option<&str>, siblings: &[Color]) -> Color {
        ColorAssigner::new(self.palette).assign(key, siblings)
    }

    fn category_for(
        &self,
        record: &MeasurementRecord,
        replicate_name: &str,
        annotation: Option<&str>,
    ) -> Category {
        match self.options.chart_kind {
            ChartKind::ReplicateComparison => match annotation {
                Some(value) => Category::Annotation(GroupCategory::new(value)),
                None => Category::Replicate(GroupCategory::new(replicate_name)),
            },
            ChartKind::PeptideComparison => {
                let precursor = PrecursorCategory::new(
                    record.precursor.identity(),
                    record.charge,
                    record.isotope_label.clone(),
                    annotation.map(str::to_string),
                );
                match record.precursor {
                    Precursor::Peptide { .. } => Category::Peptide(precursor),
                    Precursor::Molecule { .. } => Category::Molecule(precursor),
                }
            }
        }
    }

    fn series_for(&self, record: &MeasurementRecord) -> SeriesKey {
        let charge = match self.options.chart_kind {
            ChartKind::ReplicateComparison => record.charge,
            ChartKind::PeptideComparison => 0,
        };
        SeriesKey::new(charge, &record.isotope_label)
    }

    pub fn build(&self, records: &[MeasurementRecord], lookups: &Lookups) -> ComparisonDataset {
        let options = &self.options;
        let mut buckets: Vec<Bucket> = Vec::new();
        let mut index: HashMap<CategoryId, usize> = HashMap::new();
        let mut series_space: BTreeSet<SeriesKey> = BTreeSet::new();
        let mut dropped_records = 0usize;

        for record in records {
            let Some(replicate) = lookups.resolve(record.sample_file_id) else {
                warn!(
                    target: "peakchart::aggregate",
                    sample_file_id = record.sample_file_id,
                    "dropping record with unresolved replicate"
                );
                dropped_records += 1;
                continue;
            };

            let annotation = match &options.group_by_annotation {
                Some(name) => match replicate.annotation(name) {
                    Some(value) => Some(value),
                    None => {
                        debug!(
                            target: "peakchart::aggregate",
                            replicate = replicate.name,
                            annotation = %name,
                            "dropping record without grouping annotation"
                        );
                        dropped_records += 1;
                        continue;
                    }
                },
                None => None,
            };

            if let (Some(filter), Some(value)) = (&options.filter_by_annotation_value, annotation)
            {
                if value != filter.as_str() {
                    continue;
                }
            }

            let category = self.category_for(record, replicate.name, annotation);
            let series = self.series_for(record);
            series_space.insert(series.clone());

            let slot = *index.entry(category.id()).or_insert_with(|| {
                buckets.push(Bucket {
                    category,
                    color_group: record.group.clone().unwrap_or_default(),
                    values: HashMap::new(),
                });
                buckets.len() - 1
            });

            let values = buckets[slot].values.entry(series).or_default();
            if let Some(value) = options.metric.value_of(record) {
                values.push(value);
            }
        }

        self.label_categories(&mut buckets);

        let mut rows: Vec<Row> = buckets
            .into_iter()
            .map(|bucket| {
                let mut item = CategoryItem::default();
                for (key, values) in bucket.values {
                    let series_item = SeriesItem::from_values(&values);
                    let series_item = if options.cv_mode {
                        series_item.into_cv()
                    } else {
                        series_item
                    };
                    item.insert(key, series_item);
                }
                Row {
                    sorting_label: bucket.category.sorting_label(),
                    category: bucket.category,
                    color_group: bucket.color_group,
                    item,
                }
            })
            .collect();

        sort_rows(&mut rows, options.sorts_by_value());

        let max_value = rows
            .iter()
            .map(|row| row.item.max_value())
            .fold(0.0_f64, f64::max);
        let axis = AxisScale::for_max(max_value);
        let scale = if options.log_mode { 1.0 } else { axis.scale };

        let series_keys: Vec<SeriesKey> = series_space.into_iter().collect();
        let series_colors =
            SeriesColorIndexer::new(self.palette, options.series_colors).colors(&series_keys);
        let series: Vec<SeriesEntry> = series_keys
            .iter()
            .zip(series_colors)
            .map(|(key, color)| SeriesEntry {
                key: key.clone(),
                label: key.label(),
                color,
            })
            .collect();

        let mut category_colors = CategoryColors::new(ColorAssigner::new(self.palette));
        let mut categories = Vec::with_capacity(rows.len());
        let mut cells = Vec::with_capacity(rows.len());
        let mut minimized_labels = LabelMap::new();
        for row in &rows {
            let display_label = row.category.display_label();
            minimized_labels.insert(row.sorting_label.clone(), display_label.clone());
            categories.push(CategoryEntry {
                sorting_label: row.sorting_label.clone(),
                display_label,
                color: category_colors.color_for(&row.color_group, color_key(&row.category)),
                max_value: row.item.max_value(),
            });
            cells.push(
                series_keys
                    .iter()
                    .map(|key| SeriesCell::new(row.item.get_or_empty(key), scale))
                    .collect(),
            );
        }

        let is_statistical = rows.iter().any(|row| row.item.is_statistical());

        debug!(
            target: "peakchart::aggregate",
            records = records.len(),
            dropped = dropped_records,
            categories = categories.len(),
            series = series.len(),
            "built comparison dataset"
        );

        ComparisonDataset {
            categories,
            series,
            cells,
            axis,
            log_mode: options.log_mode,
            is_statistical,
            minimized_labels,
            dropped_records,
        }
    }

    fn label_categories(&self, buckets: &mut [Bucket]) {
        let mut peptides: Vec<&mut PrecursorCategory> = Vec::new();
        let mut molecules: Vec<&mut PrecursorCategory> = Vec::new();
        let mut groups: Vec<&mut GroupCategory> = Vec::new();

        for bucket in buckets.iter_mut() {
            match &mut bucket.category {
                Category::Peptide(precursor) => peptides.push(precursor),
                Category::Molecule(precursor) => molecules.push(precursor),
                Category::Replicate(group) | Category::Annotation(group) => groups.push(group),
            }
        }

        prefix::assign_peptide_labels(&mut peptides);
        prefix::assign_molecule_labels(&mut molecules);

        let names: Vec<String> = groups
            .iter()
            .map(|group| group.category_label().to_string())
            .collect();
        let minimized = labels::minimize(&names);
        for group in groups {
            let display = minimized.get(group.category_label()).cloned();
            if let Some(display) = display {
                group.set_display(display);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::IsotopeLabel;

    fn light() -> IsotopeLabel {
        IsotopeLabel {
            id: 1,
            name: "light".into(),
        }
    }

    fn heavy() -> IsotopeLabel {
        IsotopeLabel {
            id: 2,
            name: "heavy".into(),
        }
    }

    fn record(sample_file_id: i64, sequence: &str, charge: u32, area: f64) -> MeasurementRecord {
        MeasurementRecord {
            sample_file_id,
            precursor: Precursor::Peptide {
                sequence: sequence.into(),
                modified_sequence: None,
            },
            charge,
            isotope_label: light(),
            area: Some(area),
            retention_time: Some(area / 1000.0),
            group: Some("protein".into()),
        }
    }

    fn lookups(replicates: &[(i64, &str, &str)]) -> Lookups {
        let mut lookups = Lookups::default();
        for (id, name, condition) in replicates {
            lookups.sample_files.insert(*id * 10, *id);
            lookups.replicates.insert(*id, name.to_string());
            lookups.annotations.insert(
                *id,
                HashMap::from([("Condition".to_string(), condition.to_string())]),
            );
        }
        lookups
    }

    fn replicate_options() -> ChartOptions {
        ChartOptions {
            chart_kind: ChartKind::ReplicateComparison,
            ..ChartOptions::default()
        }
    }

    #[test]
    fn axis_magnitude_thresholds() {
        assert_eq!(AxisMagnitude::for_max(999.0), AxisMagnitude::Units);
        assert_eq!(AxisMagnitude::for_max(50_000.0), AxisMagnitude::Thousands);
        assert_eq!(AxisMagnitude::for_max(5_000_000.0), AxisMagnitude::Millions);

        let thousands = AxisScale::for_max(50_000.0);
        assert_eq!(thousands.scale, 1_000.0);
        assert_eq!(thousands.suffix, "10^3");

        let millions = AxisScale::for_max(5_000_000.0);
        assert_eq!(millions.scale, 1_000_000.0);
        assert_eq!(millions.suffix, "10^6");
        assert_eq!(AxisScale::for_max(999.0).suffix, "");
    }

    #[test]
    fn numeric_label_pattern() {
        for label in ["1", "-2", "+3.5", "0.25", "10"] {
            assert!(is_numeric_label(label), "{label}");
        }
        for label in ["", "-", "1.", ".5", "1e3", "Rep1", "1.2.3"] {
            assert!(!is_numeric_label(label), "{label}");
        }
    }

    #[test]
    fn empty_records_build_empty_dataset() {
        let aggregator = CategoryAggregator::new(ChartOptions::default());
        let dataset = aggregator.build(&[], &Lookups::default());

        assert!(dataset.is_empty());
        assert!(dataset.series.is_empty());
        assert!(!dataset.is_statistical);
        assert_eq!(dataset.axis.magnitude, AxisMagnitude::Units);
    }

    #[test]
    fn unresolved_records_are_dropped() {
        let aggregator = CategoryAggregator::new(replicate_options());
        let lookups = lookups(&[(1, "Rep1", "A")]);
        let records = vec![record(10, "PEPTIDE", 2, 5.0), record(99, "PEPTIDE", 2, 7.0)];

        let dataset = aggregator.build(&records, &lookups);
        assert_eq!(dataset.dropped_records, 1);
        assert_eq!(dataset.categories.len(), 1);
        assert_eq!(dataset.cells[0][0].value, 5.0);
    }

    #[test]
    fn replicate_comparison_splits_series_by_charge() {
        let aggregator = CategoryAggregator::new(replicate_options());
        let lookups = lookups(&[(1, "Run_1", "A"), (2, "Run_2", "A")]);
        let records = vec![
            record(10, "PEPTIDE", 2, 10.0),
            record(10, "PEPTIDE", 3, 20.0),
            record(20, "PEPTIDE", 2, 30.0),
        ];

        let dataset = aggregator.build(&records, &lookups);
        let charges: Vec<u32> = dataset.series.iter().map(|entry| entry.key.charge).collect();
        assert_eq!(charges, vec![2, 3]);
        assert_eq!(dataset.display_labels(), vec!["1", "2"]);

        // Run_2 has no charge 3 measurement: explicit zero placeholder.
        let placeholder = dataset.cell(1, 1).expect("placeholder cell");
        assert_eq!(placeholder.value, 0.0);
        assert_eq!(placeholder.count, 0);
    }

    #[test]
    fn peptide_comparison_excludes_charge_from_series() {
        let aggregator = CategoryAggregator::new(ChartOptions::default());
        let lookups = lookups(&[(1, "Rep1", "A")]);
        let records = vec![
            record(10, "PEPTIDE", 2, 10.0),
            record(10, "PEPTIDE", 3, 20.0),
        ];

        let dataset = aggregator.build(&records, &lookups);
        assert_eq!(dataset.series.len(), 1);
        assert_eq!(dataset.series[0].key.charge, 0);
        assert_eq!(dataset.categories.len(), 2);
        // Sorted by value, descending.
        assert_eq!(dataset.display_labels(), vec!["PEP+3", "PEP+2"]);
    }

    #[test]
    fn peptide_categories_share_color_across_charges() {
        let aggregator = CategoryAggregator::new(ChartOptions::default());
        let lookups = lookups(&[(1, "Rep1", "A")]);
        let records = vec![
            record(10, "PEPTIDE", 2, 10.0),
            record(10, "PEPTIDE", 3, 20.0),
            record(10, "ELVISLIVES", 2, 30.0),
        ];

        let dataset = aggregator.build(&records, &lookups);
        let color_of = |label: &str| {
            dataset
                .categories
                .iter()
                .find(|entry| entry.display_label == label)
                .map(|entry| entry.color)
                .expect("category present")
        };
        assert_eq!(color_of("PEP+2"), color_of("PEP+3"));
        assert_eq!(
            color_of("ELV"),
            aggregator.category_color(Some("ELVISLIVES"), &[])
        );
    }

    #[test]
    fn multiple_records_produce_statistics() {
        let aggregator = CategoryAggregator::new(replicate_options());
        let lookups = lookups(&[(1, "Rep1", "A")]);
        let records = vec![
            record(10, "PEPTIDE", 2, 100.0),
            record(10, "PEPTIDE", 2, 110.0),
            record(10, "PEPTIDE", 2, 90.0),
        ];

        let dataset = aggregator.build(&records, &lookups);
        let cell = dataset.cell(0, 0).expect("cell");
        assert_eq!(cell.value, 100.0);
        assert!((cell.deviation - 10.0).abs() < 1e-9);
        assert!(cell.statistical);
        assert!(dataset.is_statistical);
    }

    #[test]
    fn cv_mode_reports_percentage_without_error_bars() {
        let aggregator = CategoryAggregator::new(ChartOptions {
            cv_mode: true,
            ..replicate_options()
        });
        let lookups = lookups(&[(1, "Rep1", "A")]);
        let records = vec![
            record(10, "PEPTIDE", 2, 100.0),
            record(10, "PEPTIDE", 2, 110.0),
            record(10, "PEPTIDE", 2, 90.0),
        ];

        let dataset = aggregator.build(&records, &lookups);
        let cell = dataset.cell(0, 0).expect("cell");
        assert!((cell.value - 10.0).abs() < 1e-9);
        assert_eq!(cell.deviation, 0.0);
        assert!(!cell.statistical);
        assert!(!dataset.is_statistical);
    }

    #[test]
    fn values_are_scaled_unless_log_mode() {
        let lookups = lookups(&[(1, "Rep1", "A")]);
        let records = vec![record(10, "PEPTIDE", 2, 50_000.0)];

        let linear = CategoryAggregator::new(replicate_options()).build(&records, &lookups);
        assert_eq!(linear.axis.magnitude, AxisMagnitude::Thousands);
        assert_eq!(linear.cells[0][0].display_value, 50.0);

        let log = CategoryAggregator::new(ChartOptions {
            log_mode: true,
            ..replicate_options()
        })
        .build(&records, &lookups);
        assert_eq!(log.cells[0][0].display_value, 50_000.0);
        assert!(log.log_mode);
    }

    #[test]
    fn annotation_grouping_drops_unannotated_and_filters_values() {
        let mut lookups = lookups(&[(1, "Rep1", "Treated"), (2, "Rep2", "Control")]);
        lookups.sample_files.insert(30, 3);
        lookups.replicates.insert(3, "Rep3".into());
        let records = vec![
            record(10, "PEPTIDE", 2, 1.0),
            record(20, "PEPTIDE", 2, 2.0),
            record(30, "PEPTIDE", 2, 3.0),
        ];

        let grouped = CategoryAggregator::new(ChartOptions {
            group_by_annotation: Some("Condition".into()),
            ..replicate_options()
        })
        .build(&records, &lookups);
        assert_eq!(grouped.dropped_records, 1);
        let labels: Vec<&str> = grouped
            .categories
            .iter()
            .map(|entry| entry.sorting_label.as_str())
            .collect();
        assert_eq!(labels, vec!["Control", "Treated"]);

        let filtered = CategoryAggregator::new(ChartOptions {
            group_by_annotation: Some("Condition".into()),
            filter_by_annotation_value: Some("Treated".into()),
            ..replicate_options()
        })
        .build(&records, &lookups);
        assert_eq!(filtered.categories.len(), 1);
        assert_eq!(filtered.categories[0].sorting_label, "Treated");
    }

    #[test]
    fn numeric_categories_sort_numerically() {
        let lookups = lookups(&[(1, "10", "A"), (2, "9", "A"), (3, "-1.5", "A")]);
        let records = vec![
            record(10, "PEPTIDE", 2, 1.0),
            record(20, "PEPTIDE", 2, 2.0),
            record(30, "PEPTIDE", 2, 3.0),
        ];

        let dataset = CategoryAggregator::new(replicate_options()).build(&records, &lookups);
        let labels: Vec<&str> = dataset
            .categories
            .iter()
            .map(|entry| entry.sorting_label.as_str())
            .collect();
        assert_eq!(labels, vec!["-1.5", "9", "10"]);
    }

    #[test]
    fn missing_values_contribute_zero() {
        let lookups = lookups(&[(1, "Rep1", "A")]);
        let mut empty = record(10, "PEPTIDE", 2, 0.0);
        empty.area = None;

        let dataset = CategoryAggregator::new(replicate_options()).build(&[empty], &lookups);
        assert_eq!(dataset.categories.len(), 1);
        assert_eq!(dataset.cells[0][0].value, 0.0);
        assert_eq!(dataset.cells[0][0].count, 0);
    }

    #[test]
    fn series_colors_follow_label_layout() {
        let lookups = lookups(&[(1, "Rep1", "A")]);
        let mut heavy_record = record(10, "PEPTIDE", 2, 2.0);
        heavy_record.isotope_label = heavy();
        let records = vec![record(10, "PEPTIDE", 2, 1.0), heavy_record];

        let mut options = replicate_options();
        options.series_colors.light_label_id = 1;
        options.series_colors.label_count = 2;
        let dataset = CategoryAggregator::new(options).build(&records, &lookups);

        let palette = Palette::standard();
        let light_key = SeriesKey::new(2, &light());
        let heavy_key = SeriesKey::new(2, &heavy());
        assert_eq!(dataset.series_color(&light_key), Some(palette.color_at(0)));
        assert_eq!(dataset.series_color(&heavy_key), Some(palette.color_at(1)));
    }
}
