//! Categories (axis positions), series keys (legend entries) and the
//! per-series values that fill them.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::record::IsotopeLabel;

/// Identifies one series within a comparison. Equality, hashing and order only
/// consider the charge and the isotope label id; the label name is for display.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SeriesKey {
    pub charge: u32,
    pub isotope_label_id: i64,
    pub isotope_label_name: String,
}

impl SeriesKey {
    pub fn new(charge: u32, label: &IsotopeLabel) -> Self {
        Self {
            charge,
            isotope_label_id: label.id,
            isotope_label_name: label.name.clone(),
        }
    }

    /// Legend text, e.g. `2+ heavy`, or just the label name when the series
    /// carries no charge.
    pub fn label(&self) -> String {
        let name = if self.isotope_label_name.is_empty() {
            format!("label {}", self.isotope_label_id)
        } else {
            self.isotope_label_name.clone()
        };

        if self.charge == 0 {
            name
        } else {
            format!("{}+ {}", self.charge, name)
        }
    }
}

impl PartialEq for SeriesKey {
    fn eq(&self, other: &Self) -> bool {
        self.charge == other.charge && self.isotope_label_id == other.isotope_label_id
    }
}

impl Eq for SeriesKey {}

impl Hash for SeriesKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.charge.hash(state);
        self.isotope_label_id.hash(state);
    }
}

impl Ord for SeriesKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.charge
            .cmp(&other.charge)
            .then(self.isotope_label_id.cmp(&other.isotope_label_id))
    }
}

impl PartialOrd for SeriesKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Label capabilities shared by every category variant.
pub trait Labeled {
    /// The unshortened base label (replicate name, annotation value, sequence).
    fn category_label(&self) -> &str;
    /// What the axis shows. May be shortened.
    fn display_label(&self) -> String;
    /// Full, stable label used for equality and ordering.
    fn sorting_label(&self) -> String;
}

/// A replicate name or an annotation value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupCategory {
    value: String,
    display: Option<String>,
}

impl GroupCategory {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            display: None,
        }
    }

    pub fn set_display(&mut self, display: impl Into<String>) {
        self.display = Some(display.into());
    }
}

impl Labeled for GroupCategory {
    fn category_label(&self) -> &str {
        &self.value
    }

    fn display_label(&self) -> String {
        self.display.clone().unwrap_or_else(|| self.value.clone())
    }

    fn sorting_label(&self) -> String {
        self.value.clone()
    }
}

/// A peptide or small-molecule precursor, optionally split by an annotation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrecursorCategory {
    /// Modified sequence for peptides, ion name for molecules.
    pub sequence: String,
    pub charge: u32,
    pub isotope_label: IsotopeLabel,
    pub annotation: Option<String>,
    pub(crate) display_prefix: Option<String>,
    pub(crate) show_charge: bool,
    pub(crate) show_label: bool,
}

impl PrecursorCategory {
    pub fn new(
        sequence: impl Into<String>,
        charge: u32,
        isotope_label: IsotopeLabel,
        annotation: Option<String>,
    ) -> Self {
        Self {
            sequence: sequence.into(),
            charge,
            isotope_label,
            annotation,
            display_prefix: None,
            show_charge: true,
            show_label: true,
        }
    }

    pub fn display_prefix(&self) -> &str {
        self.display_prefix.as_deref().unwrap_or(&self.sequence)
    }

    pub fn shows_charge(&self) -> bool {
        self.show_charge
    }

    pub fn shows_label(&self) -> bool {
        self.show_label
    }
}

impl Labeled for PrecursorCategory {
    fn category_label(&self) -> &str {
        &self.sequence
    }

    fn display_label(&self) -> String {
        let mut label = self.display_prefix().to_string();
        if self.show_charge {
            label.push_str(&format!("+{}", self.charge));
        }
        if self.show_label {
            label.push_str(&format!(" ({})", self.isotope_label.name));
        }
        if let Some(annotation) = &self.annotation {
            label.push_str(&format!(" : {annotation}"));
        }
        label
    }

    fn sorting_label(&self) -> String {
        let mut label = format!(
            "{}+{} ({})",
            self.sequence, self.charge, self.isotope_label.name
        );
        if let Some(annotation) = &self.annotation {
            label.push_str(&format!(" : {annotation}"));
        }
        label
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Category {
    Replicate(GroupCategory),
    Annotation(GroupCategory),
    Peptide(PrecursorCategory),
    Molecule(PrecursorCategory),
}

/// Hashable identity of a category; independent of any display narrowing.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CategoryId {
    Replicate(String),
    Annotation(String),
    Precursor {
        molecule: bool,
        sequence: String,
        charge: u32,
        isotope_label_id: i64,
        annotation: Option<String>,
    },
}

impl Category {
    pub fn id(&self) -> CategoryId {
        match self {
            Category::Replicate(group) => CategoryId::Replicate(group.value.clone()),
            Category::Annotation(group) => CategoryId::Annotation(group.value.clone()),
            Category::Peptide(precursor) | Category::Molecule(precursor) => {
                CategoryId::Precursor {
                    molecule: matches!(self, Category::Molecule(_)),
                    sequence: precursor.sequence.clone(),
                    charge: precursor.charge,
                    isotope_label_id: precursor.isotope_label.id,
                    annotation: precursor.annotation.clone(),
                }
            }
        }
    }

    fn labels(&self) -> &dyn Labeled {
        match self {
            Category::Replicate(group) | Category::Annotation(group) => group as &dyn Labeled,
            Category::Peptide(precursor) | Category::Molecule(precursor) => {
                precursor as &dyn Labeled
            }
        }
    }
}

impl Labeled for Category {
    fn category_label(&self) -> &str {
        self.labels().category_label()
    }

    fn display_label(&self) -> String {
        self.labels().display_label()
    }

    fn sorting_label(&self) -> String {
        self.labels().sorting_label()
    }
}

/// One series' value within one category.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SeriesItem {
    /// No contributing value; rendered as zero.
    Empty,
    Single {
        value: f64,
    },
    Aggregate {
        value: f64,
        std_dev: f64,
        count: usize,
        statistical: bool,
    },
}

impl SeriesItem {
    /// Raw value for one input, mean and sample standard deviation for more.
    pub fn from_values(values: &[f64]) -> Self {
        match values {
            [] => SeriesItem::Empty,
            [value] => SeriesItem::Single { value: *value },
            _ => {
                let count = values.len();
                let mean = values.iter().sum::<f64>() / count as f64;
                let variance = values
                    .iter()
                    .map(|value| (value - mean).powi(2))
                    .sum::<f64>()
                    / (count - 1) as f64;
                SeriesItem::Aggregate {
                    value: mean,
                    std_dev: variance.sqrt(),
                    count,
                    statistical: true,
                }
            }
        }
    }

    /// Replaces an aggregate with its coefficient of variation in percent.
    /// Single values pass through. A zero mean has no defined CV and yields
    /// [`SeriesItem::Empty`].
    pub fn into_cv(self) -> Self {
        match self {
            SeriesItem::Aggregate {
                value,
                std_dev,
                count,
                ..
            } => {
                if value == 0.0 {
                    tracing::debug!(count, "coefficient of variation undefined for zero mean");
                    return SeriesItem::Empty;
                }
                SeriesItem::Aggregate {
                    value: 100.0 * std_dev / value,
                    std_dev: 0.0,
                    count,
                    statistical: false,
                }
            }
            other => other,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            SeriesItem::Empty => 0.0,
            SeriesItem::Single { value } | SeriesItem::Aggregate { value, .. } => *value,
        }
    }

    pub fn deviation(&self) -> f64 {
        match self {
            SeriesItem::Aggregate { std_dev, .. } => *std_dev,
            _ => 0.0,
        }
    }

    pub fn is_statistical(&self) -> bool {
        matches!(
            self,
            SeriesItem::Aggregate {
                statistical: true,
                ..
            }
        )
    }

    pub fn count(&self) -> usize {
        match self {
            SeriesItem::Empty => 0,
            SeriesItem::Single { .. } => 1,
            SeriesItem::Aggregate { count, .. } => *count,
        }
    }
}

/// All series values of one category.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CategoryItem {
    series: BTreeMap<SeriesKey, SeriesItem>,
    max_value: f64,
}

impl CategoryItem {
    /// Adds or replaces the value of `key`; the maximum follows replacements.
    pub fn insert(&mut self, key: SeriesKey, item: SeriesItem) {
        self.series.insert(key, item);
        self.max_value = self
            .series
            .values()
            .map(SeriesItem::value)
            .reduce(f64::max)
            .unwrap_or(0.0);
    }

    pub fn get(&self, key: &SeriesKey) -> Option<&SeriesItem> {
        self.series.get(key)
    }

    /// Looks up `key`, falling back to an explicit empty placeholder.
    pub fn get_or_empty(&self, key: &SeriesKey) -> SeriesItem {
        self.series.get(key).copied().unwrap_or(SeriesItem::Empty)
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn is_statistical(&self) -> bool {
        self.series.values().any(SeriesItem::is_statistical)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(id: i64, name: &str) -> IsotopeLabel {
        IsotopeLabel {
            id,
            name: name.to_string(),
        }
    }

    #[test]
    fn series_keys_sort_by_charge_then_label() {
        let mut keys = vec![
            SeriesKey::new(2, &label(5, "heavy")),
            SeriesKey::new(1, &label(9, "light")),
            SeriesKey::new(2, &label(3, "medium")),
        ];
        keys.sort();

        let order: Vec<(u32, i64)> = keys
            .iter()
            .map(|key| (key.charge, key.isotope_label_id))
            .collect();
        assert_eq!(order, vec![(1, 9), (2, 3), (2, 5)]);
    }

    #[test]
    fn series_key_equality_ignores_label_name() {
        let a = SeriesKey::new(2, &label(1, "light"));
        let b = SeriesKey::new(2, &label(1, "Light (renamed)"));
        assert_eq!(a, b);
    }

    #[test]
    fn series_key_label_includes_charge_when_present() {
        assert_eq!(SeriesKey::new(3, &label(1, "heavy")).label(), "3+ heavy");
        assert_eq!(SeriesKey::new(0, &label(1, "heavy")).label(), "heavy");
        assert_eq!(SeriesKey::new(0, &label(7, "")).label(), "label 7");
    }

    #[test]
    fn single_value_has_no_deviation() {
        let item = SeriesItem::from_values(&[42.0]);
        assert_eq!(item, SeriesItem::Single { value: 42.0 });
        assert_eq!(item.deviation(), 0.0);
        assert!(!item.is_statistical());
    }

    #[test]
    fn multiple_values_use_sample_standard_deviation() {
        let item = SeriesItem::from_values(&[100.0, 110.0, 90.0]);
        assert_eq!(item.value(), 100.0);
        assert!((item.deviation() - 10.0).abs() < 1e-9);
        assert!(item.is_statistical());
        assert_eq!(item.count(), 3);
    }

    #[test]
    fn cv_replaces_value_and_clears_deviation() {
        let item = SeriesItem::from_values(&[100.0, 110.0, 90.0]).into_cv();
        assert!((item.value() - 10.0).abs() < 1e-9);
        assert_eq!(item.deviation(), 0.0);
        assert!(!item.is_statistical());
    }

    #[test]
    fn cv_of_zero_mean_is_empty() {
        let item = SeriesItem::from_values(&[-5.0, 5.0]).into_cv();
        assert_eq!(item, SeriesItem::Empty);
    }

    #[test]
    fn no_values_yield_zero() {
        let item = SeriesItem::from_values(&[]);
        assert_eq!(item.value(), 0.0);
        assert_eq!(item.count(), 0);
    }

    #[test]
    fn category_item_tracks_max_and_placeholders() {
        let heavy = SeriesKey::new(2, &label(2, "heavy"));
        let light = SeriesKey::new(2, &label(1, "light"));

        let mut item = CategoryItem::default();
        item.insert(light.clone(), SeriesItem::Single { value: -3.0 });
        assert_eq!(item.max_value(), -3.0);
        item.insert(light.clone(), SeriesItem::Single { value: 12.5 });
        assert_eq!(item.max_value(), 12.5);

        assert_eq!(item.get_or_empty(&heavy), SeriesItem::Empty);
        assert!(item.get(&light).is_some());
    }

    #[test]
    fn replacing_a_series_lowers_the_max() {
        let heavy = SeriesKey::new(2, &label(2, "heavy"));
        let light = SeriesKey::new(2, &label(1, "light"));

        let mut item = CategoryItem::default();
        item.insert(light.clone(), SeriesItem::Single { value: 40.0 });
        item.insert(heavy, SeriesItem::Single { value: 7.0 });
        assert_eq!(item.max_value(), 40.0);

        item.insert(light.clone(), SeriesItem::Single { value: 2.0 });
        assert_eq!(item.max_value(), 7.0);
        assert_eq!(item.get(&light), Some(&SeriesItem::Single { value: 2.0 }));
    }

    #[test]
    fn precursor_labels_respect_suffix_flags() {
        let mut precursor =
            PrecursorCategory::new("PEPTIDE", 2, label(1, "light"), Some("Treated".into()));
        assert_eq!(precursor.sorting_label(), "PEPTIDE+2 (light) : Treated");

        precursor.display_prefix = Some("PEP".into());
        precursor.show_charge = false;
        precursor.show_label = false;
        assert_eq!(precursor.display_label(), "PEP : Treated");
        assert_eq!(precursor.sorting_label(), "PEPTIDE+2 (light) : Treated");
    }

    #[test]
    fn category_delegates_labels_to_variant() {
        let mut group = GroupCategory::new("Replicate_01_Long");
        group.set_display("01");
        let category = Category::Replicate(group);

        assert_eq!(category.category_label(), "Replicate_01_Long");
        assert_eq!(category.display_label(), "01");
        assert_eq!(category.sorting_label(), "Replicate_01_Long");
        assert_eq!(category.id(), CategoryId::Replicate("Replicate_01_Long".into()));
    }
}
