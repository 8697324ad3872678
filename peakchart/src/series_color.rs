use serde::{Deserialize, Serialize};

use crate::category::SeriesKey;
use crate::palette::{Color, Palette, SINGLE_SERIES};

/// Isotope label layout of the document the series come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeriesColorOptions {
    /// Id of the light (base) isotope label.
    pub light_label_id: i64,
    /// Number of isotope labels defined in the document.
    pub label_count: u32,
    /// Overrides the minimum observed charge.
    pub min_charge: Option<u32>,
}

impl Default for SeriesColorOptions {
    fn default() -> Self {
        Self {
            light_label_id: 0,
            label_count: 1,
            min_charge: None,
        }
    }
}

/// Maps (charge, isotope label) series onto palette positions so that the
/// same precursor charge and label get the same color across charts.
#[derive(Clone, Copy, Debug)]
pub struct SeriesColorIndexer<'a> {
    palette: Palette<'a>,
    options: SeriesColorOptions,
}

impl<'a> SeriesColorIndexer<'a> {
    pub fn new(palette: Palette<'a>, options: SeriesColorOptions) -> Self {
        Self { palette, options }
    }

    pub fn index(&self, key: &SeriesKey, min_charge: u32) -> usize {
        let label_count = i64::from(self.options.label_count.max(1));
        let charge_offset = i64::from(key.charge) - i64::from(min_charge);
        let label_offset = key.isotope_label_id - self.options.light_label_id;
        let raw = charge_offset * label_count + label_offset;
        raw.rem_euclid(self.palette.len() as i64) as usize
    }

    /// Colors for `keys`, in the order given.
    pub fn colors(&self, keys: &[SeriesKey]) -> Vec<Color> {
        if keys.len() == 1 {
            return vec![SINGLE_SERIES];
        }

        let observed_min = keys.iter().map(|key| key.charge).min().unwrap_or(0);
        let min_charge = self.options.min_charge.unwrap_or(observed_min);

        keys.iter()
            .map(|key| self.palette.color_at(self.index(key, min_charge)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::IsotopeLabel;

    fn key(charge: u32, label_id: i64) -> SeriesKey {
        SeriesKey::new(
            charge,
            &IsotopeLabel {
                id: label_id,
                name: format!("label-{label_id}"),
            },
        )
    }

    fn indexer(light_label_id: i64, label_count: u32) -> SeriesColorIndexer<'static> {
        SeriesColorIndexer::new(
            Palette::standard(),
            SeriesColorOptions {
                light_label_id,
                label_count,
                min_charge: None,
            },
        )
    }

    #[test]
    fn index_interleaves_labels_within_charge() {
        let indexer = indexer(1, 2);
        assert_eq!(indexer.index(&key(2, 1), 2), 0);
        assert_eq!(indexer.index(&key(2, 2), 2), 1);
        assert_eq!(indexer.index(&key(3, 1), 2), 2);
        assert_eq!(indexer.index(&key(3, 2), 2), 3);
    }

    #[test]
    fn index_wraps_negative_offsets() {
        let indexer = indexer(5, 1);
        assert_eq!(indexer.index(&key(2, 4), 2), Palette::standard().len() - 1);
    }

    #[test]
    fn colors_use_observed_minimum_charge() {
        let indexer = indexer(1, 2);
        let palette = Palette::standard();
        let colors = indexer.colors(&[key(3, 1), key(4, 2)]);
        assert_eq!(colors, vec![palette.color_at(0), palette.color_at(3)]);
    }

    #[test]
    fn min_charge_override_shifts_indices() {
        let palette = Palette::standard();
        let indexer = SeriesColorIndexer::new(
            palette,
            SeriesColorOptions {
                light_label_id: 1,
                label_count: 1,
                min_charge: Some(1),
            },
        );
        let colors = indexer.colors(&[key(2, 1), key(3, 1)]);
        assert_eq!(colors, vec![palette.color_at(1), palette.color_at(2)]);
    }

    #[test]
    fn single_series_uses_fixed_color() {
        let indexer = indexer(1, 2);
        assert_eq!(indexer.colors(&[key(2, 2)]), vec![SINGLE_SERIES]);
        assert!(indexer.colors(&[]).is_empty());
    }
}
