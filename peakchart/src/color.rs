//! Deterministic string to color assignment.
//!
//! The same key always maps to the same palette entry, across requests and
//! process restarts, so independent charts agree on an entity's color without
//! sharing a cache. Colors already used by siblings in the same enclosing
//! group (e.g. other peptides of one protein) are skipped when they are
//! visually too similar.

use std::collections::HashMap;

use crate::palette::{Color, Palette, NEUTRAL_GRAY};

const HASH_SEED: u32 = 5381;
const HASH_MULTIPLIER: u32 = 1_566_083_941;

/// Channel distance below which two colors are considered indistinguishable.
pub const COLLISION_THRESHOLD: u8 = 30;

/// Two-accumulator string hash over UTF-16 code units, wrapping at 32 bits.
/// Must stay bit-for-bit stable: existing charts depend on it.
pub fn legacy_hash(key: &str) -> u32 {
    let mut even = HASH_SEED;
    let mut odd = HASH_SEED;

    for (position, unit) in key.encode_utf16().enumerate() {
        let acc = if position % 2 == 0 { &mut even } else { &mut odd };
        *acc = (acc.wrapping_shl(5).wrapping_add(*acc)) ^ u32::from(unit);
    }

    even.wrapping_add(odd.wrapping_mul(HASH_MULTIPLIER))
}

/// Folds all four bytes of `hash` together and reduces into `[0, len)`.
pub fn palette_index(hash: u32, len: usize) -> usize {
    assert!(len > 0, "palette length must be non-zero");
    let folded = hash ^ (hash >> 8) ^ (hash >> 16) ^ (hash >> 24);
    (folded as usize) % len
}

/// True when every channel differs by less than [`COLLISION_THRESHOLD`].
pub fn too_close(a: Color, b: Color) -> bool {
    a.r.abs_diff(b.r) < COLLISION_THRESHOLD
        && a.g.abs_diff(b.g) < COLLISION_THRESHOLD
        && a.b.abs_diff(b.b) < COLLISION_THRESHOLD
}

#[derive(Clone, Copy, Debug)]
pub struct ColorAssigner<'a> {
    palette: Palette<'a>,
}

impl Default for ColorAssigner<'static> {
    fn default() -> Self {
        Self::new(Palette::standard())
    }
}

impl<'a> ColorAssigner<'a> {
    pub fn new(palette: Palette<'a>) -> Self {
        Self { palette }
    }

    pub fn palette(&self) -> Palette<'a> {
        self.palette
    }

    /// Returns the color for `key`, avoiding colors too close to `siblings`.
    ///
    /// The search walks forward from the hashed index at most once around the
    /// palette. If every candidate collides, the hashed color is returned.
    /// No search is attempted once the siblings already cover the palette.
    pub fn assign(&self, key: Option<&str>, siblings: &[Color]) -> Color {
        let Some(key) = key else {
            return NEUTRAL_GRAY;
        };

        let len = self.palette.len();
        let start = palette_index(legacy_hash(key), len);
        let original = self.palette.color_at(start);

        if siblings.len() >= len {
            return original;
        }

        let mut index = start;
        for _ in 0..len {
            let candidate = self.palette.color_at(index);
            if !siblings.iter().any(|sibling| too_close(candidate, *sibling)) {
                return candidate;
            }
            index = (index + 1) % len;
        }

        original
    }
}

/// Request-scoped color bookkeeping for one chart.
///
/// Keys are colored in the order they are first seen. Each enclosing group
/// keeps its own sibling list, and a key seen twice returns the memoized
/// color. Dropping the value discards everything.
#[derive(Debug)]
pub struct CategoryColors<'a> {
    assigner: ColorAssigner<'a>,
    assigned: HashMap<(String, String), Color>,
    siblings: HashMap<String, Vec<Color>>,
}

impl<'a> CategoryColors<'a> {
    pub fn new(assigner: ColorAssigner<'a>) -> Self {
        Self {
            assigner,
            assigned: HashMap::new(),
            siblings: HashMap::new(),
        }
    }

    pub fn color_for(&mut self, group: &str, key: &str) -> Color {
        let memo_key = (group.to_string(), key.to_string());
        if let Some(color) = self.assigned.get(&memo_key) {
            return *color;
        }

        let siblings = self.siblings.entry(group.to_string()).or_default();
        let color = self.assigner.assign(Some(key), siblings);
        siblings.push(color);
        self.assigned.insert(memo_key, color);
        color
    }
}
