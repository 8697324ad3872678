//! Static palette for chart series and categories. Order is significant: the
//! color hash and the series indexer both address colors by position.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PaletteError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns the color as a CSS hex string, e.g. `#aaaaaa`.
    pub fn to_hex(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Used when an entity has no identity to hash.
pub const NEUTRAL_GRAY: Color = Color::new(170, 170, 170);

/// Used for charts that only ever show one series.
pub const SINGLE_SERIES: Color = Color::new(83, 125, 190);

pub const PALETTE_SIZE: usize = 256;

static STANDARD_COLORS: [Color; PALETTE_SIZE] = [
    Color::new(230, 34, 34),
    Color::new(34, 91, 230),
    Color::new(148, 230, 34),
    Color::new(230, 34, 205),
    Color::new(34, 230, 197),
    Color::new(230, 140, 34),
    Color::new(83, 34, 230),
    Color::new(43, 230, 34),
    Color::new(230, 34, 100),
    Color::new(34, 157, 230),
    Color::new(213, 230, 34),
    Color::new(189, 34, 230),
    Color::new(34, 230, 132),
    Color::new(230, 75, 34),
    Color::new(34, 51, 230),
    Color::new(108, 230, 34),
    Color::new(230, 34, 165),
    Color::new(34, 222, 230),
    Color::new(230, 180, 34),
    Color::new(123, 34, 230),
    Color::new(34, 230, 66),
    Color::new(230, 34, 59),
    Color::new(34, 116, 230),
    Color::new(173, 230, 34),
    Color::new(229, 34, 230),
    Color::new(34, 230, 172),
    Color::new(230, 115, 34),
    Color::new(58, 34, 230),
    Color::new(68, 230, 34),
    Color::new(230, 34, 125),
    Color::new(34, 181, 230),
    Color::new(230, 221, 34),
    Color::new(163, 82, 204),
    Color::new(82, 204, 127),
    Color::new(204, 91, 82),
    Color::new(82, 108, 204),
    Color::new(143, 204, 82),
    Color::new(204, 82, 179),
    Color::new(82, 204, 193),
    Color::new(204, 157, 82),
    Color::new(122, 82, 204),
    Color::new(82, 204, 86),
    Color::new(204, 82, 113),
    Color::new(82, 149, 204),
    Color::new(184, 204, 82),
    Color::new(188, 82, 204),
    Color::new(82, 204, 152),
    Color::new(204, 117, 82),
    Color::new(82, 82, 204),
    Color::new(118, 204, 82),
    Color::new(204, 82, 154),
    Color::new(82, 190, 204),
    Color::new(204, 183, 82),
    Color::new(147, 82, 204),
    Color::new(82, 204, 111),
    Color::new(204, 82, 88),
    Color::new(82, 123, 204),
    Color::new(159, 204, 82),
    Color::new(204, 82, 195),
    Color::new(82, 204, 178),
    Color::new(204, 142, 82),
    Color::new(106, 82, 204),
    Color::new(93, 204, 82),
    Color::new(204, 82, 128),
    Color::new(8, 115, 166),
    Color::new(161, 166, 8),
    Color::new(125, 8, 166),
    Color::new(8, 166, 79),
    Color::new(166, 33, 8),
    Color::new(8, 29, 166),
    Color::new(75, 166, 8),
    Color::new(166, 8, 121),
    Color::new(8, 166, 164),
    Color::new(166, 118, 8),
    Color::new(72, 8, 166),
    Color::new(8, 166, 26),
    Color::new(166, 8, 36),
    Color::new(8, 82, 166),
    Color::new(128, 166, 8),
    Color::new(158, 8, 166),
    Color::new(8, 166, 112),
    Color::new(166, 66, 8),
    Color::new(20, 8, 166),
    Color::new(43, 166, 8),
    Color::new(166, 8, 89),
    Color::new(8, 135, 166),
    Color::new(166, 151, 8),
    Color::new(105, 8, 166),
    Color::new(8, 166, 59),
    Color::new(166, 13, 8),
    Color::new(8, 49, 166),
    Color::new(95, 166, 8),
    Color::new(166, 8, 141),
    Color::new(8, 166, 144),
    Color::new(166, 98, 8),
    Color::new(52, 8, 166),
    Color::new(135, 242, 133),
    Color::new(242, 133, 166),
    Color::new(133, 198, 242),
    Color::new(230, 242, 133),
    Color::new(223, 133, 242),
    Color::new(133, 242, 191),
    Color::new(242, 159, 133),
    Color::new(133, 139, 242),
    Color::new(171, 242, 133),
    Color::new(242, 133, 203),
    Color::new(133, 235, 242),
    Color::new(242, 218, 133),
    Color::new(186, 133, 242),
    Color::new(133, 242, 154),
    Color::new(242, 133, 144),
    Color::new(133, 176, 242),
    Color::new(207, 242, 133),
    Color::new(242, 133, 239),
    Color::new(133, 242, 213),
    Color::new(242, 182, 133),
    Color::new(150, 133, 242),
    Color::new(149, 242, 133),
    Color::new(242, 133, 180),
    Color::new(133, 212, 242),
    Color::new(242, 241, 133),
    Color::new(209, 133, 242),
    Color::new(133, 242, 177),
    Color::new(242, 145, 133),
    Color::new(133, 153, 242),
    Color::new(185, 242, 133),
    Color::new(242, 133, 217),
    Color::new(133, 242, 236),
    Color::new(140, 103, 35),
    Color::new(73, 35, 140),
    Color::new(35, 140, 42),
    Color::new(140, 35, 59),
    Color::new(35, 89, 140),
    Color::new(120, 140, 35),
    Color::new(130, 35, 140),
    Color::new(35, 140, 99),
    Color::new(140, 68, 35),
    Color::new(38, 35, 140),
    Color::new(63, 140, 35),
    Color::new(140, 35, 94),
    Color::new(35, 125, 140),
    Color::new(140, 125, 35),
    Color::new(94, 35, 140),
    Color::new(35, 140, 64),
    Color::new(140, 35, 37),
    Color::new(35, 68, 140),
    Color::new(98, 140, 35),
    Color::new(140, 35, 129),
    Color::new(35, 140, 121),
    Color::new(140, 90, 35),
    Color::new(59, 35, 140),
    Color::new(42, 140, 35),
    Color::new(140, 35, 72),
    Color::new(35, 103, 140),
    Color::new(134, 140, 35),
    Color::new(116, 35, 140),
    Color::new(35, 140, 86),
    Color::new(140, 55, 35),
    Color::new(35, 46, 140),
    Color::new(77, 140, 35),
    Color::new(178, 80, 148),
    Color::new(80, 176, 178),
    Color::new(178, 152, 80),
    Color::new(123, 80, 178),
    Color::new(80, 178, 95),
    Color::new(178, 80, 95),
    Color::new(80, 123, 178),
    Color::new(152, 178, 80),
    Color::new(176, 80, 178),
    Color::new(80, 178, 148),
    Color::new(178, 119, 80),
    Color::new(90, 80, 178),
    Color::new(99, 178, 80),
    Color::new(178, 80, 128),
    Color::new(80, 156, 178),
    Color::new(178, 172, 80),
    Color::new(144, 80, 178),
    Color::new(80, 178, 115),
    Color::new(178, 86, 80),
    Color::new(80, 103, 178),
    Color::new(132, 178, 80),
    Color::new(178, 80, 160),
    Color::new(80, 178, 168),
    Color::new(178, 139, 80),
    Color::new(111, 80, 178),
    Color::new(80, 178, 82),
    Color::new(178, 80, 107),
    Color::new(80, 136, 178),
    Color::new(165, 178, 80),
    Color::new(164, 80, 178),
    Color::new(80, 178, 135),
    Color::new(178, 107, 80),
    Color::new(20, 24, 199),
    Color::new(77, 199, 20),
    Color::new(199, 20, 129),
    Color::new(20, 181, 199),
    Color::new(199, 165, 20),
    Color::new(112, 20, 199),
    Color::new(20, 199, 60),
    Color::new(199, 20, 32),
    Color::new(20, 84, 199),
    Color::new(136, 199, 20),
    Color::new(199, 20, 189),
    Color::new(20, 199, 157),
    Color::new(199, 105, 20),
    Color::new(52, 20, 199),
    Color::new(40, 199, 20),
    Color::new(199, 20, 92),
    Color::new(20, 144, 199),
    Color::new(196, 199, 20),
    Color::new(149, 20, 199),
    Color::new(20, 199, 97),
    Color::new(199, 45, 20),
    Color::new(20, 47, 199),
    Color::new(99, 199, 20),
    Color::new(199, 20, 152),
    Color::new(20, 199, 194),
    Color::new(199, 142, 20),
    Color::new(89, 20, 199),
    Color::new(20, 199, 37),
    Color::new(199, 20, 55),
    Color::new(20, 107, 199),
    Color::new(159, 199, 20),
    Color::new(186, 20, 199),
    Color::new(141, 217, 189),
    Color::new(217, 167, 141),
    Color::new(145, 141, 217),
    Color::new(159, 217, 141),
    Color::new(217, 141, 181),
    Color::new(141, 203, 217),
    Color::new(217, 208, 141),
    Color::new(186, 141, 217),
    Color::new(141, 217, 164),
    Color::new(217, 142, 141),
    Color::new(141, 162, 217),
    Color::new(184, 217, 141),
    Color::new(217, 141, 206),
    Color::new(141, 217, 205),
    Color::new(217, 183, 141),
    Color::new(161, 141, 217),
    Color::new(143, 217, 141),
    Color::new(217, 141, 165),
    Color::new(141, 188, 217),
    Color::new(210, 217, 141),
    Color::new(202, 141, 217),
    Color::new(141, 217, 180),
    Color::new(217, 157, 141),
    Color::new(141, 146, 217),
    Color::new(169, 217, 141),
    Color::new(217, 141, 191),
    Color::new(141, 213, 217),
    Color::new(217, 198, 141),
    Color::new(176, 141, 217),
    Color::new(141, 217, 154),
    Color::new(217, 141, 150),
    Color::new(141, 172, 217),
];

/// Read-only view over an ordered, non-empty list of colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette<'a> {
    colors: &'a [Color],
}

impl Palette<'static> {
    /// The built-in 256 color palette.
    pub const fn standard() -> Self {
        Self {
            colors: &STANDARD_COLORS,
        }
    }
}

impl Default for Palette<'static> {
    fn default() -> Self {
        Self::standard()
    }
}

impl<'a> Palette<'a> {
    pub fn new(colors: &'a [Color]) -> Result<Self, PaletteError> {
        if colors.is_empty() {
            return Err(PaletteError::Empty);
        }
        Ok(Self { colors })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    #[inline]
    pub fn colors(&self) -> &'a [Color] {
        self.colors
    }

    /// Returns the color at `index`, wrapping around the palette.
    #[inline]
    pub fn color_at(&self, index: usize) -> Color {
        self.colors[index % self.colors.len()]
    }
}
