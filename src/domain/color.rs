/// Color shading for the bevelled cell look.
///
/// `shade(base, ratio)` moves each channel toward white (`ratio > 100`)
/// or toward black (`ratio <= 100`). Every shape gets a light (150) and
/// dark (50) variant, computed once into a `Palette`.

use std::fmt;
use std::str::FromStr;

use crate::error::ColorError;

use super::cell::Cell;
use super::shape::Shape;

pub const MAX_RATIO: u32 = 200;
pub const LIGHT_RATIO: u32 = 150;
pub const DARK_RATIO: u32 = 50;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Parse `#rrggbb` (or the name `black`).
    pub fn from_hex(s: &str) -> Result<Rgb, ColorError> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("black") {
            return Ok(Rgb::BLACK);
        }
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| ColorError::Malformed(s.to_string()))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| ColorError::BadChannel { input: s.to_string() })
        };
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Rgb::from_hex(s)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Lighten or darken `base`. `ratio` is clamped to `0..=200`; 100 is identity.
pub fn shade(base: Rgb, ratio: u32) -> Rgb {
    let ratio = ratio.min(MAX_RATIO);
    let channel = |c: u8| -> u8 {
        let c = c as u32;
        let v = if ratio > 100 {
            c + (255 - c) * (ratio - 100) / 100
        } else {
            c * ratio / 100
        };
        v as u8
    };
    Rgb::new(channel(base.r), channel(base.g), channel(base.b))
}

/// Base, highlight and shadow colors for one shape.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct Swatch {
    pub base: Rgb,
    pub light: Rgb,
    pub dark: Rgb,
}

impl Swatch {
    pub fn from_base(base: Rgb) -> Self {
        Swatch {
            base,
            light: shade(base, LIGHT_RATIO),
            dark: shade(base, DARK_RATIO),
        }
    }
}

/// Precomputed swatches, indexed by shape id.
#[derive(Clone, Debug)]
pub struct Palette {
    swatches: [Swatch; 8],
}

impl Palette {
    /// Catalog colors, with `overrides` replacing individual base colors.
    pub fn new(overrides: &[(Shape, Rgb)]) -> Self {
        let mut swatches = [Swatch::default(); 8];
        for shape in Shape::PLAYABLE {
            let base = overrides
                .iter()
                .rev()
                .find(|(s, _)| *s == shape)
                .map(|&(_, rgb)| rgb)
                .unwrap_or_else(|| shape.base_color());
            swatches[shape.id() as usize] = Swatch::from_base(base);
        }
        Palette { swatches }
    }

    /// Unknown ids fall back to the empty (black) swatch.
    pub fn swatch(&self, cell: Cell) -> Swatch {
        self.swatches[cell.shape().id() as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(s: &str) -> Rgb {
        Rgb::from_hex(s).unwrap()
    }

    #[test]
    fn parse_and_format() {
        assert_eq!(hex("#ffa500"), Rgb::new(0xff, 0xa5, 0x00));
        assert_eq!(hex("#FFA500").to_string(), "#ffa500");
        assert_eq!(hex("black"), Rgb::BLACK);
        assert_eq!("#0000ff".parse::<Rgb>().unwrap(), Rgb::new(0, 0, 0xff));
    }

    #[test]
    fn parse_rejects_malformed() {
        assert!(matches!(Rgb::from_hex("ff0000"), Err(ColorError::Malformed(_))));
        assert!(matches!(Rgb::from_hex("#ff00"), Err(ColorError::Malformed(_))));
        assert!(matches!(Rgb::from_hex("#gg0000"), Err(ColorError::BadChannel { .. })));
        assert!(matches!(Rgb::from_hex("#ff00é"), Err(ColorError::Malformed(_))));
    }

    #[test]
    fn ratio_100_is_identity() {
        let c = hex("#80a0c0");
        assert_eq!(shade(c, 100), c);
    }

    #[test]
    fn light_and_dark_of_catalog_colors() {
        assert_eq!(shade(hex("#ff0000"), 150).to_string(), "#ff7f7f");
        assert_eq!(shade(hex("#ff0000"), 50).to_string(), "#7f0000");
        assert_eq!(shade(hex("#ffa500"), 150).to_string(), "#ffd27f");
        assert_eq!(shade(hex("#ffa500"), 50).to_string(), "#7f5200");
        assert_eq!(shade(hex("#800080"), 150).to_string(), "#bf7fbf");
    }

    #[test]
    fn extremes_reach_white_and_black() {
        let c = hex("#123456");
        assert_eq!(shade(c, 200), Rgb::new(255, 255, 255));
        assert_eq!(shade(c, 0), Rgb::BLACK);
        // Out of range clamps to 200.
        assert_eq!(shade(c, 999), Rgb::new(255, 255, 255));
    }

    #[test]
    fn palette_empty_cell_is_black() {
        let p = Palette::new(&[]);
        let s = p.swatch(Cell::EMPTY);
        assert_eq!((s.base, s.light, s.dark), (Rgb::BLACK, Rgb::BLACK, Rgb::BLACK));
    }

    #[test]
    fn palette_follows_cell_shape() {
        let p = Palette::new(&[]);
        for shape in Shape::PLAYABLE {
            assert_eq!(p.swatch(Cell::of(shape)), Swatch::from_base(shape.base_color()));
        }
        // Ids outside the catalog paint as empty instead of indexing past the table.
        assert_eq!(p.swatch(Cell::raw(8)), p.swatch(Cell::EMPTY));
        assert_eq!(p.swatch(Cell::raw(255)).base, Rgb::BLACK);
    }

    #[test]
    fn palette_applies_overrides() {
        let p = Palette::new(&[(Shape::O, hex("#000080"))]);
        let o = p.swatch(Cell::of(Shape::O));
        assert_eq!(o.base, hex("#000080"));
        assert_eq!(o.dark, hex("#000040"));
        // Untouched shapes keep catalog colors.
        assert_eq!(p.swatch(Cell::of(Shape::Z)).base, hex("#ff0000"));
    }
}
