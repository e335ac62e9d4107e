//! Fixed colour palettes and the escape-value colour mapper.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Colour used for points that never escaped.
pub const INTERIOR: [u8; 3] = [0, 0, 0];

/// Named palettes. Each is an ordered list of RGB stops.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteName {
    /// Black, red, orange, yellow, white.
    #[serde(alias = "feu")]
    Fire,
    /// Black, deep blue, blue, cyan, white.
    Ocean,
    /// Black, green, indigo, violet, pink.
    Aurora,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown palette: {0}")]
pub struct ParsePaletteError(pub String);

const FIRE_STOPS: [[u8; 3]; 8] = [
    [0, 0, 0],
    [90, 0, 0],
    [180, 0, 0],
    [255, 60, 0],
    [255, 150, 0],
    [255, 220, 30],
    [255, 255, 160],
    [255, 255, 255],
];

const OCEAN_STOPS: [[u8; 3]; 8] = [
    [0, 0, 0],
    [0, 0, 40],
    [0, 20, 100],
    [0, 80, 180],
    [0, 160, 220],
    [40, 210, 240],
    [160, 240, 255],
    [255, 255, 255],
];

const AURORA_STOPS: [[u8; 3]; 8] = [
    [0, 0, 0],
    [0, 15, 20],
    [0, 80, 60],
    [0, 180, 90],
    [50, 120, 210],
    [157, 78, 221],
    [220, 100, 200],
    [255, 200, 240],
];

impl PaletteName {
    pub const ALL: [PaletteName; 3] = [PaletteName::Fire, PaletteName::Ocean, PaletteName::Aurora];

    pub fn id(self) -> &'static str {
        match self {
            PaletteName::Fire => "fire",
            PaletteName::Ocean => "ocean",
            PaletteName::Aurora => "aurora",
        }
    }

    /// RGB stops, at least two, never mutated.
    pub fn stops(self) -> &'static [[u8; 3]] {
        match self {
            PaletteName::Fire => &FIRE_STOPS,
            PaletteName::Ocean => &OCEAN_STOPS,
            PaletteName::Aurora => &AURORA_STOPS,
        }
    }
}

impl fmt::Display for PaletteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for PaletteName {
    type Err = ParsePaletteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fire" | "feu" => Ok(PaletteName::Fire),
            "ocean" => Ok(PaletteName::Ocean),
            "aurora" => Ok(PaletteName::Aurora),
            _ => Err(ParsePaletteError(s.to_string())),
        }
    }
}

/// Map an escape value to an RGB colour.
///
/// Values at or above `max` are interior and map to black. Below that the
/// value is normalised with `t = sqrt(v / max)`, which spends most of the
/// palette on low iteration counts, then linearly interpolated between the
/// two bracketing stops.
pub fn map_color(value: f64, max: f64, palette: PaletteName) -> [u8; 3] {
    if value.is_nan() || value >= max {
        return INTERIOR;
    }
    let stops = palette.stops();
    let t = (value.max(0.0) / max).sqrt();
    let scaled = t * (stops.len() - 1) as f64;
    let lo = (scaled.floor() as usize).min(stops.len() - 1);
    let hi = (lo + 1).min(stops.len() - 1);
    let frac = scaled - lo as f64;

    let c0 = stops[lo];
    let c1 = stops[hi];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac) as u8;

    [lerp(c0[0], c1[0]), lerp(c0[1], c1[1]), lerp(c0[2], c1[2])]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interior_is_black_for_every_palette() {
        for palette in PaletteName::ALL {
            assert_eq!(map_color(256.0, 256.0, palette), INTERIOR);
            assert_eq!(map_color(300.0, 256.0, palette), INTERIOR);
        }
    }

    #[test]
    fn nan_value_is_treated_as_interior() {
        assert_eq!(map_color(f64::NAN, 100.0, PaletteName::Fire), INTERIOR);
    }

    #[test]
    fn zero_maps_to_first_stop() {
        for palette in PaletteName::ALL {
            assert_eq!(map_color(0.0, 100.0, palette), palette.stops()[0]);
        }
    }

    #[test]
    fn exact_stop_positions_hit_stops() {
        // t = sqrt(v / max); t * 7 == 1 when v / max == 1 / 49
        let colour = map_color(1.0, 49.0, PaletteName::Ocean);
        assert_eq!(colour, OCEAN_STOPS[1]);

        let colour = map_color(4.0, 49.0, PaletteName::Aurora);
        assert_eq!(colour, AURORA_STOPS[2]);
    }

    #[test]
    fn interpolates_between_stops() {
        // t * 7 == 0.5 -> halfway between stop 0 and stop 1
        let v = 0.25 / 49.0 * 100.0;
        let colour = map_color(v, 100.0, PaletteName::Fire);
        assert_eq!(colour, [45, 0, 0]);
    }

    #[test]
    fn near_max_approaches_last_stop() {
        let colour = map_color(99.999, 100.0, PaletteName::Fire);
        assert_eq!(colour[0], 255);
        assert_eq!(colour[1], 255);
        assert!(colour[2] >= 254);
    }

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("feu".parse(), Ok(PaletteName::Fire));
        assert_eq!("fire".parse(), Ok(PaletteName::Fire));
        assert_eq!("aurora".parse(), Ok(PaletteName::Aurora));
        assert!("plasma".parse::<PaletteName>().is_err());
    }

    #[test]
    fn serde_accepts_feu_alias() {
        let palette: PaletteName = serde_json::from_str(r#""feu""#).unwrap();
        assert_eq!(palette, PaletteName::Fire);
        assert_eq!(serde_json::to_string(&palette).unwrap(), r#""fire""#);
    }
}
