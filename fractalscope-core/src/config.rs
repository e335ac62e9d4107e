//! Fractal kinds, render configuration snapshots and view presets.
//!
//! This module is the canonical source of truth for which fractals exist,
//! how each one is rendered, and where its default view sits. Both the
//! scheduler and the browser host read these tables.

use crate::palette::PaletteName;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default Julia constant, c = -0.8 + 0.156i.
pub const DEFAULT_JULIA_CONSTANT: (f64, f64) = (-0.8, 0.156);

/// Default Multibrot exponent.
pub const DEFAULT_MULTIBROT_POWER: f64 = 5.0;

/// Default iteration cap for a new session.
pub const DEFAULT_MAX_ITERATIONS: u32 = 256;

/// Every fractal the engine knows how to draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FractalKind {
    #[serde(alias = "mandelbrot_classe")]
    Mandelbrot,
    Julia,
    BurningShip,
    Tricorn,
    Multibrot,
    Celtic,
    Buffalo,
    PerpendicularBurningShip,
    Newton,
    Phoenix,
    Barnsley,
    Sierpinski,
    Koch,
    Magnet1,
    Magnet2,
    #[serde(alias = "lambda_fractale")]
    Lambda,
}

/// How a kind fills the pixel buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RenderMode {
    /// Per-pixel escape count, band by band.
    EscapeTime,
    /// Per-pixel count from a dynamical map (root finding, feedback maps), band by band.
    Dynamical,
    /// Random orbit of an iterated function system, accumulated point by point.
    PointCloud,
    /// Turtle-drawn string rewriting curve, one shot.
    LSystem,
}

/// Argument shape of a per-pixel kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelSignature {
    /// `(cx, cy, max_iter)`
    Escape,
    /// `(zx, zy, c_re, c_im, max_iter)`
    Julia,
    /// `(cx, cy, max_iter, power)`
    Power,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown fractal kind: {0}")]
pub struct ParseKindError(pub String);

impl FractalKind {
    pub const ALL: [FractalKind; 16] = [
        FractalKind::Mandelbrot,
        FractalKind::Julia,
        FractalKind::BurningShip,
        FractalKind::Tricorn,
        FractalKind::Multibrot,
        FractalKind::Celtic,
        FractalKind::Buffalo,
        FractalKind::PerpendicularBurningShip,
        FractalKind::Newton,
        FractalKind::Phoenix,
        FractalKind::Barnsley,
        FractalKind::Sierpinski,
        FractalKind::Koch,
        FractalKind::Magnet1,
        FractalKind::Magnet2,
        FractalKind::Lambda,
    ];

    /// Identifier used for backend export names and serialized configs.
    pub fn id(self) -> &'static str {
        match self {
            FractalKind::Mandelbrot => "mandelbrot",
            FractalKind::Julia => "julia",
            FractalKind::BurningShip => "burning_ship",
            FractalKind::Tricorn => "tricorn",
            FractalKind::Multibrot => "multibrot",
            FractalKind::Celtic => "celtic",
            FractalKind::Buffalo => "buffalo",
            FractalKind::PerpendicularBurningShip => "perpendicular_burning_ship",
            FractalKind::Newton => "newton",
            FractalKind::Phoenix => "phoenix",
            FractalKind::Barnsley => "barnsley",
            FractalKind::Sierpinski => "sierpinski",
            FractalKind::Koch => "koch",
            FractalKind::Magnet1 => "magnet1",
            FractalKind::Magnet2 => "magnet2",
            FractalKind::Lambda => "lambda",
        }
    }

    /// Human-readable name for UI display
    pub fn display_name(self) -> &'static str {
        match self {
            FractalKind::Mandelbrot => "Mandelbrot Set",
            FractalKind::Julia => "Julia Set",
            FractalKind::BurningShip => "Burning Ship",
            FractalKind::Tricorn => "Tricorn",
            FractalKind::Multibrot => "Multibrot",
            FractalKind::Celtic => "Celtic",
            FractalKind::Buffalo => "Buffalo",
            FractalKind::PerpendicularBurningShip => "Perpendicular Burning Ship",
            FractalKind::Newton => "Newton (z³ − 1)",
            FractalKind::Phoenix => "Phoenix",
            FractalKind::Barnsley => "Barnsley Fern",
            FractalKind::Sierpinski => "Sierpinski Triangle",
            FractalKind::Koch => "Koch Curve",
            FractalKind::Magnet1 => "Magnet I",
            FractalKind::Magnet2 => "Magnet II",
            FractalKind::Lambda => "Lambda",
        }
    }

    pub fn render_mode(self) -> RenderMode {
        match self {
            FractalKind::Newton
            | FractalKind::Phoenix
            | FractalKind::Magnet1
            | FractalKind::Magnet2
            | FractalKind::Lambda => RenderMode::Dynamical,
            FractalKind::Barnsley | FractalKind::Sierpinski => RenderMode::PointCloud,
            FractalKind::Koch => RenderMode::LSystem,
            _ => RenderMode::EscapeTime,
        }
    }

    /// Kernel argument shape, or `None` for kinds without a per-pixel kernel.
    pub fn signature(self) -> Option<KernelSignature> {
        match self.render_mode() {
            RenderMode::PointCloud | RenderMode::LSystem => None,
            _ => Some(match self {
                FractalKind::Julia => KernelSignature::Julia,
                FractalKind::Multibrot => KernelSignature::Power,
                _ => KernelSignature::Escape,
            }),
        }
    }

    /// Whether the engine carries its own (interpreted) implementation.
    ///
    /// The magnet and lambda maps exist only in the compiled module.
    pub fn has_interpreted(self) -> bool {
        !matches!(
            self,
            FractalKind::Magnet1 | FractalKind::Magnet2 | FractalKind::Lambda
        )
    }

    /// Backend export name. Matches [`FractalKind::id`] except for lambda.
    pub fn export_name(self) -> &'static str {
        match self {
            FractalKind::Lambda => "lambda_fractale",
            other => other.id(),
        }
    }

    /// Default view for this kind.
    ///
    /// Multibrot depends on the configured power; higher powers concentrate
    /// detail near the origin.
    pub fn preset(self, multibrot_power: f64) -> ViewPreset {
        match self {
            FractalKind::Mandelbrot | FractalKind::Tricorn => ViewPreset::new(-0.5, 0.0, 3.5),
            FractalKind::Julia | FractalKind::Newton => ViewPreset::new(0.0, 0.0, 3.0),
            FractalKind::BurningShip => ViewPreset::new(-0.5, -0.5, 3.0),
            FractalKind::Multibrot => multibrot_preset(multibrot_power),
            FractalKind::Celtic | FractalKind::Buffalo | FractalKind::Phoenix => {
                ViewPreset::new(-0.5, 0.0, 3.2)
            }
            FractalKind::PerpendicularBurningShip => ViewPreset::new(-0.5, -0.4, 3.0),
            FractalKind::Barnsley => ViewPreset::new(0.0, 5.0, 9.0),
            FractalKind::Sierpinski => ViewPreset::new(0.5, 0.35, 1.0),
            FractalKind::Koch => ViewPreset::new(0.45, -0.28, 0.9),
            FractalKind::Magnet1 => ViewPreset::new(1.5, 0.0, 4.0),
            FractalKind::Magnet2 => ViewPreset::new(1.5, 0.0, 5.0),
            FractalKind::Lambda => ViewPreset::new(0.0, 0.0, 8.0),
        }
    }
}

fn multibrot_preset(power: f64) -> ViewPreset {
    let power = if power.is_finite() {
        power
    } else {
        DEFAULT_MULTIBROT_POWER
    };
    let span = if power >= 7.0 {
        1.6
    } else if power >= 5.0 {
        1.8
    } else {
        2.2
    };
    ViewPreset::new(0.0, 0.0, span)
}

impl fmt::Display for FractalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FractalKind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "mandelbrot_classe" => return Ok(FractalKind::Mandelbrot),
            "lambda_fractale" => return Ok(FractalKind::Lambda),
            _ => {}
        }
        FractalKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.id() == s)
            .ok_or_else(|| ParseKindError(s.to_string()))
    }
}

/// Default centre and horizontal span for a fractal kind.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewPreset {
    pub center_x: f64,
    pub center_y: f64,
    /// Complex-plane width covered by the whole surface.
    pub span: f64,
}

impl ViewPreset {
    pub const fn new(center_x: f64, center_y: f64, span: f64) -> Self {
        Self {
            center_x,
            center_y,
            span,
        }
    }
}

/// Immutable snapshot of everything a render pass reads besides the viewport.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub kind: FractalKind,
    pub max_iterations: u32,
    pub palette: PaletteName,
    pub julia_constant: (f64, f64),
    pub multibrot_power: f64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            kind: FractalKind::Mandelbrot,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            palette: PaletteName::Aurora,
            julia_constant: DEFAULT_JULIA_CONSTANT,
            multibrot_power: DEFAULT_MULTIBROT_POWER,
        }
    }
}

impl RenderConfig {
    pub fn new(kind: FractalKind, max_iterations: u32, palette: PaletteName) -> Self {
        Self {
            kind,
            max_iterations,
            palette,
            ..Self::default()
        }
    }

    pub fn with_julia_constant(mut self, re: f64, im: f64) -> Self {
        self.julia_constant = (re, im);
        self
    }

    pub fn with_multibrot_power(mut self, power: f64) -> Self {
        self.multibrot_power = power;
        self
    }

    /// Default view for the configured kind.
    pub fn preset(&self) -> ViewPreset {
        self.kind.preset(self.multibrot_power)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_through_from_str() {
        for kind in FractalKind::ALL {
            assert_eq!(kind.id().parse::<FractalKind>(), Ok(kind));
        }
    }

    #[test]
    fn from_str_accepts_lambda_export_name() {
        assert_eq!("lambda_fractale".parse(), Ok(FractalKind::Lambda));
    }

    #[test]
    fn from_str_accepts_mandelbrot_class_name() {
        assert_eq!("mandelbrot_classe".parse(), Ok(FractalKind::Mandelbrot));
    }

    #[test]
    fn config_accepts_kind_aliases() {
        let config: RenderConfig = serde_json::from_str(r#"{"kind":"mandelbrot_classe"}"#).unwrap();
        assert_eq!(config.kind, FractalKind::Mandelbrot);

        let config: RenderConfig = serde_json::from_str(r#"{"kind":"lambda_fractale"}"#).unwrap();
        assert_eq!(config.kind, FractalKind::Lambda);
    }

    #[test]
    fn from_str_rejects_unknown() {
        let err = "mandelbulb".parse::<FractalKind>().unwrap_err();
        assert_eq!(err, ParseKindError("mandelbulb".to_string()));
        assert_eq!(err.to_string(), "unknown fractal kind: mandelbulb");
    }

    #[test]
    fn render_modes() {
        assert_eq!(FractalKind::Mandelbrot.render_mode(), RenderMode::EscapeTime);
        assert_eq!(FractalKind::Newton.render_mode(), RenderMode::Dynamical);
        assert_eq!(FractalKind::Barnsley.render_mode(), RenderMode::PointCloud);
        assert_eq!(FractalKind::Koch.render_mode(), RenderMode::LSystem);
    }

    #[test]
    fn signatures_follow_extra_parameters() {
        assert_eq!(FractalKind::Julia.signature(), Some(KernelSignature::Julia));
        assert_eq!(FractalKind::Multibrot.signature(), Some(KernelSignature::Power));
        assert_eq!(FractalKind::Phoenix.signature(), Some(KernelSignature::Escape));
        assert_eq!(FractalKind::Sierpinski.signature(), None);
        assert_eq!(FractalKind::Koch.signature(), None);
    }

    #[test]
    fn backend_only_kinds() {
        let backend_only: Vec<_> = FractalKind::ALL
            .iter()
            .filter(|k| !k.has_interpreted())
            .copied()
            .collect();
        assert_eq!(
            backend_only,
            vec![FractalKind::Magnet1, FractalKind::Magnet2, FractalKind::Lambda]
        );
    }

    #[test]
    fn multibrot_preset_tracks_power() {
        assert_eq!(FractalKind::Multibrot.preset(8.0).span, 1.6);
        assert_eq!(FractalKind::Multibrot.preset(5.0).span, 1.8);
        assert_eq!(FractalKind::Multibrot.preset(3.0).span, 2.2);
        assert_eq!(FractalKind::Multibrot.preset(f64::NAN).span, 1.8);
    }

    #[test]
    fn mandelbrot_preset_values() {
        let preset = FractalKind::Mandelbrot.preset(DEFAULT_MULTIBROT_POWER);
        assert_eq!(preset, ViewPreset::new(-0.5, 0.0, 3.5));
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{"kind":"burning_ship","max_iterations":512}"#).unwrap();

        assert_eq!(config.kind, FractalKind::BurningShip);
        assert_eq!(config.max_iterations, 512);
        assert_eq!(config.palette, PaletteName::Aurora);
        assert_eq!(config.julia_constant, DEFAULT_JULIA_CONSTANT);
    }

    #[test]
    fn config_serialization_roundtrip() {
        let original = RenderConfig::new(FractalKind::Julia, 300, PaletteName::Ocean)
            .with_julia_constant(0.285, 0.01);

        let json = serde_json::to_string(&original).unwrap();
        assert!(json.contains(r#""kind":"julia""#));
        let restored: RenderConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, original);
    }
}
