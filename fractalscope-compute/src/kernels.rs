//! Per-pixel kernel dispatch over [`FractalKind`].

use crate::{dynamical, escape_time};
use fractalscope_core::{FractalKind, RenderConfig};

/// The parameters every per-pixel kernel may read, taken from a config snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct KernelParams {
    pub max_iterations: u32,
    pub julia_constant: (f64, f64),
    pub multibrot_power: f64,
}

impl From<&RenderConfig> for KernelParams {
    fn from(config: &RenderConfig) -> Self {
        Self {
            max_iterations: config.max_iterations,
            julia_constant: config.julia_constant,
            multibrot_power: config.multibrot_power,
        }
    }
}

/// Evaluate the interpreted kernel for `kind` at pixel coordinate (cx, cy).
///
/// Returns `None` for kinds without an interpreted per-pixel kernel: the
/// point-cloud and L-system kinds, and the compiled-only maps.
pub fn interpreted_value(kind: FractalKind, cx: f64, cy: f64, params: &KernelParams) -> Option<f64> {
    let max = params.max_iterations;
    let value = match kind {
        FractalKind::Mandelbrot => escape_time::mandelbrot(cx, cy, max),
        FractalKind::Julia => {
            let (c_re, c_im) = params.julia_constant;
            escape_time::julia(cx, cy, c_re, c_im, max)
        }
        FractalKind::BurningShip => escape_time::burning_ship(cx, cy, max),
        FractalKind::Tricorn => escape_time::tricorn(cx, cy, max),
        FractalKind::Multibrot => escape_time::multibrot(cx, cy, max, params.multibrot_power),
        FractalKind::Celtic => escape_time::celtic(cx, cy, max),
        FractalKind::Buffalo => escape_time::buffalo(cx, cy, max),
        FractalKind::PerpendicularBurningShip => {
            escape_time::perpendicular_burning_ship(cx, cy, max)
        }
        FractalKind::Newton => dynamical::newton(cx, cy, max),
        FractalKind::Phoenix => dynamical::phoenix(cx, cy, max),
        FractalKind::Barnsley
        | FractalKind::Sierpinski
        | FractalKind::Koch
        | FractalKind::Magnet1
        | FractalKind::Magnet2
        | FractalKind::Lambda => return None,
    };
    Some(value)
}

/// Value handed to the colour mapper for a raw kernel result.
///
/// Multibrot escapes within a handful of iterations at high powers, so its
/// exterior values are stretched to stay visible.
pub fn color_value(kind: FractalKind, value: f64, max_iterations: u32) -> f64 {
    let max = max_iterations as f64;
    if kind == FractalKind::Multibrot && value < max {
        (12.0 + value * 14.0).min(max - 1.0)
    } else {
        value
    }
}
