use crate::config::ViewPreset;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ViewportError {
    #[error("units per pixel must be positive and finite, got {0}")]
    InvalidScale(f64),

    #[error("zoom factor must be positive and finite, got {0}")]
    InvalidZoomFactor(f64),
}

/// Viewport in the complex plane.
///
/// Maps pixel coordinates on a surface of some size to complex coordinates:
/// - `center_x`, `center_y`: complex coordinate shown at the surface centre
/// - `units_per_pixel`: width of one pixel in complex-plane units
///
/// Pixel y grows downward and maps to growing imaginary parts; there is no
/// axis flip.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawViewport")]
pub struct Viewport {
    pub center_x: f64,
    pub center_y: f64,
    pub units_per_pixel: f64,
}

/// Unchecked wire form; deserialization goes through [`Viewport::new`].
#[derive(Deserialize)]
struct RawViewport {
    center_x: f64,
    center_y: f64,
    units_per_pixel: f64,
}

impl TryFrom<RawViewport> for Viewport {
    type Error = ViewportError;

    fn try_from(raw: RawViewport) -> Result<Self, Self::Error> {
        Viewport::new(raw.center_x, raw.center_y, raw.units_per_pixel)
    }
}

impl Viewport {
    pub fn new(center_x: f64, center_y: f64, units_per_pixel: f64) -> Result<Self, ViewportError> {
        if !(units_per_pixel.is_finite() && units_per_pixel > 0.0) {
            return Err(ViewportError::InvalidScale(units_per_pixel));
        }
        Ok(Self {
            center_x,
            center_y,
            units_per_pixel,
        })
    }

    /// Build the viewport a preset describes for a surface of `surface_width` pixels.
    ///
    /// The preset span covers the full width; a zero width is treated as 1.
    pub fn from_preset(preset: &ViewPreset, surface_width: u32) -> Self {
        Self {
            center_x: preset.center_x,
            center_y: preset.center_y,
            units_per_pixel: preset.span / surface_width.max(1) as f64,
        }
    }

    /// Re-check the scale of a viewport built as a struct literal.
    pub fn validated(self) -> Result<Self, ViewportError> {
        Viewport::new(self.center_x, self.center_y, self.units_per_pixel)
    }

    /// Convert a pixel position to its complex coordinate.
    pub fn pixel_to_complex(&self, px: f64, py: f64, surface: (u32, u32)) -> (f64, f64) {
        let (width, height) = surface;
        (
            self.center_x + (px - width as f64 / 2.0) * self.units_per_pixel,
            self.center_y + (py - height as f64 / 2.0) * self.units_per_pixel,
        )
    }

    /// Convert a complex coordinate to its (fractional) pixel position.
    pub fn complex_to_pixel(&self, re: f64, im: f64, surface: (u32, u32)) -> (f64, f64) {
        let (width, height) = surface;
        (
            (re - self.center_x) / self.units_per_pixel + width as f64 / 2.0,
            (im - self.center_y) / self.units_per_pixel + height as f64 / 2.0,
        )
    }

    /// Zoom by `factor` keeping the complex point under pixel (px, py) fixed.
    ///
    /// `factor > 1` zooms in, `factor < 1` zooms out.
    pub fn zoom_at(
        &mut self,
        px: f64,
        py: f64,
        factor: f64,
        surface: (u32, u32),
    ) -> Result<(), ViewportError> {
        if !(factor.is_finite() && factor > 0.0) {
            return Err(ViewportError::InvalidZoomFactor(factor));
        }
        let (anchor_x, anchor_y) = self.pixel_to_complex(px, py, surface);
        let units_per_pixel = self.units_per_pixel / factor;
        if !(units_per_pixel.is_finite() && units_per_pixel > 0.0) {
            return Err(ViewportError::InvalidScale(units_per_pixel));
        }

        self.center_x = anchor_x + (self.center_x - anchor_x) / factor;
        self.center_y = anchor_y + (self.center_y - anchor_y) / factor;
        self.units_per_pixel = units_per_pixel;
        Ok(())
    }

    /// Shift the view by a dragged pixel delta (content follows the pointer).
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.center_x -= dx * self.units_per_pixel;
        self.center_y -= dy * self.units_per_pixel;
    }

    /// Keep the visible span when the surface width changes.
    ///
    /// A zero width counts as 1, as in [`Viewport::from_preset`], so a
    /// surface that starts (or passes through) zero width keeps its span.
    pub fn rescale_for_width(&mut self, old_width: u32, new_width: u32) {
        self.units_per_pixel *= old_width.max(1) as f64 / new_width.max(1) as f64;
    }

    /// Visible span along the x axis for a surface of `width` pixels.
    pub fn span(&self, width: u32) -> f64 {
        self.units_per_pixel * width as f64
    }
}
