use serde::{Deserialize, Serialize};

/// Rectangle in pixel space (always u32 coordinates)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Create new pixel rectangle
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Half-open row range `[y, y + height)` covered by this rectangle.
    pub fn rows(&self) -> std::ops::Range<u32> {
        self.y..self.y + self.height
    }
}

/// Split a surface into full-width horizontal bands of `band_height` rows.
///
/// Bands are returned top to bottom; the last band is shorter when
/// `height` is not a multiple of `band_height`.
pub fn row_bands(width: u32, height: u32, band_height: u32) -> Vec<PixelRect> {
    let band_height = band_height.max(1);

    (0..height)
        .step_by(band_height as usize)
        .map(|y_start| PixelRect::new(0, y_start, width, band_height.min(height - y_start)))
        .collect()
}
