use std::ops::Range;

/// RGBA8 pixel buffer, row-major, 4 bytes per pixel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Create a zeroed (transparent black) buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Reallocate only when the dimensions change. Contents are unspecified afterwards.
    pub fn ensure_size(&mut self, width: u32, height: u32) {
        if self.width != width || self.height != height {
            *self = Self::new(width, height);
        }
    }

    /// Zero every byte, alpha included.
    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Fill every pixel with one colour.
    pub fn fill(&mut self, rgba: [u8; 4]) {
        for pixel in self.data.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Write an opaque pixel. Out-of-bounds writes are ignored.
    #[inline]
    pub fn put_rgb(&mut self, x: u32, y: u32, rgb: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        self.data[i..i + 3].copy_from_slice(&rgb);
        self.data[i + 3] = 255;
    }

    /// Add `add` to each channel, clamped per channel at `ceiling`, and make the
    /// pixel opaque. Channels already above their ceiling are left as they are.
    /// Out-of-bounds writes are ignored.
    pub fn add_saturating(&mut self, x: u32, y: u32, add: [u8; 3], ceiling: [u8; 3]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = self.offset(x, y);
        for c in 0..3 {
            let current = self.data[i + c];
            if current < ceiling[c] {
                self.data[i + c] = current.saturating_add(add[c]).min(ceiling[c]);
            }
        }
        self.data[i + 3] = 255;
    }

    /// RGBA of one pixel, or `None` outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.offset(x, y);
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    /// Bytes of a half-open row range, clamped to the buffer.
    pub fn row_bytes(&self, rows: Range<u32>) -> &[u8] {
        let start = rows.start.min(self.height);
        let end = rows.end.min(self.height).max(start);
        let stride = self.width as usize * 4;
        &self.data[start as usize * stride..end as usize * stride]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}
