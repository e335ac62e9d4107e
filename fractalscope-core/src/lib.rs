pub mod config;
pub mod palette;
pub mod pixel_buffer;
pub mod pixel_rect;
pub mod render_progress;
pub mod status;
pub mod viewport;

pub use config::{
    FractalKind, KernelSignature, ParseKindError, RenderConfig, RenderMode, ViewPreset,
    DEFAULT_JULIA_CONSTANT, DEFAULT_MAX_ITERATIONS, DEFAULT_MULTIBROT_POWER,
};
pub use palette::{map_color, PaletteName, ParsePaletteError, INTERIOR};
pub use pixel_buffer::PixelBuffer;
pub use pixel_rect::{row_bands, PixelRect};
pub use render_progress::RenderProgress;
pub use status::{BackendUsed, RenderStatus};
pub use viewport::{Viewport, ViewportError};
