//! Progressive render scheduler.
//!
//! A [`RenderSession`] owns everything a render reads and writes. The host
//! asks for a render, then calls [`RenderSession::step`] once per display
//! refresh; each step does a bounded amount of work, hands the rows it touched
//! to a [`FrameSink`] and returns. Configuration and viewport are copied when
//! a pass starts, so changes made mid-pass only affect the next pass.

use crate::backend::{resolve_kernel, BackendModule, BackendSlot, KernelSource, ResolvedKernel};
use crate::clock::now_ms;
use crate::ifs::{IfsSampler, IfsSystem};
use crate::kernels::{color_value, KernelParams};
use crate::lsystem::render_koch;
use crate::options::{OverlapPolicy, SessionOptions};
use fractalscope_core::{
    map_color, row_bands, BackendUsed, FractalKind, PixelBuffer, PixelRect, RenderConfig,
    RenderMode, RenderProgress, RenderStatus, Viewport, ViewportError,
};
use std::ops::Range;
use std::rc::Rc;

/// Opaque black, used for kinds with nothing to render them with.
const UNAVAILABLE_FILL: [u8; 4] = [0, 0, 0, 255];

/// Receives the rows of the pixel buffer that a step has finished.
pub trait FrameSink {
    fn commit(&mut self, buffer: &PixelBuffer, rows: Range<u32>);
}

impl<F: FnMut(&PixelBuffer, Range<u32>)> FrameSink for F {
    fn commit(&mut self, buffer: &PixelBuffer, rows: Range<u32>) {
        self(buffer, rows)
    }
}

/// What became of a render request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestOutcome {
    /// A new pass started.
    Started,
    /// A pass is in flight; a fresh one starts when it finishes.
    Deferred,
    /// A pass is in flight and the request was ignored.
    Dropped,
    /// The surface has zero width or height; nothing was done.
    InvalidSurface,
}

/// Result of one scheduling step.
#[derive(Clone, Debug, PartialEq)]
pub enum StepOutcome {
    /// No pass in flight.
    Idle,
    /// The pass needs more steps.
    Continue,
    /// The pass ended with this status. A deferred pass may already be running.
    Finished(RenderStatus),
}

enum PassWork {
    Pixels {
        kernel: ResolvedKernel,
        params: KernelParams,
        bands: Vec<PixelRect>,
        next_band: usize,
    },
    PointCloud {
        sampler: IfsSampler,
    },
    Curve,
    Unavailable,
}

/// State of the pass in flight, fixed when it starts.
struct Pass {
    config: RenderConfig,
    viewport: Viewport,
    surface: (u32, u32),
    backend_used: BackendUsed,
    started_ms: f64,
    work: PassWork,
}

pub struct RenderSession {
    config: RenderConfig,
    viewport: Viewport,
    surface: (u32, u32),
    options: SessionOptions,
    backend: BackendSlot,
    buffer: PixelBuffer,
    pass: Option<Pass>,
    pending: bool,
    progress: RenderProgress,
    status: Option<RenderStatus>,
}

impl RenderSession {
    /// New idle session showing the preset view of `config.kind`.
    pub fn new(config: RenderConfig, width: u32, height: u32, options: SessionOptions) -> Self {
        let viewport = Viewport::from_preset(&config.preset(), width);
        Self {
            config,
            viewport,
            surface: (width, height),
            options,
            backend: BackendSlot::NotLoaded,
            buffer: PixelBuffer::default(),
            pass: None,
            pending: false,
            progress: RenderProgress::default(),
            status: None,
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn backend(&self) -> &BackendSlot {
        &self.backend
    }

    /// Pixel buffer of the current (or last) pass.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    pub fn is_rendering(&self) -> bool {
        self.pass.is_some()
    }

    /// True when a deferred request is waiting for the current pass.
    pub fn has_pending(&self) -> bool {
        self.pending
    }

    pub fn progress(&self) -> RenderProgress {
        self.progress
    }

    /// Status of the pass in flight, or of the last finished pass.
    pub fn status(&self) -> Option<&RenderStatus> {
        self.status.as_ref()
    }

    /// Complex coordinate under a surface pixel, for pointer readouts.
    pub fn pixel_to_complex(&self, px: f64, py: f64) -> (f64, f64) {
        self.viewport.pixel_to_complex(px, py, self.surface)
    }

    /// Ask for a fresh pass over the current state.
    pub fn request_render(&mut self) -> RequestOutcome {
        let (width, height) = self.surface;
        if width == 0 || height == 0 {
            log::debug!("Render request ignored: surface is {}x{}", width, height);
            return RequestOutcome::InvalidSurface;
        }

        if self.pass.is_some() {
            return match self.options.overlap_policy {
                OverlapPolicy::Coalesce => {
                    log::debug!("Render in flight, deferring request");
                    self.pending = true;
                    RequestOutcome::Deferred
                }
                OverlapPolicy::Drop => {
                    log::debug!("Render in flight, dropping request");
                    RequestOutcome::Dropped
                }
            };
        }

        self.start_pass();
        RequestOutcome::Started
    }

    fn start_pass(&mut self) {
        let config = self.config;
        let viewport = self.viewport;
        let surface = self.surface;
        let (width, height) = surface;

        self.buffer.ensure_size(width, height);

        let (work, backend_used, total_steps) = match config.kind.render_mode() {
            RenderMode::EscapeTime | RenderMode::Dynamical => {
                let params = KernelParams::from(&config);
                let kernel = resolve_kernel(config.kind, &self.backend, &self.options, &params);
                let backend_used = kernel.backend_used();
                if *kernel.source() == KernelSource::Unavailable {
                    (PassWork::Unavailable, backend_used, 1)
                } else {
                    let bands = row_bands(width, height, self.options.rows_per_tick);
                    let total = bands.len() as u32;
                    let work = PassWork::Pixels {
                        kernel,
                        params,
                        bands,
                        next_band: 0,
                    };
                    (work, backend_used, total)
                }
            }
            RenderMode::PointCloud => match IfsSystem::from_kind(config.kind) {
                Some(system) => {
                    self.buffer.clear();
                    let sampler = IfsSampler::new(system, config.max_iterations);
                    let total = sampler.total_batches(self.options.ifs_points_per_tick);
                    (
                        PassWork::PointCloud { sampler },
                        BackendUsed::Interpreted,
                        total,
                    )
                }
                None => (PassWork::Unavailable, BackendUsed::Unavailable, 1),
            },
            RenderMode::LSystem => (PassWork::Curve, BackendUsed::Interpreted, 1),
        };

        log::debug!(
            "Starting {} pass: {}x{}, backend {}",
            config.kind,
            width,
            height,
            backend_used
        );

        self.progress = RenderProgress::new(total_steps);
        self.status = Some(RenderStatus::in_flight(config.kind, backend_used.clone()));
        self.pass = Some(Pass {
            config,
            viewport,
            surface,
            backend_used,
            started_ms: now_ms(),
            work,
        });
    }

    /// Do one bounded unit of work on the pass in flight.
    pub fn step(&mut self, sink: &mut dyn FrameSink) -> StepOutcome {
        let Some(pass) = self.pass.as_mut() else {
            return StepOutcome::Idle;
        };
        let (width, height) = pass.surface;

        let (committed, done) = match &mut pass.work {
            PassWork::Pixels {
                kernel,
                params,
                bands,
                next_band,
            } => match bands.get(*next_band) {
                Some(band) => {
                    fill_band(&mut self.buffer, band, kernel, params, &pass.config, &pass.viewport);
                    *next_band += 1;
                    (band.rows(), *next_band >= bands.len())
                }
                None => (0..0, true),
            },
            PassWork::PointCloud { sampler } => {
                sampler.advance(
                    self.options.ifs_points_per_tick,
                    &pass.viewport,
                    &mut self.buffer,
                );
                (0..height, sampler.is_done())
            }
            PassWork::Curve => {
                render_koch(
                    &mut self.buffer,
                    pass.config.max_iterations,
                    pass.config.palette,
                );
                (0..height, true)
            }
            PassWork::Unavailable => {
                self.buffer.fill(UNAVAILABLE_FILL);
                (0..height, true)
            }
        };

        if !committed.is_empty() && width > 0 {
            sink.commit(&self.buffer, committed);
        }
        self.progress.record_step(now_ms() - pass.started_ms);

        if done {
            StepOutcome::Finished(self.finish_pass())
        } else {
            StepOutcome::Continue
        }
    }

    fn finish_pass(&mut self) -> RenderStatus {
        let pass = self.pass.take();
        let (kind, backend_used, started_ms, unavailable) = match pass {
            Some(pass) => (
                pass.config.kind,
                pass.backend_used,
                pass.started_ms,
                matches!(pass.work, PassWork::Unavailable),
            ),
            None => (self.config.kind, BackendUsed::Unavailable, now_ms(), true),
        };

        let elapsed_ms = now_ms() - started_ms;
        let status = RenderStatus {
            kind,
            backend_used,
            elapsed_ms,
            completed: !unavailable,
        };

        self.progress.finish(elapsed_ms);
        if unavailable {
            log::warn!("{}", status);
        } else {
            log::info!("Rendered {} with {} in {:.0} ms", kind, status.backend_used, elapsed_ms);
        }
        self.status = Some(status.clone());

        if self.pending {
            self.pending = false;
            self.request_render();
        }
        status
    }

    /// Step until no pass is in flight, deferred passes included.
    ///
    /// Returns the status of the last pass that finished.
    pub fn run_to_completion(&mut self, sink: &mut dyn FrameSink) -> Option<RenderStatus> {
        let mut last = None;
        loop {
            match self.step(sink) {
                StepOutcome::Idle => return last,
                StepOutcome::Continue => {}
                StepOutcome::Finished(status) => last = Some(status),
            }
        }
    }

    /// Replace the configuration. A new kind (or a new power for Multibrot)
    /// also resets the view to that kind's preset.
    pub fn set_config(&mut self, config: RenderConfig) -> RequestOutcome {
        let kind_changed = config.kind != self.config.kind;
        let power_changed = config.multibrot_power != self.config.multibrot_power
            && config.kind == FractalKind::Multibrot;
        self.config = config;

        if kind_changed || power_changed {
            self.reset_view()
        } else {
            self.request_render()
        }
    }

    /// Replace the view. A viewport with a non-positive or non-finite scale
    /// is rejected and the current view is kept.
    pub fn set_viewport(&mut self, viewport: Viewport) -> Result<RequestOutcome, ViewportError> {
        self.viewport = viewport.validated()?;
        Ok(self.request_render())
    }

    /// Return to the preset view of the configured kind.
    pub fn reset_view(&mut self) -> RequestOutcome {
        self.viewport = Viewport::from_preset(&self.config.preset(), self.surface.0);
        self.request_render()
    }

    /// Zoom about a surface pixel; `factor > 1` zooms in.
    pub fn zoom_at(&mut self, px: f64, py: f64, factor: f64) -> Result<RequestOutcome, ViewportError> {
        self.viewport.zoom_at(px, py, factor, self.surface)?;
        Ok(self.request_render())
    }

    /// Drag the view by a pixel delta.
    pub fn pan(&mut self, dx: f64, dy: f64) -> RequestOutcome {
        self.viewport.pan(dx, dy);
        self.request_render()
    }

    /// Change the surface size, keeping the visible span across a width change.
    pub fn resize(&mut self, width: u32, height: u32) -> RequestOutcome {
        let (old_width, _) = self.surface;
        self.viewport.rescale_for_width(old_width, width);
        self.surface = (width, height);
        self.request_render()
    }

    /// Install a loaded compiled module and re-render with it.
    pub fn attach_backend(&mut self, module: Rc<dyn BackendModule>) -> RequestOutcome {
        log::info!("Backend {} attached", module.name());
        self.backend = BackendSlot::Loaded(module);
        self.request_render()
    }

    /// Record that the compiled module could not be loaded.
    pub fn backend_failed(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        log::warn!("Backend failed to load: {}", reason);
        self.backend = BackendSlot::Failed(reason);
    }
}

fn fill_band(
    buffer: &mut PixelBuffer,
    band: &PixelRect,
    kernel: &ResolvedKernel,
    params: &KernelParams,
    config: &RenderConfig,
    viewport: &Viewport,
) {
    let surface = buffer.size();
    let max = params.max_iterations;
    for py in band.rows() {
        for px in band.x..band.x + band.width {
            let (cx, cy) = viewport.pixel_to_complex(px as f64, py as f64, surface);
            let value = kernel.evaluate(cx, cy, params).unwrap_or(max as f64);
            let rgb = map_color(
                color_value(config.kind, value, max),
                max as f64,
                config.palette,
            );
            buffer.put_rgb(px, py, rgb);
        }
    }
}
