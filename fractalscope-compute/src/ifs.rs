//! Iterated function system point clouds (Barnsley fern, Sierpinski triangle).
//!
//! A sampler walks a single random orbit through the system's affine maps and
//! accumulates every post burn-in point into the pixel buffer additively. The
//! orbit is driven by a seeded [`Xorshift32`], so the same kind and iteration
//! cap always plot the same points.

use fractalscope_core::{FractalKind, PixelBuffer, Viewport};

/// Minimum number of points plotted per pass.
pub const MIN_POINTS: u64 = 30_000;

/// Points plotted per unit of iteration cap.
pub const POINTS_PER_ITERATION: u64 = 900;

const SEED_BASE: u32 = 0x9e37_79b9;

/// Marsaglia xorshift32 generator (shifts 13, 17, 5).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Xorshift32 {
    state: u32,
}

impl Xorshift32 {
    /// A zero seed would stay zero forever and is replaced by 1.
    pub fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut s = self.state;
        s ^= s << 13;
        s ^= s >> 17;
        s ^= s << 5;
        self.state = s;
        s
    }

    /// Uniform value in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        self.next_u32() as f64 / 4_294_967_296.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IfsSystem {
    Barnsley,
    Sierpinski,
}

impl IfsSystem {
    pub fn from_kind(kind: FractalKind) -> Option<Self> {
        match kind {
            FractalKind::Barnsley => Some(IfsSystem::Barnsley),
            FractalKind::Sierpinski => Some(IfsSystem::Sierpinski),
            _ => None,
        }
    }

    pub fn kind(self) -> FractalKind {
        match self {
            IfsSystem::Barnsley => FractalKind::Barnsley,
            IfsSystem::Sierpinski => FractalKind::Sierpinski,
        }
    }

    /// Orbit steps discarded before plotting.
    pub fn burn_in(self) -> u32 {
        match self {
            IfsSystem::Barnsley => 80,
            IfsSystem::Sierpinski => 40,
        }
    }

    /// Per-hit channel increment and per-channel ceiling.
    pub fn tint(self) -> ([u8; 3], [u8; 3]) {
        match self {
            IfsSystem::Barnsley => ([3, 24, 4], [120, 255, 140]),
            IfsSystem::Sierpinski => ([10, 16, 24], [160, 230, 255]),
        }
    }

    /// Apply the affine map selected by `r` in [0, 1).
    pub fn step(self, x: f64, y: f64, r: f64) -> (f64, f64) {
        match self {
            IfsSystem::Barnsley => {
                if r < 0.01 {
                    (0.0, 0.16 * y)
                } else if r < 0.86 {
                    (0.85 * x + 0.04 * y, -0.04 * x + 0.85 * y + 1.6)
                } else if r < 0.93 {
                    (0.2 * x - 0.26 * y, 0.23 * x + 0.22 * y + 1.6)
                } else {
                    (-0.15 * x + 0.28 * y, 0.26 * x + 0.24 * y + 0.44)
                }
            }
            IfsSystem::Sierpinski => {
                if r < 1.0 / 3.0 {
                    (0.5 * x, 0.5 * y)
                } else if r < 2.0 / 3.0 {
                    (0.5 * x + 0.5, 0.5 * y)
                } else {
                    (0.5 * x + 0.25, 0.5 * y + 0.433_012_701_89)
                }
            }
        }
    }

    /// Generator seed for a pass at the given iteration cap.
    pub fn seed(self, max_iterations: u32) -> u32 {
        SEED_BASE ^ (max_iterations << 7) ^ self.kind().id().len() as u32
    }
}

/// Total points plotted for a pass at the given iteration cap.
pub fn point_target(max_iterations: u32) -> u64 {
    MIN_POINTS.max(max_iterations as u64 * POINTS_PER_ITERATION)
}

/// Orbit state of one IFS pass.
#[derive(Clone, Debug)]
pub struct IfsSampler {
    system: IfsSystem,
    rng: Xorshift32,
    x: f64,
    y: f64,
    burn_in_left: u32,
    emitted: u64,
    target: u64,
}

impl IfsSampler {
    pub fn new(system: IfsSystem, max_iterations: u32) -> Self {
        Self {
            system,
            rng: Xorshift32::new(system.seed(max_iterations)),
            x: 0.0,
            y: 0.0,
            burn_in_left: system.burn_in(),
            emitted: 0,
            target: point_target(max_iterations),
        }
    }

    pub fn system(&self) -> IfsSystem {
        self.system
    }

    /// Points emitted so far, in bounds or not.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn target(&self) -> u64 {
        self.target
    }

    pub fn is_done(&self) -> bool {
        self.emitted >= self.target
    }

    /// Number of `batch`-sized advances needed to finish the pass.
    pub fn total_batches(&self, batch: u32) -> u32 {
        let batch = batch.max(1) as u64;
        self.target.div_ceil(batch).min(u32::MAX as u64) as u32
    }

    fn next_point(&mut self) -> (f64, f64) {
        let r = self.rng.next_f64();
        let (x, y) = self.system.step(self.x, self.y, r);
        self.x = x;
        self.y = y;
        (x, y)
    }

    /// Emit up to `batch` points, projecting each through `viewport` and
    /// blending the in-bounds ones into `buffer`. Pending burn-in steps run
    /// first and do not count against the batch.
    ///
    /// Returns the number of points emitted by this call.
    pub fn advance(&mut self, batch: u32, viewport: &Viewport, buffer: &mut PixelBuffer) -> u32 {
        while self.burn_in_left > 0 {
            self.next_point();
            self.burn_in_left -= 1;
        }

        let size = buffer.size();
        let (add, ceiling) = self.system.tint();
        let end = (self.emitted + batch as u64).min(self.target);
        let count = (end - self.emitted) as u32;

        while self.emitted < end {
            let (x, y) = self.next_point();
            let (px, py) = viewport.complex_to_pixel(x, y, size);
            let (px, py) = (px.floor(), py.floor());
            if px >= 0.0 && py >= 0.0 && px < size.0 as f64 && py < size.1 as f64 {
                buffer.add_saturating(px as u32, py as u32, add, ceiling);
            }
            self.emitted += 1;
        }
        count
    }

    /// The points `advance` would emit, without touching a buffer.
    ///
    /// Consumes the sampler's remaining budget.
    pub fn drain_points(&mut self) -> Vec<(f64, f64)> {
        while self.burn_in_left > 0 {
            self.next_point();
            self.burn_in_left -= 1;
        }
        let mut points = Vec::with_capacity((self.target - self.emitted) as usize);
        while self.emitted < self.target {
            points.push(self.next_point());
            self.emitted += 1;
        }
        points
    }
}
