pub mod backend;
pub mod clock;
pub mod complex;
pub mod dynamical;
pub mod escape_time;
pub mod ifs;
pub mod kernels;
pub mod lsystem;
pub mod native;
pub mod options;
pub mod scheduler;
pub mod wasm;

pub use backend::{
    resolve_kernel, validate_export, BackendError, BackendModule, BackendSlot, Export,
    ExportTable, KernelSource, ResolvedKernel,
};
pub use ifs::{IfsSampler, IfsSystem, Xorshift32};
pub use kernels::{color_value, interpreted_value, KernelParams};
pub use lsystem::{draw_polyline, koch_depth, koch_generate, koch_polyline, render_koch};
pub use native::NativeModule;
pub use options::{OptionsError, OverlapPolicy, SessionOptions};
pub use scheduler::{FrameSink, RenderSession, RequestOutcome, StepOutcome};

// Re-export core types for convenience
pub use fractalscope_core::*;
