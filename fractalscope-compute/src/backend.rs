//! Compiled backend modules and per-pass kernel resolution.
//!
//! A backend module is a named set of kernels looked up by export name. At the
//! start of every pass the scheduler resolves the active kind to one kernel:
//! the compiled export when the module is loaded, exports it with the right
//! signature and (optionally) agrees with the interpreted kernel on a sample
//! grid; otherwise the interpreted kernel; otherwise nothing.

use crate::kernels::{interpreted_value, KernelParams};
use crate::options::SessionOptions;
use fractalscope_core::{BackendUsed, FractalKind, KernelSignature, Viewport};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;

pub type EscapeKernel = Rc<dyn Fn(f64, f64, u32) -> f64>;
pub type JuliaKernel = Rc<dyn Fn(f64, f64, f64, f64, u32) -> f64>;
pub type PowerKernel = Rc<dyn Fn(f64, f64, u32, f64) -> f64>;

/// Sample grid is `SAMPLE_GRID` × `SAMPLE_GRID` points over the kind's preset view.
pub const SAMPLE_GRID: u32 = 5;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum BackendError {
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("backend has no export for {kind}")]
    MissingExport { kind: FractalKind },

    #[error("backend export for {kind} has the wrong signature")]
    SignatureMismatch { kind: FractalKind },

    #[error("backend export for {kind} disagrees with the interpreted kernel (max error {max_error})")]
    ValidationFailed { kind: FractalKind, max_error: f64 },
}

/// One exported kernel, tagged by argument shape.
#[derive(Clone)]
pub enum Export {
    Escape(EscapeKernel),
    Julia(JuliaKernel),
    Power(PowerKernel),
}

impl Export {
    pub fn escape(f: impl Fn(f64, f64, u32) -> f64 + 'static) -> Self {
        Export::Escape(Rc::new(f))
    }

    pub fn julia(f: impl Fn(f64, f64, f64, f64, u32) -> f64 + 'static) -> Self {
        Export::Julia(Rc::new(f))
    }

    pub fn power(f: impl Fn(f64, f64, u32, f64) -> f64 + 'static) -> Self {
        Export::Power(Rc::new(f))
    }

    pub fn signature(&self) -> KernelSignature {
        match self {
            Export::Escape(_) => KernelSignature::Escape,
            Export::Julia(_) => KernelSignature::Julia,
            Export::Power(_) => KernelSignature::Power,
        }
    }

    /// Call the kernel with the extra arguments its signature takes from `params`.
    pub fn call(&self, cx: f64, cy: f64, params: &KernelParams) -> f64 {
        let max = params.max_iterations;
        match self {
            Export::Escape(f) => f(cx, cy, max),
            Export::Julia(f) => {
                let (c_re, c_im) = params.julia_constant;
                f(cx, cy, c_re, c_im, max)
            }
            Export::Power(f) => f(cx, cy, max, params.multibrot_power),
        }
    }
}

impl fmt::Debug for Export {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Export::{:?}", self.signature())
    }
}

/// A loaded module of compiled kernels.
pub trait BackendModule {
    /// Name reported in the render status.
    fn name(&self) -> &str;

    /// Kernel exported under `name`, if any.
    fn export(&self, name: &str) -> Option<Export>;
}

/// Backend module built from an explicit map of exports.
#[derive(Clone, Debug, Default)]
pub struct ExportTable {
    name: String,
    exports: HashMap<String, Export>,
}

impl ExportTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            exports: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, export: Export) {
        self.exports.insert(name.into(), export);
    }

    pub fn with(mut self, name: impl Into<String>, export: Export) -> Self {
        self.insert(name, export);
        self
    }

    pub fn len(&self) -> usize {
        self.exports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exports.is_empty()
    }
}

impl BackendModule for ExportTable {
    fn name(&self) -> &str {
        &self.name
    }

    fn export(&self, name: &str) -> Option<Export> {
        self.exports.get(name).cloned()
    }
}

/// Load state of the compiled backend.
#[derive(Clone, Default)]
pub enum BackendSlot {
    #[default]
    NotLoaded,
    Loaded(Rc<dyn BackendModule>),
    /// Loading failed; the reason is kept for diagnostics.
    Failed(String),
}

impl fmt::Debug for BackendSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendSlot::NotLoaded => f.write_str("NotLoaded"),
            BackendSlot::Loaded(module) => write!(f, "Loaded({})", module.name()),
            BackendSlot::Failed(reason) => write!(f, "Failed({})", reason),
        }
    }
}

/// Where the kernel of a pass comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KernelSource {
    /// Compiled export of the named module.
    Compiled(String),
    Interpreted,
    /// No implementation for this kind.
    Unavailable,
}

impl From<&KernelSource> for BackendUsed {
    fn from(source: &KernelSource) -> Self {
        match source {
            KernelSource::Compiled(name) => BackendUsed::Compiled(name.clone()),
            KernelSource::Interpreted => BackendUsed::Interpreted,
            KernelSource::Unavailable => BackendUsed::Unavailable,
        }
    }
}

/// The kernel a pass evaluates, fixed at pass start.
#[derive(Clone, Debug)]
pub struct ResolvedKernel {
    kind: FractalKind,
    source: KernelSource,
    export: Option<Export>,
}

impl ResolvedKernel {
    fn compiled(kind: FractalKind, module_name: &str, export: Export) -> Self {
        Self {
            kind,
            source: KernelSource::Compiled(module_name.to_string()),
            export: Some(export),
        }
    }

    fn fallback(kind: FractalKind) -> Self {
        let source = if kind.has_interpreted() {
            KernelSource::Interpreted
        } else {
            KernelSource::Unavailable
        };
        Self {
            kind,
            source,
            export: None,
        }
    }

    pub fn kind(&self) -> FractalKind {
        self.kind
    }

    pub fn source(&self) -> &KernelSource {
        &self.source
    }

    pub fn backend_used(&self) -> BackendUsed {
        BackendUsed::from(&self.source)
    }

    /// Per-pixel value at (cx, cy), or `None` if this kind has no per-pixel kernel.
    #[inline]
    pub fn evaluate(&self, cx: f64, cy: f64, params: &KernelParams) -> Option<f64> {
        match &self.export {
            Some(export) => Some(export.call(cx, cy, params)),
            None => interpreted_value(self.kind, cx, cy, params),
        }
    }
}

/// Points of the sample grid for `kind`, spread over its preset view.
fn sample_points(kind: FractalKind, params: &KernelParams) -> Vec<(f64, f64)> {
    let preset = kind.preset(params.multibrot_power);
    let viewport = Viewport::from_preset(&preset, SAMPLE_GRID);
    let mut points = Vec::with_capacity((SAMPLE_GRID * SAMPLE_GRID) as usize);
    for py in 0..SAMPLE_GRID {
        for px in 0..SAMPLE_GRID {
            points.push(viewport.pixel_to_complex(
                px as f64 + 0.5,
                py as f64 + 0.5,
                (SAMPLE_GRID, SAMPLE_GRID),
            ));
        }
    }
    points
}

/// Check a compiled export against the interpreted kernel (or, for
/// compiled-only kinds, against the valid result range) on the sample grid.
pub fn validate_export(
    kind: FractalKind,
    export: &Export,
    params: &KernelParams,
    tolerance: f64,
) -> Result<(), BackendError> {
    let max = params.max_iterations as f64;
    let mut max_error = 0.0_f64;

    for (cx, cy) in sample_points(kind, params) {
        let compiled = export.call(cx, cy, params);
        if !(0.0..=max).contains(&compiled) {
            return Err(BackendError::ValidationFailed {
                kind,
                max_error: f64::NAN,
            });
        }
        if let Some(expected) = interpreted_value(kind, cx, cy, params) {
            max_error = max_error.max((compiled - expected).abs());
        }
    }

    if max_error > tolerance {
        return Err(BackendError::ValidationFailed { kind, max_error });
    }
    Ok(())
}

fn compiled_export(
    kind: FractalKind,
    module: &dyn BackendModule,
    options: &SessionOptions,
    params: &KernelParams,
) -> Result<Export, BackendError> {
    let export = module
        .export(kind.export_name())
        .ok_or(BackendError::MissingExport { kind })?;

    if Some(export.signature()) != kind.signature() {
        return Err(BackendError::SignatureMismatch { kind });
    }
    if options.validate_compiled {
        validate_export(kind, &export, params, options.validation_tolerance)?;
    }
    Ok(export)
}

/// Pick the kernel for one pass.
///
/// Never fails: every backend problem is logged and turned into a fallback.
pub fn resolve_kernel(
    kind: FractalKind,
    slot: &BackendSlot,
    options: &SessionOptions,
    params: &KernelParams,
) -> ResolvedKernel {
    if kind.signature().is_none() {
        return ResolvedKernel::fallback(kind);
    }

    let module = match slot {
        BackendSlot::Loaded(module) => module,
        BackendSlot::NotLoaded => {
            log::debug!("No backend loaded, {} uses the fallback", kind);
            return ResolvedKernel::fallback(kind);
        }
        BackendSlot::Failed(reason) => {
            log::warn!("{}", BackendError::Unavailable(reason.clone()));
            return ResolvedKernel::fallback(kind);
        }
    };

    match compiled_export(kind, module.as_ref(), options, params) {
        Ok(export) => ResolvedKernel::compiled(kind, module.name(), export),
        Err(err) => {
            log::warn!("{} ({}), falling back", err, module.name());
            ResolvedKernel::fallback(kind)
        }
    }
}
