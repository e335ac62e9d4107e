//! Browser surface: the compiled kernels as plain exports, and a session
//! handle a page drives from its animation-frame loop.

use crate::backend::{Export, ExportTable};
use crate::native::{self, NativeModule};
use crate::options::SessionOptions;
use crate::scheduler::{RenderSession, RequestOutcome, StepOutcome};
use crate::{dynamical, escape_time};
use fractalscope_core::{FractalKind, KernelSignature, PixelBuffer, RenderConfig};
use std::ops::Range;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Install the panic hook and the console logger. Safe to call more than once.
#[wasm_bindgen]
pub fn init() {
    console_error_panic_hook::set_once();
    // Err only means a logger is already installed.
    let _ = console_log::init_with_level(log::Level::Debug);
}

#[wasm_bindgen]
pub fn mandelbrot(cx: f64, cy: f64, max_iter: u32) -> f64 {
    escape_time::mandelbrot(cx, cy, max_iter)
}

#[wasm_bindgen]
pub fn julia(zx: f64, zy: f64, c_re: f64, c_im: f64, max_iter: u32) -> f64 {
    escape_time::julia(zx, zy, c_re, c_im, max_iter)
}

#[wasm_bindgen]
pub fn burning_ship(cx: f64, cy: f64, max_iter: u32) -> f64 {
    escape_time::burning_ship(cx, cy, max_iter)
}

#[wasm_bindgen]
pub fn tricorn(cx: f64, cy: f64, max_iter: u32) -> f64 {
    escape_time::tricorn(cx, cy, max_iter)
}

#[wasm_bindgen]
pub fn multibrot(cx: f64, cy: f64, max_iter: u32, power: f64) -> f64 {
    escape_time::multibrot(cx, cy, max_iter, power)
}

#[wasm_bindgen]
pub fn celtic(cx: f64, cy: f64, max_iter: u32) -> f64 {
    escape_time::celtic(cx, cy, max_iter)
}

#[wasm_bindgen]
pub fn buffalo(cx: f64, cy: f64, max_iter: u32) -> f64 {
    escape_time::buffalo(cx, cy, max_iter)
}

#[wasm_bindgen]
pub fn perpendicular_burning_ship(cx: f64, cy: f64, max_iter: u32) -> f64 {
    escape_time::perpendicular_burning_ship(cx, cy, max_iter)
}

#[wasm_bindgen]
pub fn newton(x: f64, y: f64, max_iter: u32) -> f64 {
    dynamical::newton(x, y, max_iter)
}

#[wasm_bindgen]
pub fn phoenix(cx: f64, cy: f64, max_iter: u32) -> f64 {
    dynamical::phoenix(cx, cy, max_iter)
}

#[wasm_bindgen]
pub fn magnet1(cx: f64, cy: f64, max_iter: u32) -> f64 {
    native::magnet1(cx, cy, max_iter)
}

#[wasm_bindgen]
pub fn magnet2(cx: f64, cy: f64, max_iter: u32) -> f64 {
    native::magnet2(cx, cy, max_iter)
}

#[wasm_bindgen]
pub fn lambda_fractale(cx: f64, cy: f64, max_iter: u32) -> f64 {
    native::lambda(cx, cy, max_iter)
}

fn outcome_name(outcome: RequestOutcome) -> String {
    match outcome {
        RequestOutcome::Started => "started",
        RequestOutcome::Deferred => "deferred",
        RequestOutcome::Dropped => "dropped",
        RequestOutcome::InvalidSurface => "invalid_surface",
    }
    .to_string()
}

/// Call a JS kernel; anything that is not a number comes back as NaN, which
/// fails backend validation.
fn call_number(func: &js_sys::Function, args: &[f64]) -> f64 {
    let array = js_sys::Array::new();
    for &arg in args {
        array.push(&JsValue::from_f64(arg));
    }
    func.apply(&JsValue::NULL, &array)
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(f64::NAN)
}

fn js_export(signature: KernelSignature, func: js_sys::Function) -> Export {
    match signature {
        KernelSignature::Escape => {
            Export::escape(move |cx, cy, max| call_number(&func, &[cx, cy, max as f64]))
        }
        KernelSignature::Julia => Export::julia(move |zx, zy, c_re, c_im, max| {
            call_number(&func, &[zx, zy, c_re, c_im, max as f64])
        }),
        KernelSignature::Power => Export::power(move |cx, cy, max, power| {
            call_number(&func, &[cx, cy, max as f64, power])
        }),
    }
}

/// Build a backend module from a JS object whose properties are kernel functions.
///
/// Properties that are missing or not functions are skipped.
pub fn export_table_from_js(module_name: &str, exports: &JsValue) -> Result<ExportTable, JsValue> {
    let mut table = ExportTable::new(module_name);
    for kind in FractalKind::ALL {
        let Some(signature) = kind.signature() else {
            continue;
        };
        let value = js_sys::Reflect::get(exports, &JsValue::from_str(kind.export_name()))?;
        if let Ok(func) = value.dyn_into::<js_sys::Function>() {
            table.insert(kind.export_name(), js_export(signature, func));
        }
    }
    Ok(table)
}

/// Render session handle for the browser.
#[wasm_bindgen]
pub struct WasmSession {
    inner: RenderSession,
}

#[wasm_bindgen]
impl WasmSession {
    /// `config_json` and `options_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: u32,
        height: u32,
        config_json: &str,
        options_json: &str,
    ) -> Result<WasmSession, JsValue> {
        let config = if config_json.is_empty() {
            RenderConfig::default()
        } else {
            serde_json::from_str(config_json)
                .map_err(|e| JsValue::from_str(&format!("Parse config: {}", e)))?
        };
        let options = if options_json.is_empty() {
            SessionOptions::default()
        } else {
            SessionOptions::from_json(options_json).map_err(|e| JsValue::from_str(&e.to_string()))?
        };

        Ok(Self {
            inner: RenderSession::new(config, width, height, options),
        })
    }

    pub fn set_config_json(&mut self, json: &str) -> Result<String, JsValue> {
        let config: RenderConfig = serde_json::from_str(json)
            .map_err(|e| JsValue::from_str(&format!("Parse config: {}", e)))?;
        Ok(outcome_name(self.inner.set_config(config)))
    }

    pub fn config_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.config())
            .map_err(|e| JsValue::from_str(&format!("Serialize config: {}", e)))
    }

    pub fn request_render(&mut self) -> String {
        outcome_name(self.inner.request_render())
    }

    /// Run one step. `on_commit(start_row, end_row)` is called for the rows
    /// the step finished. Returns true while a pass is still in flight.
    pub fn step(&mut self, on_commit: Option<js_sys::Function>) -> bool {
        let mut sink = |_: &PixelBuffer, rows: Range<u32>| {
            if let Some(callback) = &on_commit {
                let start = JsValue::from_f64(rows.start as f64);
                let end = JsValue::from_f64(rows.end as f64);
                if let Err(err) = callback.call2(&JsValue::NULL, &start, &end) {
                    log::warn!("on_commit callback failed: {:?}", err);
                }
            }
        };
        match self.inner.step(&mut sink) {
            StepOutcome::Idle => false,
            StepOutcome::Continue => true,
            StepOutcome::Finished(_) => self.inner.is_rendering(),
        }
    }

    pub fn is_rendering(&self) -> bool {
        self.inner.is_rendering()
    }

    pub fn width(&self) -> u32 {
        self.inner.buffer().width()
    }

    pub fn height(&self) -> u32 {
        self.inner.buffer().height()
    }

    /// Copy of the whole RGBA buffer.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.buffer().as_bytes().to_vec()
    }

    /// Copy of the RGBA bytes of rows `start..end`.
    pub fn row_pixels(&self, start: u32, end: u32) -> Vec<u8> {
        self.inner.buffer().row_bytes(start..end).to_vec()
    }

    pub fn status_text(&self) -> String {
        self.inner
            .status()
            .map(|status| status.to_string())
            .unwrap_or_default()
    }

    pub fn status_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.status())
            .map_err(|e| JsValue::from_str(&format!("Serialize status: {}", e)))
    }

    pub fn progress_percent(&self) -> f32 {
        self.inner.progress().percentage()
    }

    pub fn zoom_at(&mut self, px: f64, py: f64, factor: f64) -> Result<String, JsValue> {
        self.inner
            .zoom_at(px, py, factor)
            .map(outcome_name)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn pan(&mut self, dx: f64, dy: f64) -> String {
        outcome_name(self.inner.pan(dx, dy))
    }

    pub fn reset_view(&mut self) -> String {
        outcome_name(self.inner.reset_view())
    }

    pub fn resize(&mut self, width: u32, height: u32) -> String {
        outcome_name(self.inner.resize(width, height))
    }

    /// Complex coordinate `[re, im]` under a surface pixel.
    pub fn pointer_coords(&self, px: f64, py: f64) -> Vec<f64> {
        let (re, im) = self.inner.pixel_to_complex(px, py);
        vec![re, im]
    }

    /// Attach a loaded JS/wasm module's exports as the compiled backend.
    /// Returns the number of kernels found.
    pub fn attach_exports(&mut self, module_name: &str, exports: &JsValue) -> Result<u32, JsValue> {
        let table = export_table_from_js(module_name, exports)?;
        let count = table.len() as u32;
        self.inner.attach_backend(Rc::new(table));
        Ok(count)
    }

    /// Use this module's own kernels as the compiled backend.
    pub fn attach_native(&mut self) {
        self.inner.attach_backend(Rc::new(NativeModule));
    }

    pub fn backend_failed(&mut self, reason: &str) {
        self.inner.backend_failed(reason);
    }
}
