#![cfg(target_arch = "wasm32")]

use fractalscope_compute::wasm::{self, export_table_from_js, WasmSession};
use fractalscope_compute::BackendModule;
use wasm_bindgen::prelude::*;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

#[wasm_bindgen_test]
fn exported_kernels_match_golden_values() {
    assert_eq!(wasm::mandelbrot(0.0, 0.0, 256), 256.0);
    assert_eq!(wasm::julia(0.0, 0.0, -0.8, 0.156, 256), 252.0);
    assert_eq!(wasm::newton(2.0, 0.0, 50), 5.0);
    assert_eq!(wasm::magnet1(1.5, 0.0, 100), 1.0);
}

#[wasm_bindgen_test]
fn js_object_becomes_export_table() {
    let exports = js_sys::Object::new();
    let mandelbrot = js_sys::Function::new_with_args("cx, cy, max", "return max;");
    js_sys::Reflect::set(&exports, &JsValue::from_str("mandelbrot"), &mandelbrot).unwrap();
    js_sys::Reflect::set(&exports, &JsValue::from_str("julia"), &JsValue::from_f64(1.0)).unwrap();

    let table = export_table_from_js("js", &exports).unwrap();
    assert_eq!(table.len(), 1);
    assert!(table.export("mandelbrot").is_some());
    assert!(table.export("julia").is_none());
}

#[wasm_bindgen_test]
fn session_renders_to_completion() {
    wasm::init();
    let mut session = WasmSession::new(16, 12, r#"{"kind":"julia","max_iterations":64}"#, "").unwrap();
    assert_eq!(session.request_render(), "started");
    while session.step(None) {}

    assert_eq!(session.pixels().len(), 16 * 12 * 4);
    assert!(session.status_text().starts_with("interpreted - "));
}

#[wasm_bindgen_test]
fn page_clock_is_monotonic() {
    let a = fractalscope_compute::clock::now_ms();
    let b = fractalscope_compute::clock::now_ms();
    assert!(a >= 0.0);
    assert!(b >= a);
}
