/// Milliseconds from the page's monotonic clock (`performance.now()`).
///
/// Looked up on the global object so it works in a window and in a worker.
/// Falls back to `Date.now()` where no `performance` object exists.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    use wasm_bindgen::{JsCast, JsValue};

    js_sys::Reflect::get(&js_sys::global(), &JsValue::from_str("performance"))
        .ok()
        .and_then(|value| value.dyn_into::<web_sys::Performance>().ok())
        .map(|performance| performance.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Milliseconds since the first call in this process.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    START.get_or_init(Instant::now).elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_does_not_run_backwards() {
        let a = now_ms();
        let b = now_ms();
        assert!(b >= a);
    }
}
