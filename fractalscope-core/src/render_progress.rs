use serde::{Deserialize, Serialize};

/// How far the pass in flight has got.
///
/// Steps are row bands for escape-time kinds, point batches for IFS kinds
/// and a single step for L-system kinds. Elapsed time is measured from the
/// start of the pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderProgress {
    pub completed_steps: u32,
    pub total_steps: u32,
    pub elapsed_ms: f64,
    pub is_complete: bool,
}

impl RenderProgress {
    pub fn new(total_steps: u32) -> Self {
        Self {
            total_steps,
            ..Self::default()
        }
    }

    /// Count one finished step. Never runs past `total_steps`.
    pub fn record_step(&mut self, elapsed_ms: f64) {
        self.completed_steps = (self.completed_steps + 1).min(self.total_steps);
        self.elapsed_ms = elapsed_ms;
    }

    /// Mark the pass finished, whatever step count it reached.
    pub fn finish(&mut self, elapsed_ms: f64) {
        self.completed_steps = self.total_steps;
        self.elapsed_ms = elapsed_ms;
        self.is_complete = true;
    }

    /// Completion in percent. A finished pass always reads 100.
    pub fn percentage(&self) -> f32 {
        if self.is_complete {
            return 100.0;
        }
        if self.total_steps == 0 {
            return 0.0;
        }
        self.completed_steps as f32 / self.total_steps as f32 * 100.0
    }
}
