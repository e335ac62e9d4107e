//! Render status reported to the host after each pass.

use crate::FractalKind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which implementation produced the pixels of a pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum BackendUsed {
    /// A compiled backend module, by module name.
    Compiled(String),
    /// The engine's own implementation.
    Interpreted,
    /// Neither backend could render this kind.
    Unavailable,
}

impl fmt::Display for BackendUsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendUsed::Compiled(name) => f.write_str(name),
            BackendUsed::Interpreted => f.write_str("interpreted"),
            BackendUsed::Unavailable => f.write_str("unavailable"),
        }
    }
}

/// Outcome of the most recent render pass.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderStatus {
    pub kind: FractalKind,
    pub backend_used: BackendUsed,
    pub elapsed_ms: f64,
    /// False while in flight, and for passes that had nothing to render with.
    pub completed: bool,
}

impl RenderStatus {
    pub fn in_flight(kind: FractalKind, backend_used: BackendUsed) -> Self {
        Self {
            kind,
            backend_used,
            elapsed_ms: 0.0,
            completed: false,
        }
    }
}

impl fmt::Display for RenderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.backend_used == BackendUsed::Unavailable {
            return write!(
                f,
                "{}: compiled backend required (missing export)",
                self.kind
            );
        }
        if !self.completed {
            return f.write_str("rendering...");
        }
        write!(f, "{} - {:.0} ms", self.backend_used, self.elapsed_ms)
    }
}
