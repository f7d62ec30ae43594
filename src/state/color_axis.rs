use crate::processing::statistics::finite_range;

/// The two shared color axes of the six-panel layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorAxisId {
    /// Drain voltage as color on the gate-voltage panels.
    DrainOnGate,
    /// Gate voltage as color on the drain-voltage panels.
    GateOnDrain,
}

impl ColorAxisId {
    /// Layout key the traces bind to.
    pub fn layout_key(&self) -> &'static str {
        match self {
            ColorAxisId::DrainOnGate => "coloraxis",
            ColorAxisId::GateOnDrain => "coloraxis2",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ColorAxisId::DrainOnGate => "Vds (V)",
            ColorAxisId::GateOnDrain => "Vgs (V)",
        }
    }
}

/// Running (min, max) of one color axis. Starts empty at (+inf, -inf) and
/// only ever widens.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorAxisRange {
    pub min: f64,
    pub max: f64,
}

impl Default for ColorAxisRange {
    fn default() -> Self {
        Self {
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }
}

impl ColorAxisRange {
    /// Widen to cover the finite entries of `values`. Non-finite input is ignored.
    pub fn update(&mut self, values: &[f64]) {
        if let Some((lo, hi)) = finite_range(values) {
            self.min = self.min.min(lo);
            self.max = self.max.max(hi);
        }
    }

    /// The bounds, once at least one finite value has been seen.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        (self.min <= self.max).then_some((self.min, self.max))
    }
}
