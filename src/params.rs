//! Tunable parameters, rule selection, and construction-time errors.

use thiserror::Error;

/// Hard upper bound on the convolution radius. Line tables are O(w*h*radius),
/// so an unbounded radius would let a bad config eat all memory.
pub const MAX_RADIUS: u32 = 64;

/// Which update rule the automaton runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleKind {
    /// Classic B3/S23 on a binary field, fixed 3x3 Moore window.
    Conway,
    /// Continuous counts over a fixed annulus, smoothed birth/death mapping.
    SmoothLife,
    /// Gaussian-growth Lenia, brute-force O(r^2) convolution.
    Lenia,
    /// Lenia with the separable two-pass convolution. Must match `Lenia`
    /// per cell within floating-point tolerance.
    OptimizedLenia,
}

impl RuleKind {
    /// Rules with a binary {0,1} field get threshold seeding; the Lenia
    /// variants get a continuous random alpha.
    pub fn is_binary(self) -> bool {
        matches!(self, RuleKind::Conway | RuleKind::SmoothLife)
    }
}

/// Tunable constants, snapshotted once at the start of each generation.
///
/// Callers may replace the set between generations only; `&mut self` on
/// [`crate::Automaton::set_params`] and [`crate::Automaton::advance`]
/// enforces that statically.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParameterSet {
    /// Convolution radius in cells.
    pub radius: u32,
    /// Growth divisor: each generation applies `growth / dt`.
    pub dt: f32,
    /// Center of the growth bell.
    pub mu: f32,
    /// Spread of the growth bell.
    pub sigma: f32,
    /// Center of the radial kernel weight bell (normalized distance).
    pub rho: f32,
    /// Spread of the radial kernel weight bell.
    pub omega: f32,
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            radius: 15,
            dt: 5.0,
            mu: 0.14,
            sigma: 0.014,
            rho: 0.5,
            omega: 0.15,
        }
    }
}

impl ParameterSet {
    /// Reject malformed configurations up front; steady-state updates never
    /// re-validate.
    pub fn validate(&self) -> Result<(), AutomatonError> {
        if self.radius == 0 || self.radius > MAX_RADIUS {
            return Err(AutomatonError::RadiusOutOfRange(self.radius));
        }
        for (name, value) in [
            ("dt", self.dt),
            ("sigma", self.sigma),
            ("omega", self.omega),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(AutomatonError::NonPositiveParameter { name, value });
            }
        }
        Ok(())
    }
}

/// Construction-time failures. Steady-state `advance` has no error paths;
/// numeric edge cases (zero total weight) are defined, not reported.
#[derive(Debug, Error)]
pub enum AutomatonError {
    #[error("field dimensions must be non-zero (got {width}x{height})")]
    ZeroField { width: u32, height: u32 },
    #[error("radius must be within 1..={MAX_RADIUS} (got {0})")]
    RadiusOutOfRange(u32),
    #[error("{name} must be a positive finite value (got {value})")]
    NonPositiveParameter { name: &'static str, value: f32 },
    #[error("failed to allocate {bytes} bytes for {what}")]
    Allocation { what: &'static str, bytes: usize },
}
