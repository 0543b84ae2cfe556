//! Growth mappings: how an aggregate becomes the next cell value.
//!
//! Lenia uses a Gaussian growth bell over the neighbourhood average;
//! Conway is the classic B3/S23 threshold rule; SmoothLife maps an
//! (inner, outer) count pair through a pluggable smoothed birth/death
//! transition.

use crate::convolve::Counter;
use crate::params::ParameterSet;

/// `exp(-(x - center)^2 / (2 * spread^2))`.
#[inline(always)]
pub fn gaussian_bell(x: f32, center: f32, spread: f32) -> f32 {
    let d = x - center;
    (-(d * d) / (2.0 * spread * spread)).exp()
}

/// Lenia integrator: neighbourhood average -> growth in [-1, 1] -> next
/// value, saturated into [0, 1]. Pure and deterministic; a zero-weight
/// aggregate reads as average 0 rather than dividing by zero.
#[inline]
pub fn next_value(previous: f32, aggregate: Counter, params: &ParameterSet) -> f32 {
    let average = aggregate.average();
    let growth = 2.0 * gaussian_bell(average, params.mu, params.sigma) - 1.0;
    (previous + growth / params.dt).clamp(0.0, 1.0)
}

/// B3/S23: survive on 2 or 3 live neighbours, get born on exactly 3.
#[inline(always)]
pub fn conway_next(alive: bool, live_neighbours: u32) -> bool {
    if alive {
        live_neighbours == 2 || live_neighbours == 3
    } else {
        live_neighbours == 3
    }
}

/// SmoothLife birth/death mapping from the inner (aliveness) and outer
/// (neighbour density) averages to the next cell value.
///
/// The exact shape is an implementation choice; implementations must favour
/// inner averages near the alive band and outer averages near the
/// birth/survival bands, smoothly.
pub trait Transition: Send + Sync {
    fn next(&self, previous: f32, inner_avg: f32, outer_avg: f32, params: &ParameterSet) -> f32;
}

#[inline(always)]
fn sigmoid(x: f32, center: f32, alpha: f32) -> f32 {
    1.0 / (1.0 + (-(x - center) * 4.0 / alpha).exp())
}

#[inline(always)]
fn sigmoid_interval(x: f32, lo: f32, hi: f32, alpha: f32) -> f32 {
    sigmoid(x, lo, alpha) * (1.0 - sigmoid(x, hi, alpha))
}

#[inline(always)]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Smooth-interval transition with the classic SmoothLife constants:
/// the birth interval applies to dead cells, the survival interval to live
/// ones, blended by how alive the inner disk reads.
#[derive(Clone, Copy, Debug)]
pub struct RaflerTransition {
    pub birth: (f32, f32),
    pub survival: (f32, f32),
    /// Smoothing width of the outer-density sigmoids.
    pub alpha_n: f32,
    /// Smoothing width of the inner-aliveness sigmoid.
    pub alpha_m: f32,
}

impl Default for RaflerTransition {
    fn default() -> Self {
        Self {
            birth: (0.278, 0.365),
            survival: (0.267, 0.445),
            alpha_n: 0.028,
            alpha_m: 0.147,
        }
    }
}

impl Transition for RaflerTransition {
    fn next(&self, previous: f32, inner_avg: f32, outer_avg: f32, params: &ParameterSet) -> f32 {
        let aliveness = sigmoid(inner_avg, 0.5, self.alpha_m);
        let lo = lerp(self.birth.0, self.survival.0, aliveness);
        let hi = lerp(self.birth.1, self.survival.1, aliveness);
        let s = sigmoid_interval(outer_avg, lo, hi, self.alpha_n);
        (previous + (2.0 * s - 1.0) / params.dt).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bell_peaks_at_center_and_is_symmetric() {
        assert_eq!(gaussian_bell(0.5, 0.5, 0.1), 1.0);
        let lo = gaussian_bell(0.3, 0.5, 0.1);
        let hi = gaussian_bell(0.7, 0.5, 0.1);
        assert!((lo - hi).abs() < 1e-7);
        assert!(lo < 1.0);
    }

    #[test]
    fn conway_rule_matches_truth_table() {
        for n in 0..9 {
            assert_eq!(conway_next(true, n), n == 2 || n == 3);
            assert_eq!(conway_next(false, n), n == 3);
        }
    }

    #[test]
    fn next_value_saturates() {
        let params = ParameterSet {
            dt: 1.0,
            ..Default::default()
        };
        // Average right on mu: growth = +1.
        let grow = Counter {
            sum: params.mu,
            total: 1.0,
        };
        assert_eq!(next_value(0.9, grow, &params), 1.0);
        // Average far from mu: growth = -1.
        let shrink = Counter {
            sum: 1.0,
            total: 1.0,
        };
        assert_eq!(next_value(0.1, shrink, &params), 0.0);
    }

    #[test]
    fn zero_weight_aggregate_is_defined() {
        let params = ParameterSet::default();
        let v = next_value(0.5, Counter::default(), &params);
        assert!(v.is_finite());
        assert!((0.0..=1.0).contains(&v));
    }

    #[test]
    fn transition_favours_the_birth_band() {
        let t = RaflerTransition::default();
        let params = ParameterSet {
            dt: 1.0,
            ..Default::default()
        };
        // Dead cell, outer density inside the birth band: births.
        let born = t.next(0.0, 0.0, 0.32, &params);
        assert!(born > 0.9, "expected birth, got {born}");
        // Dead cell, empty neighbourhood: stays dead.
        let dead = t.next(0.0, 0.0, 0.0, &params);
        assert_eq!(dead, 0.0);
        // Live cell, outer density inside the survival band: survives.
        let lives = t.next(1.0, 1.0, 0.35, &params);
        assert_eq!(lives, 1.0);
        // Live cell, overcrowded: dies.
        let dies = t.next(1.0, 1.0, 0.9, &params);
        assert!(dies < 0.1, "expected death, got {dies}");
    }
}
