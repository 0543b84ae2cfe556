//! Double-buffered scalar field state.
//!
//! Two equal-shape buffers with a phase bit: `bufs[phase]` is the current
//! generation (read), `bufs[1 - phase]` is the next generation (write).
//! Addressing is toroidal on both axes. A static RGB tint rides along for
//! display and carries no simulation meaning.

use rand::rngs::StdRng;
use rand::Rng;

use crate::params::{AutomatonError, RuleKind};

/// Live density used when seeding binary rules (2-in-5).
pub const BINARY_SEED_DENSITY: f64 = 0.4;

/// How `seed` fills the buffers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SeedPolicy {
    /// Each cell is 1.0 with probability `live_density`, else 0.0.
    Binary { live_density: f64 },
    /// Each cell is uniform in [0, 1).
    Continuous,
}

impl SeedPolicy {
    pub fn for_rule(rule: RuleKind) -> Self {
        if rule.is_binary() {
            SeedPolicy::Binary {
                live_density: BINARY_SEED_DENSITY,
            }
        } else {
            SeedPolicy::Continuous
        }
    }
}

/// Wrap a possibly-negative coordinate onto `0..len`.
#[inline(always)]
pub fn wrap(v: i64, len: usize) -> usize {
    v.rem_euclid(len as i64) as usize
}

pub struct Field {
    width: usize,
    height: usize,
    /// `bufs[phase]` = current (read), `bufs[1 - phase]` = next (write).
    bufs: [Vec<f32>; 2],
    phase: usize,
    tint: [u8; 3],
}

fn alloc_buffer(len: usize) -> Result<Vec<f32>, AutomatonError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| AutomatonError::Allocation {
            what: "generation buffer",
            bytes: len * std::mem::size_of::<f32>(),
        })?;
    buf.resize(len, 0.0);
    Ok(buf)
}

impl Field {
    pub fn new(width: u32, height: u32) -> Result<Self, AutomatonError> {
        if width == 0 || height == 0 {
            return Err(AutomatonError::ZeroField { width, height });
        }
        let len = width as usize * height as usize;
        Ok(Self {
            width: width as usize,
            height: height as usize,
            bufs: [alloc_buffer(len)?, alloc_buffer(len)?],
            phase: 0,
            tint: [255, 255, 255],
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display tint accompanying the scalar field.
    #[inline]
    pub fn tint(&self) -> [u8; 3] {
        self.tint
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Read-only view of the current generation.
    #[inline]
    pub fn current(&self) -> &[f32] {
        &self.bufs[self.phase]
    }

    /// Borrow current (read) and next (write) simultaneously.
    /// The split is what keeps one generation's writes invisible to its reads.
    pub fn split(&mut self) -> (&[f32], &mut [f32]) {
        let (lo, hi) = self.bufs.split_at_mut(1);
        if self.phase == 0 {
            (&lo[0], &mut hi[0])
        } else {
            (&hi[0], &mut lo[0])
        }
    }

    /// Publish the next generation. The old current buffer becomes garbage
    /// to be overwritten wholesale by the following generation.
    #[inline]
    pub fn swap(&mut self) {
        self.phase = 1 - self.phase;
    }

    /// Rerun the seed policy. Both buffers get the same contents so a swap
    /// immediately after seeding still reads seeded data.
    pub fn seed(&mut self, policy: SeedPolicy, rng: &mut StdRng) {
        let len = self.len();
        for i in 0..len {
            let v = match policy {
                SeedPolicy::Binary { live_density } => {
                    if rng.gen_bool(live_density) {
                        1.0
                    } else {
                        0.0
                    }
                }
                SeedPolicy::Continuous => rng.gen::<f32>(),
            };
            self.bufs[0][i] = v;
            self.bufs[1][i] = v;
        }
    }

    /// Zero both buffers.
    pub fn clear(&mut self) {
        self.bufs[0].fill(0.0);
        self.bufs[1].fill(0.0);
    }

    /// Read one cell of the current generation, toroidally wrapped.
    pub fn get(&self, x: i64, y: i64) -> f32 {
        let i = self.index(wrap(x, self.width), wrap(y, self.height));
        self.current()[i]
    }

    /// Write one cell into both buffers, toroidally wrapped. Intended for
    /// pattern setup between generations, not for use mid-generation.
    pub fn set(&mut self, x: i64, y: i64, value: f32) {
        let i = self.index(wrap(x, self.width), wrap(y, self.height));
        self.bufs[0][i] = value;
        self.bufs[1][i] = value;
    }

    /// Total mass of the current generation (live-cell count for binary
    /// rules).
    pub fn mass(&self) -> f64 {
        self.current().iter().map(|&v| v as f64).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(matches!(
            Field::new(0, 8),
            Err(AutomatonError::ZeroField { .. })
        ));
        assert!(matches!(
            Field::new(8, 0),
            Err(AutomatonError::ZeroField { .. })
        ));
    }

    #[test]
    fn seeding_is_deterministic_and_fills_both_buffers() {
        let mut a = Field::new(16, 16).unwrap();
        let mut b = Field::new(16, 16).unwrap();
        let mut rng_a = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);
        a.seed(SeedPolicy::Continuous, &mut rng_a);
        b.seed(SeedPolicy::Continuous, &mut rng_b);
        assert_eq!(a.current(), b.current());

        a.swap();
        assert_eq!(a.current(), b.current());
    }

    #[test]
    fn wrap_is_toroidal_on_both_axes() {
        let mut f = Field::new(8, 4).unwrap();
        f.set(-1, -1, 0.5);
        assert_eq!(f.get(7, 3), 0.5);
        assert_eq!(f.get(-1, -1), 0.5);
        assert_eq!(f.get(15, 7), 0.5);
    }

    #[test]
    fn split_reads_current_writes_next() {
        let mut f = Field::new(4, 4).unwrap();
        f.set(1, 1, 1.0);
        {
            let (current, next) = f.split();
            assert_eq!(current[5], 1.0);
            next[0] = 0.25;
        }
        // Not visible until the swap.
        assert_eq!(f.current()[0], 0.0);
        f.swap();
        assert_eq!(f.current()[0], 0.25);
    }
}
