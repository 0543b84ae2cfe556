//! Convolution engine: weighted neighbourhood aggregates.
//!
//! Two interchangeable strategies produce per-cell `{weighted sum, total
//! weight}` aggregates:
//! - `direct`: brute-force O(r^2) per cell, the correctness oracle;
//! - `pass_a` + `pass_b`: the production two-pass decomposition over the
//!   precomputed line table, O(r) per (cell, row) work unit.
//!
//! Both walk the identical disk row set and share one distance/weight
//! computation, so their aggregates agree up to floating-point summation
//! order.

use std::ops::Range;

use rayon::ThreadPool;

use crate::dispatch::for_each_slot;
use crate::field::wrap;
use crate::geometry::{KernelRow, LineTable, RowKind};
use crate::growth::gaussian_bell;
use crate::params::ParameterSet;

/// Partial aggregate of one cell's neighbourhood (or one kernel row of it).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Counter {
    pub sum: f32,
    pub total: f32,
}

impl Counter {
    #[inline(always)]
    pub fn accumulate(&mut self, value: f32, weight: f32) {
        self.sum += value * weight;
        self.total += weight;
    }

    #[inline(always)]
    pub fn merge(&mut self, other: Counter) {
        self.sum += other.sum;
        self.total += other.total;
    }

    /// Neighbourhood average; defined as 0 when the total weight is 0 so a
    /// degenerate aggregate never divides by zero.
    #[inline(always)]
    pub fn average(&self) -> f32 {
        if self.total == 0.0 {
            0.0
        } else {
            self.sum / self.total
        }
    }
}

/// Euclidean offset distance, shared by both strategies so their weights are
/// bit-identical.
#[inline(always)]
fn distance(dx: i64, dy: i64) -> f32 {
    (((dx * dx + dy * dy) as f32)).sqrt()
}

/// Radial falloff used by the Lenia paths: a Gaussian bell over the
/// neighbour's distance normalized by the radius.
pub fn radial_weight(params: &ParameterSet) -> impl Fn(f32) -> f32 + Sync + Copy {
    let radius = params.radius as f32;
    let rho = params.rho;
    let omega = params.omega;
    move |d: f32| gaussian_bell(d / radius, rho, omega)
}

/// Uniform weight used by the SmoothLife counting pass.
pub fn uniform_weight() -> impl Fn(f32) -> f32 + Sync + Copy {
    |_d: f32| 1.0
}

/// Brute-force reference: for every cell, scan the disk rows
/// `dy in [-r, r-1]`, `dx in [-dx_max, dx_max]`, wrapping toroidally.
/// One aggregate per cell into `out` (len = width * height).
pub fn direct<W>(
    pool: &ThreadPool,
    field: &[f32],
    width: usize,
    height: usize,
    radius: u32,
    weight: W,
    out: &mut [Counter],
) where
    W: Fn(f32) -> f32 + Sync,
{
    debug_assert_eq!(field.len(), width * height);
    debug_assert_eq!(out.len(), width * height);
    let r = radius as i64;

    for_each_slot(pool, out, |cell, agg| {
        let cx = (cell % width) as i64;
        let cy = (cell / width) as i64;
        let mut acc = Counter::default();
        for i in 0..2 * r {
            let dy = i - r;
            let dx_max = (((r * r - dy * dy) as f64).sqrt()).floor() as i64;
            let y = wrap(cy + dy, height);
            for dx in -dx_max..=dx_max {
                let x = wrap(cx + dx, width);
                let w = weight(distance(dx, dy));
                acc.accumulate(field[y * width + x], w);
            }
        }
        *agg = acc;
    });
}

/// Accumulate one kernel row into a Counter. Span rows walk the wrapped
/// extent east from `x_start`; offset rows sample only the two endpoints.
#[inline]
fn accumulate_row<W>(row: &KernelRow, field: &[f32], width: usize, weight: &W) -> Counter
where
    W: Fn(f32) -> f32,
{
    let mut acc = Counter::default();
    let base = row.y as usize * width;
    let dy = row.dy as i64;
    match row.kind {
        RowKind::Offsets => {
            let d = distance(row.dx_start as i64, dy);
            acc.accumulate(field[base + row.x_start as usize], weight(d));
            acc.accumulate(field[base + row.x_end as usize], weight(d));
        }
        RowKind::Span => {
            let mut x = row.x_start as usize;
            for k in 0..row.sample_count() {
                let dx = row.dx_start as i64 + k as i64;
                acc.accumulate(field[base + x], weight(distance(dx, dy)));
                x += 1;
                if x == width {
                    x = 0;
                }
            }
        }
    }
    acc
}

/// Pass A: one independent work unit per (cell, row) over the flattened 3D
/// index space, each writing its own Counter. `counters` has
/// `width * height * table.rows_per_cell()` slots, row-within-cell fastest.
pub fn pass_a<W>(
    pool: &ThreadPool,
    field: &[f32],
    width: usize,
    table: &LineTable,
    weight: W,
    counters: &mut [Counter],
) where
    W: Fn(f32) -> f32 + Sync,
{
    let rows_per_cell = table.rows_per_cell();
    debug_assert_eq!(counters.len(), field.len() * rows_per_cell);

    for_each_slot(pool, counters, |i, slot| {
        let cell = i / rows_per_cell;
        let z = i % rows_per_cell;
        *slot = accumulate_row(table.row(cell, z), field, width, &weight);
    });
}

/// Pass B: reduce each cell's per-row Counters over `row_range` into one
/// full aggregate. Runs strictly after Pass A has completed (the dispatch
/// join is the barrier).
pub fn pass_b(
    pool: &ThreadPool,
    rows_per_cell: usize,
    row_range: Range<usize>,
    counters: &[Counter],
    out: &mut [Counter],
) {
    debug_assert!(row_range.end <= rows_per_cell);
    debug_assert_eq!(counters.len(), out.len() * rows_per_cell);

    for_each_slot(pool, out, |cell, agg| {
        let base = cell * rows_per_cell;
        let mut acc = Counter::default();
        for z in row_range.clone() {
            acc.merge(counters[base + z]);
        }
        *agg = acc;
    });
}
