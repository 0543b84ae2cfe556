//! Kernel geometry cache: precomputed line tables.
//!
//! For every cell and every kernel row, the table stores the toroidally
//! wrapped horizontal extent intersecting the disk (or annulus) at that
//! row's vertical offset. The table is a pure function of
//! (width, height, radius); it is built once per radius and reused across
//! generations until the radius changes.

use crate::field::wrap;
use crate::params::AutomatonError;

/// Fixed near-field sample offsets used by the SmoothLife annulus table,
/// stored as (start, end) pairs sharing a vertical offset. The vertical
/// neighbours are deliberately absent, matching the table this decomposition
/// was derived from.
pub const NEAR_OFFSETS: [[(i32, i32); 2]; 3] = [
    [(-1, -1), (1, -1)],
    [(-1, 0), (1, 0)],
    [(-1, 1), (1, 1)],
];

/// Outer radius of the SmoothLife annulus, in cells.
pub const SMOOTH_OUTER_RADIUS: u32 = 12;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowKind {
    /// Only the two endpoints are sampled (near-field diagonal/lateral
    /// offsets).
    Offsets,
    /// Every cell from `x_start` through `x_end` (walking east with wrap)
    /// is sampled.
    Span,
}

/// One horizontal slice of a cell's neighbourhood.
///
/// `x_start`/`x_end`/`y` are wrapped field coordinates; `dx_start`/`dy` are
/// the signed offsets from the owning cell, kept so the convolution can
/// recover true distances after wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KernelRow {
    pub x_start: u32,
    pub x_end: u32,
    pub y: u32,
    pub dx_start: i16,
    pub dy: i16,
    pub kind: RowKind,
}

impl KernelRow {
    /// Number of samples this row contributes.
    #[inline]
    pub fn sample_count(&self) -> usize {
        match self.kind {
            RowKind::Offsets => 2,
            RowKind::Span => (-(self.dx_start as i32) * 2 + 1) as usize,
        }
    }
}

/// Per-cell, per-row kernel extents for one (width, height, radius).
pub struct LineTable {
    width: usize,
    height: usize,
    radius: u32,
    rows_per_cell: usize,
    /// Rows for the 3 fixed near-field pairs come first (annulus tables
    /// only); 0 for disk tables.
    near_rows: usize,
    rows: Vec<KernelRow>,
}

fn alloc_rows(len: usize) -> Result<Vec<KernelRow>, AutomatonError> {
    let mut rows = Vec::new();
    rows.try_reserve_exact(len)
        .map_err(|_| AutomatonError::Allocation {
            what: "kernel line table",
            bytes: len * std::mem::size_of::<KernelRow>(),
        })?;
    Ok(rows)
}

impl LineTable {
    /// Disk decomposition used by the optimized Lenia path: `2 * radius`
    /// span rows with `dy = i - radius`, each spanning
    /// `±floor(sqrt(radius^2 - dy^2))`.
    pub fn disk(width: usize, height: usize, radius: u32) -> Result<Self, AutomatonError> {
        Self::build(width, height, radius, false)
    }

    /// SmoothLife annulus: 3 near-field offset rows followed by the outer
    /// disk's `2 * SMOOTH_OUTER_RADIUS` span rows.
    pub fn annulus(width: usize, height: usize) -> Result<Self, AutomatonError> {
        Self::build(width, height, SMOOTH_OUTER_RADIUS, true)
    }

    fn build(
        width: usize,
        height: usize,
        radius: u32,
        near_field: bool,
    ) -> Result<Self, AutomatonError> {
        let near_rows = if near_field { NEAR_OFFSETS.len() } else { 0 };
        let span_rows = 2 * radius as usize;
        let rows_per_cell = near_rows + span_rows;
        let mut rows = alloc_rows(width * height * rows_per_cell)?;

        let r = radius as i64;
        for y in 0..height as i64 {
            for x in 0..width as i64 {
                if near_field {
                    for pair in NEAR_OFFSETS {
                        let (dx0, dy) = pair[0];
                        let (dx1, _) = pair[1];
                        rows.push(KernelRow {
                            x_start: wrap(x + dx0 as i64, width) as u32,
                            x_end: wrap(x + dx1 as i64, width) as u32,
                            y: wrap(y + dy as i64, height) as u32,
                            dx_start: dx0 as i16,
                            dy: dy as i16,
                            kind: RowKind::Offsets,
                        });
                    }
                }
                for i in 0..span_rows as i64 {
                    let dy = i - r;
                    let dx_max = (((r * r - dy * dy) as f64).sqrt()).floor() as i64;
                    rows.push(KernelRow {
                        x_start: wrap(x - dx_max, width) as u32,
                        x_end: wrap(x + dx_max, width) as u32,
                        y: wrap(y + dy, height) as u32,
                        dx_start: -dx_max as i16,
                        dy: dy as i16,
                        kind: RowKind::Span,
                    });
                }
            }
        }

        Ok(Self {
            width,
            height,
            radius,
            rows_per_cell,
            near_rows,
            rows,
        })
    }

    #[inline]
    pub fn radius(&self) -> u32 {
        self.radius
    }

    #[inline]
    pub fn rows_per_cell(&self) -> usize {
        self.rows_per_cell
    }

    #[inline]
    pub fn near_rows(&self) -> usize {
        self.near_rows
    }

    /// All rows for one cell, `cell = y * width + x`.
    #[inline]
    pub fn cell_rows(&self, cell: usize) -> &[KernelRow] {
        let start = cell * self.rows_per_cell;
        &self.rows[start..start + self.rows_per_cell]
    }

    /// One row of one cell, addressed over the flat (cell, row) index space.
    #[inline]
    pub fn row(&self, cell: usize, z: usize) -> &KernelRow {
        &self.rows[cell * self.rows_per_cell + z]
    }

    /// Whether this table is still valid for the given shape and radius.
    pub fn matches(&self, width: usize, height: usize, radius: u32) -> bool {
        self.width == width && self.height == height && self.radius == radius
    }
}
