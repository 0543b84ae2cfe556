//! Parallel dispatch over index spaces.
//!
//! Work units within one pass are independent by construction (each writes
//! its own output slot), so they map onto a rayon pool without any
//! synchronization beyond the implicit join at the end of the pass. That
//! join is the hard barrier between convolution passes.

use rayon::prelude::*;
use rayon::ThreadPool;

/// Per-unit parallel-for: one work unit per output slot. Used for the 3D
/// (cell, row) Pass A space (flattened) and the per-cell reduction /
/// integration passes.
pub fn for_each_slot<T, F>(pool: &ThreadPool, out: &mut [T], f: F)
where
    T: Send,
    F: Fn(usize, &mut T) + Sync,
{
    pool.install(|| {
        out.par_iter_mut()
            .enumerate()
            .for_each(|(i, slot)| f(i, slot));
    });
}

/// Row-granular parallel-for over a 2D field buffer: one work unit per row
/// of `width` cells. Cheaper than per-cell dispatch for light kernels.
pub fn for_each_row<T, F>(pool: &ThreadPool, out: &mut [T], width: usize, f: F)
where
    T: Send,
    F: Fn(usize, &mut [T]) + Sync,
{
    pool.install(|| {
        out.par_chunks_mut(width)
            .enumerate()
            .for_each(|(y, row)| f(y, row));
    });
}

/// Resolve the worker count for a pool: explicit request, bounded by an
/// optional cap, defaulting to the physical core count.
pub fn resolve_thread_count(requested: Option<usize>, cap: Option<usize>) -> usize {
    let mut threads = requested.unwrap_or_else(|| num_cpus::get_physical().max(1));
    if let Some(cap) = cap {
        threads = threads.min(cap);
    }
    threads.max(1)
}

/// Build the engine-owned compute pool.
pub fn build_pool(threads: usize) -> ThreadPool {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .expect("failed to build soft-life rayon thread pool")
}
