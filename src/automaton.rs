//! Automaton orchestration: owns the field, the kernel geometry cache, the
//! aggregate buffers, and the compute pool; runs one generation per
//! `advance` call.

use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::ThreadPool;

use crate::convolve::{self, radial_weight, uniform_weight, Counter};
use crate::dispatch::{self, for_each_row, for_each_slot};
use crate::field::{wrap, Field, SeedPolicy};
use crate::geometry::LineTable;
use crate::growth::{self, RaflerTransition, Transition};
use crate::params::{AutomatonError, ParameterSet, RuleKind};

const DEFAULT_SEED: u64 = 0x50F7_11FE_5EED_0001;

/// Construction knobs. `AutomatonConfig::default()` gives auto-tuned
/// threads, the original parameter defaults, and a fixed seed.
#[derive(Clone, Debug)]
pub struct AutomatonConfig {
    /// Number of threads for the compute pool. `None` = physical cores.
    pub thread_count: Option<usize>,
    /// Hard upper bound on threads regardless of auto-detection.
    pub max_threads: Option<usize>,
    /// RNG seed for the seeding procedure.
    pub seed: u64,
    /// Initial parameter set.
    pub params: ParameterSet,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            thread_count: None,
            max_threads: None,
            seed: DEFAULT_SEED,
            params: ParameterSet::default(),
        }
    }
}

impl AutomatonConfig {
    pub fn thread_count(mut self, n: usize) -> Self {
        self.thread_count = Some(n.max(1));
        self
    }

    pub fn max_threads(mut self, n: usize) -> Self {
        self.max_threads = Some(n.max(1));
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn params(mut self, params: ParameterSet) -> Self {
        self.params = params;
        self
    }
}

fn alloc_counters(len: usize, what: &'static str) -> Result<Vec<Counter>, AutomatonError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| AutomatonError::Allocation {
            what,
            bytes: len * std::mem::size_of::<Counter>(),
        })?;
    buf.resize(len, Counter::default());
    Ok(buf)
}

pub struct Automaton {
    rule: RuleKind,
    field: Field,
    params: ParameterSet,
    /// Line table for the rule's convolution; `None` for rules that never
    /// convolve through the cache (Conway, brute-force Lenia).
    table: Option<LineTable>,
    /// Pass-A output, one Counter per (cell, kernel row).
    counters: Vec<Counter>,
    /// Full per-cell aggregates (Pass B output / Direct output).
    aggregates: Vec<Counter>,
    /// SmoothLife outer-annulus aggregates; empty for other rules.
    outer_aggregates: Vec<Counter>,
    transition: Box<dyn Transition>,
    pool: ThreadPool,
    rng: StdRng,
    generation: u64,
}

impl Automaton {
    pub fn new(width: u32, height: u32, rule: RuleKind) -> Result<Self, AutomatonError> {
        Self::with_config(width, height, rule, AutomatonConfig::default())
    }

    pub fn with_config(
        width: u32,
        height: u32,
        rule: RuleKind,
        config: AutomatonConfig,
    ) -> Result<Self, AutomatonError> {
        config.params.validate()?;
        let mut field = Field::new(width, height)?;
        let threads = dispatch::resolve_thread_count(config.thread_count, config.max_threads);
        let pool = dispatch::build_pool(threads);

        let mut rng = StdRng::seed_from_u64(config.seed);
        field.seed(SeedPolicy::for_rule(rule), &mut rng);

        let mut automaton = Self {
            rule,
            field,
            params: config.params,
            table: None,
            counters: Vec::new(),
            aggregates: Vec::new(),
            outer_aggregates: Vec::new(),
            transition: Box::new(RaflerTransition::default()),
            pool,
            rng,
            generation: 0,
        };
        automaton.rebuild_buffers()?;
        Ok(automaton)
    }

    /// (Re)build the line table and aggregate buffers for the current rule
    /// and radius. Called at construction and whenever the radius changes.
    fn rebuild_buffers(&mut self) -> Result<(), AutomatonError> {
        let (w, h) = (self.field.width(), self.field.height());
        let cells = w * h;

        let table = match self.rule {
            RuleKind::Conway => None,
            RuleKind::Lenia => None,
            RuleKind::OptimizedLenia => {
                match &self.table {
                    Some(t) if t.matches(w, h, self.params.radius) => return Ok(()),
                    _ => {}
                }
                Some(LineTable::disk(w, h, self.params.radius)?)
            }
            RuleKind::SmoothLife => match self.table.take() {
                // The annulus geometry is radius-independent; keep it.
                Some(t) => Some(t),
                None => Some(LineTable::annulus(w, h)?),
            },
        };

        if let Some(table) = &table {
            self.counters = alloc_counters(cells * table.rows_per_cell(), "counter buffer")?;
        }
        if self.rule != RuleKind::Conway && self.aggregates.len() != cells {
            self.aggregates = alloc_counters(cells, "aggregate buffer")?;
        }
        if self.rule == RuleKind::SmoothLife && self.outer_aggregates.len() != cells {
            self.outer_aggregates = alloc_counters(cells, "outer aggregate buffer")?;
        }
        self.table = table;
        Ok(())
    }

    /// Replace the SmoothLife birth/death transition.
    pub fn set_transition(&mut self, transition: Box<dyn Transition>) {
        self.transition = transition;
    }

    /// Replace the parameter snapshot used by subsequent generations.
    /// `&mut self` guarantees no generation is in flight during the edit.
    pub fn set_params(&mut self, params: ParameterSet) -> Result<(), AutomatonError> {
        params.validate()?;
        let radius_changed = params.radius != self.params.radius;
        self.params = params;
        if radius_changed {
            self.rebuild_buffers()?;
        }
        Ok(())
    }

    pub fn params(&self) -> ParameterSet {
        self.params
    }

    pub fn rule(&self) -> RuleKind {
        self.rule
    }

    /// Generations advanced since construction.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Read-only view of the current generation (plus display tint).
    pub fn field(&self) -> &Field {
        &self.field
    }

    pub fn get_cell(&self, x: i64, y: i64) -> f32 {
        self.field.get(x, y)
    }

    /// Write a cell value between generations (pattern setup).
    pub fn set_cell(&mut self, x: i64, y: i64, value: f32) {
        self.field.set(x, y, value.clamp(0.0, 1.0));
    }

    /// Total field mass (live-cell count for binary rules).
    pub fn mass(&self) -> f64 {
        self.field.mass()
    }

    /// Rerun the seed policy on both buffers.
    pub fn reseed(&mut self) {
        let policy = SeedPolicy::for_rule(self.rule);
        self.field.seed(policy, &mut self.rng);
    }

    /// Zero both buffers.
    pub fn clear(&mut self) {
        self.field.clear();
    }

    /// Run exactly one generation: aggregate from the current buffer, grow
    /// into the next buffer, swap. Parameters are snapshotted at entry.
    pub fn advance(&mut self) {
        let params = self.params;
        match self.rule {
            RuleKind::Conway => self.advance_conway(),
            RuleKind::Lenia => self.advance_lenia_direct(&params),
            RuleKind::OptimizedLenia => self.advance_lenia_two_pass(&params),
            RuleKind::SmoothLife => self.advance_smooth(&params),
        }
        self.field.swap();
        self.generation += 1;
    }

    /// Convenience: run `n` generations.
    pub fn advance_n(&mut self, n: u64) {
        for _ in 0..n {
            self.advance();
        }
    }

    fn advance_conway(&mut self) {
        let width = self.field.width();
        let height = self.field.height();
        let (current, next) = self.field.split();

        for_each_row(&self.pool, next, width, |y, row| {
            let y = y as i64;
            for (x, out) in row.iter_mut().enumerate() {
                let x = x as i64;
                let mut live = 0u32;
                for dy in -1..=1i64 {
                    for dx in -1..=1i64 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        let i = wrap(y + dy, height) * width + wrap(x + dx, width);
                        if current[i] >= 0.5 {
                            live += 1;
                        }
                    }
                }
                let alive = current[y as usize * width + x as usize] >= 0.5;
                *out = if growth::conway_next(alive, live) {
                    1.0
                } else {
                    0.0
                };
            }
        });
    }

    fn advance_lenia_direct(&mut self, params: &ParameterSet) {
        let width = self.field.width();
        let height = self.field.height();
        let (current, next) = self.field.split();

        convolve::direct(
            &self.pool,
            current,
            width,
            height,
            params.radius,
            radial_weight(params),
            &mut self.aggregates,
        );

        let aggregates = &self.aggregates;
        for_each_slot(&self.pool, next, |i, out| {
            *out = growth::next_value(current[i], aggregates[i], params);
        });
    }

    fn advance_lenia_two_pass(&mut self, params: &ParameterSet) {
        let width = self.field.width();
        let table = self
            .table
            .as_ref()
            .expect("optimized Lenia line table built at construction");
        let rows_per_cell = table.rows_per_cell();
        let (current, next) = self.field.split();

        convolve::pass_a(
            &self.pool,
            current,
            width,
            table,
            radial_weight(params),
            &mut self.counters,
        );
        convolve::pass_b(
            &self.pool,
            rows_per_cell,
            0..rows_per_cell,
            &self.counters,
            &mut self.aggregates,
        );

        let aggregates = &self.aggregates;
        for_each_slot(&self.pool, next, |i, out| {
            *out = growth::next_value(current[i], aggregates[i], params);
        });
    }

    fn advance_smooth(&mut self, params: &ParameterSet) {
        let width = self.field.width();
        let table = self
            .table
            .as_ref()
            .expect("SmoothLife line table built at construction");
        let rows_per_cell = table.rows_per_cell();
        let near_rows = table.near_rows();
        let (current, next) = self.field.split();

        convolve::pass_a(
            &self.pool,
            current,
            width,
            table,
            uniform_weight(),
            &mut self.counters,
        );
        convolve::pass_b(
            &self.pool,
            rows_per_cell,
            0..near_rows,
            &self.counters,
            &mut self.aggregates,
        );
        convolve::pass_b(
            &self.pool,
            rows_per_cell,
            near_rows..rows_per_cell,
            &self.counters,
            &mut self.outer_aggregates,
        );

        let inner = &self.aggregates;
        let outer = &self.outer_aggregates;
        let transition = &*self.transition;
        for_each_slot(&self.pool, next, |i, out| {
            let previous = current[i];
            // The inner disk includes the cell itself on top of the fixed
            // near-field samples.
            let mut inner_agg = inner[i];
            inner_agg.accumulate(previous, 1.0);
            *out = transition.next(previous, inner_agg.average(), outer[i].average(), params);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_counter_is_monotonic() {
        let mut a = Automaton::new(16, 16, RuleKind::Conway).unwrap();
        assert_eq!(a.generation(), 0);
        a.advance_n(5);
        assert_eq!(a.generation(), 5);
    }

    #[test]
    fn radius_change_rebuilds_the_table() {
        let mut a = Automaton::new(24, 24, RuleKind::OptimizedLenia)
            .expect("construction");
        let params = ParameterSet {
            radius: 7,
            ..a.params()
        };
        a.set_params(params).unwrap();
        a.advance();
        assert_eq!(a.params().radius, 7);
    }

    #[test]
    fn invalid_params_are_rejected_without_effect() {
        let mut a = Automaton::new(8, 8, RuleKind::Lenia).unwrap();
        let bad = ParameterSet {
            radius: 0,
            ..a.params()
        };
        assert!(a.set_params(bad).is_err());
        assert_eq!(a.params().radius, ParameterSet::default().radius);
    }
}
