use std::env;
use std::time::Instant;

use rand::Rng;
use rand::SeedableRng;
use soft_life::convolve::{self, radial_weight, Counter};
use soft_life::dispatch::{build_pool, resolve_thread_count};
use soft_life::{LineTable, ParameterSet};

#[derive(Clone, Debug)]
struct BenchConfig {
    size: usize,
    radius: u32,
    warmup: u64,
    iters: u64,
    seed: u64,
    threads: Option<usize>,
    json: bool,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            size: 512,
            radius: 15,
            warmup: 2,
            iters: 10,
            seed: 0xA5A5_5EED_7788_1122,
            threads: None,
            json: false,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct RunResult {
    total_ms: f64,
    avg_ms: f64,
    checksum: f64,
}

fn parse_args() -> BenchConfig {
    let mut cfg = BenchConfig::default();
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--size" => {
                if let Some(v) = args.next() {
                    cfg.size = v.parse().expect("--size expects usize");
                }
            }
            "--radius" => {
                if let Some(v) = args.next() {
                    cfg.radius = v.parse().expect("--radius expects u32");
                }
            }
            "--warmup" => {
                if let Some(v) = args.next() {
                    cfg.warmup = v.parse().expect("--warmup expects u64");
                }
            }
            "--iters" => {
                if let Some(v) = args.next() {
                    cfg.iters = v.parse().expect("--iters expects u64");
                }
            }
            "--seed" => {
                if let Some(v) = args.next() {
                    cfg.seed = if let Some(hex) = v.strip_prefix("0x") {
                        u64::from_str_radix(hex, 16).expect("--seed hex parse failed")
                    } else {
                        v.parse().expect("--seed expects u64")
                    };
                }
            }
            "--threads" => {
                if let Some(v) = args.next() {
                    cfg.threads = Some(v.parse().expect("--threads expects usize"));
                }
            }
            "--json" => {
                cfg.json = true;
            }
            other => panic!("unknown arg: {other}"),
        }
    }
    cfg
}

fn seed_field(size: usize, seed: u64) -> Vec<f32> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    (0..size * size).map(|_| rng.gen::<f32>()).collect()
}

fn checksum(out: &[Counter]) -> f64 {
    out.iter().map(|c| c.sum as f64).sum()
}

fn run_direct(cfg: &BenchConfig, pool: &rayon::ThreadPool, field: &[f32]) -> RunResult {
    let params = ParameterSet {
        radius: cfg.radius,
        ..Default::default()
    };
    let weight = radial_weight(&params);
    let mut out = vec![Counter::default(); field.len()];

    for _ in 0..cfg.warmup {
        convolve::direct(pool, field, cfg.size, cfg.size, cfg.radius, weight, &mut out);
    }

    let start = Instant::now();
    for _ in 0..cfg.iters {
        convolve::direct(pool, field, cfg.size, cfg.size, cfg.radius, weight, &mut out);
    }
    let total_ms = start.elapsed().as_secs_f64() * 1000.0;

    RunResult {
        total_ms,
        avg_ms: total_ms / cfg.iters as f64,
        checksum: checksum(&out),
    }
}

fn run_two_pass(cfg: &BenchConfig, pool: &rayon::ThreadPool, field: &[f32]) -> RunResult {
    let params = ParameterSet {
        radius: cfg.radius,
        ..Default::default()
    };
    let weight = radial_weight(&params);
    let table = LineTable::disk(cfg.size, cfg.size, cfg.radius).expect("line table");
    let rows_per_cell = table.rows_per_cell();
    let mut counters = vec![Counter::default(); field.len() * rows_per_cell];
    let mut out = vec![Counter::default(); field.len()];

    let pass = |out: &mut [Counter], counters: &mut [Counter]| {
        convolve::pass_a(pool, field, cfg.size, &table, weight, counters);
        convolve::pass_b(pool, rows_per_cell, 0..rows_per_cell, counters, out);
    };

    for _ in 0..cfg.warmup {
        pass(&mut out, &mut counters);
    }

    let start = Instant::now();
    for _ in 0..cfg.iters {
        pass(&mut out, &mut counters);
    }
    let total_ms = start.elapsed().as_secs_f64() * 1000.0;

    RunResult {
        total_ms,
        avg_ms: total_ms / cfg.iters as f64,
        checksum: checksum(&out),
    }
}

fn main() {
    let cfg = parse_args();
    let pool = build_pool(resolve_thread_count(cfg.threads, None));
    let field = seed_field(cfg.size, cfg.seed);

    let direct = run_direct(&cfg, &pool, &field);
    let two_pass = run_two_pass(&cfg, &pool, &field);
    let speedup = direct.avg_ms / two_pass.avg_ms;

    if cfg.json {
        println!(
            "{{\"size\":{},\"radius\":{},\"warmup\":{},\"iters\":{},\"seed\":{},\"threads\":{},\"direct\":{{\"total_ms\":{:.6},\"avg_ms\":{:.6},\"checksum\":{:.6}}},\"two_pass\":{{\"total_ms\":{:.6},\"avg_ms\":{:.6},\"checksum\":{:.6}}},\"speedup\":{:.6}}}",
            cfg.size,
            cfg.radius,
            cfg.warmup,
            cfg.iters,
            cfg.seed,
            cfg.threads.unwrap_or(0),
            direct.total_ms,
            direct.avg_ms,
            direct.checksum,
            two_pass.total_ms,
            two_pass.avg_ms,
            two_pass.checksum,
            speedup,
        );
    } else {
        println!(
            "direct:   total_ms={:.6}, avg_ms={:.6}, checksum={:.6}",
            direct.total_ms, direct.avg_ms, direct.checksum
        );
        println!(
            "two-pass: total_ms={:.6}, avg_ms={:.6}, checksum={:.6}, speedup={:.3}x",
            two_pass.total_ms, two_pass.avg_ms, two_pass.checksum, speedup
        );
    }
}
