#[cfg(feature = "mimalloc-global")]
#[global_allocator]
static GLOBAL_ALLOCATOR: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::time::Instant;

use soft_life::{Automaton, AutomatonConfig, RuleKind};

const SIDE: u32 = 512;
const TOTAL_ITERATIONS: u64 = 20;
const CHECK_INTERVAL: u64 = 5;
/// Max per-cell divergence tolerated between the brute-force and two-pass
/// Lenia engines at a checkpoint. Per-generation differences are pure
/// floating-point summation order; they compound slowly across generations.
const DRIFT_TOLERANCE: f32 = 1e-3;

struct MainArgs {
    config: AutomatonConfig,
    rule: Option<RuleKind>,
    pgo_train: bool,
}

fn parse_args() -> MainArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut config = AutomatonConfig::default();
    let mut rule = None;
    let mut pgo_train = false;
    let next_arg = |i: usize, flag: &str| -> &str {
        args.get(i)
            .map(String::as_str)
            .unwrap_or_else(|| panic!("{flag} requires a value"))
    };
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--threads" => {
                i += 1;
                let n: usize = next_arg(i, "--threads")
                    .parse()
                    .expect("--threads requires a positive integer");
                config = config.thread_count(n);
            }
            "--max-threads" => {
                i += 1;
                let n: usize = next_arg(i, "--max-threads")
                    .parse()
                    .expect("--max-threads requires a positive integer");
                config = config.max_threads(n);
            }
            "--seed" => {
                i += 1;
                let s: u64 = next_arg(i, "--seed")
                    .parse()
                    .expect("--seed requires a u64");
                config = config.seed(s);
            }
            "--rule" => {
                i += 1;
                rule = Some(match next_arg(i, "--rule").to_ascii_lowercase().as_str() {
                    "conway" => RuleKind::Conway,
                    "smooth" => RuleKind::SmoothLife,
                    "lenia" => RuleKind::Lenia,
                    "lenia-opt" => RuleKind::OptimizedLenia,
                    other => {
                        panic!("unknown rule: {other} (expected conway, smooth, lenia, or lenia-opt)")
                    }
                });
            }
            "--pgo-train" => {
                pgo_train = true;
            }
            other => panic!(
                "unknown argument: {other}\nusage: soft-life [--threads N] [--max-threads N] [--seed N] [--rule conway|smooth|lenia|lenia-opt] [--pgo-train]"
            ),
        }
        i += 1;
    }
    MainArgs {
        config,
        rule,
        pgo_train,
    }
}

fn max_cell_diff(a: &Automaton, b: &Automaton) -> f32 {
    a.field()
        .current()
        .iter()
        .zip(b.field().current())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f32::max)
}

/// Run the brute-force and two-pass Lenia engines side by side from the same
/// seed and report whether their fields stay equivalent.
fn run_checked(config: AutomatonConfig) {
    let mut reference = Automaton::with_config(SIDE, SIDE, RuleKind::Lenia, config.clone())
        .expect("reference engine construction");
    let mut optimized = Automaton::with_config(SIDE, SIDE, RuleKind::OptimizedLenia, config)
        .expect("optimized engine construction");

    let mut reference_total_duration = std::time::Duration::ZERO;
    let mut optimized_total_duration = std::time::Duration::ZERO;

    for checkpoint in 1..=(TOTAL_ITERATIONS / CHECK_INTERVAL) {
        let iteration = checkpoint * CHECK_INTERVAL;

        let start = Instant::now();
        reference.advance_n(CHECK_INTERVAL);
        let reference_phase = start.elapsed();
        reference_total_duration += reference_phase;

        let start = Instant::now();
        optimized.advance_n(CHECK_INTERVAL);
        let optimized_phase = start.elapsed();
        optimized_total_duration += optimized_phase;

        let reference_ms = reference_phase.as_secs_f64() * 1000.0;
        let optimized_ms = optimized_phase.as_secs_f64() * 1000.0;
        let reference_avg_ms = reference_ms / CHECK_INTERVAL as f64;
        let optimized_avg_ms = optimized_ms / CHECK_INTERVAL as f64;

        let diff = max_cell_diff(&reference, &optimized);
        let match_status = if diff <= DRIFT_TOLERANCE {
            "MATCH"
        } else {
            "MISMATCH"
        };
        println!(
            "Iteration {iteration}: reference mass = {:.3}, optimized mass = {:.3}, max diff = {diff:.2e} [{match_status}]",
            reference.mass(),
            optimized.mass()
        );
        println!(
            "  Direct: {reference_ms:.3} ms total, {reference_avg_ms:.3} ms/iter | Two-pass: {optimized_ms:.3} ms total, {optimized_avg_ms:.3} ms/iter"
        );
    }

    let reference_total_ms = reference_total_duration.as_secs_f64() * 1000.0;
    let optimized_total_ms = optimized_total_duration.as_secs_f64() * 1000.0;
    let reference_avg_ms = reference_total_ms / TOTAL_ITERATIONS as f64;
    let optimized_avg_ms = optimized_total_ms / TOTAL_ITERATIONS as f64;
    let speedup = reference_total_ms / optimized_total_ms;

    println!("\n--- Summary ({TOTAL_ITERATIONS} iterations) ---");
    println!("Direct:   {reference_total_ms:.3} ms total, {reference_avg_ms:.3} ms/iter");
    println!("Two-pass: {optimized_total_ms:.3} ms total, {optimized_avg_ms:.3} ms/iter");
    println!("Speedup (direct / two-pass): {speedup:.2}x");
}

/// Run a single rule and print its mass trajectory.
fn run_single(config: AutomatonConfig, rule: RuleKind) {
    let mut engine =
        Automaton::with_config(SIDE, SIDE, rule, config).expect("engine construction");

    for checkpoint in 1..=(TOTAL_ITERATIONS / CHECK_INTERVAL) {
        let iteration = checkpoint * CHECK_INTERVAL;
        let start = Instant::now();
        engine.advance_n(CHECK_INTERVAL);
        let ms = start.elapsed().as_secs_f64() * 1000.0;
        println!(
            "Iteration {iteration}: {rule:?} mass = {:.3} ({:.3} ms/iter)",
            engine.mass(),
            ms / CHECK_INTERVAL as f64
        );
    }
}

fn run_pgo_train(config: AutomatonConfig) {
    let mut engine = Automaton::with_config(SIDE, SIDE, RuleKind::OptimizedLenia, config)
        .expect("engine construction");
    engine.advance_n(TOTAL_ITERATIONS);
    std::hint::black_box(engine.mass());
}

fn main() {
    let args = parse_args();
    if args.pgo_train {
        run_pgo_train(args.config);
    } else if let Some(rule) = args.rule {
        run_single(args.config, rule);
    } else {
        run_checked(args.config);
    }
}
