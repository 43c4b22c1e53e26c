//! Benchmark runner for the matmul strategies.

use std::process::ExitCode;
use std::time::Instant;

use matmul::compare::first_mismatch;
use matmul::{MatmulConfig, Matrix, Strategy, Tolerance, multiply_with};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const SIZES: [usize; 3] = [256, 512, 1024];
const ITERATIONS: usize = 3;
const SEED: u64 = 42;

/// (strategy, average ms, GFLOPS) for one size. `None` when the strategy
/// refused to run on this machine.
type SizeResults = Vec<(Strategy, Option<(f64, f64)>)>;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = match MatmulConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "bad configuration");
            return ExitCode::FAILURE;
        }
    };

    println!("=== Matrix Multiplication Benchmark ===\n");
    println!("CPU Features: {}", config.cpu);
    info!(
        block_size = config.block_size,
        dc_threshold = config.dc_threshold,
        workers = config.workers,
        vector_isa = ?config.vector_isa,
        "config"
    );
    println!();

    let mut rng = StdRng::seed_from_u64(SEED);
    let mut all_results = Vec::new();
    let mut failed = false;

    for &size in &SIZES {
        println!("Matrix: {}×{}", size, size);
        println!("{}", "-".repeat(50));

        let a = Matrix::random(size, size, &mut rng);
        let b = Matrix::random(size, size, &mut rng);
        let reference = match multiply_with(Strategy::Reference, &a, &b, &config) {
            Ok(c) => c,
            Err(err) => {
                error!(%err, size, "reference failed");
                return ExitCode::FAILURE;
            }
        };

        let mut results: SizeResults = Vec::new();
        for strategy in Strategy::ALL {
            match bench_strategy(strategy, &a, &b, &config, &reference) {
                Ok(timing) => results.push((strategy, Some(timing))),
                Err(BenchError::Refused(err)) => {
                    warn!(%strategy, %err, "skipped");
                    results.push((strategy, None));
                }
                Err(BenchError::Wrong(msg)) => {
                    error!(%strategy, size, "{}", msg);
                    failed = true;
                    results.push((strategy, None));
                }
            }
        }

        let baseline_time = results[0].1.map(|(ms, _)| ms).unwrap_or(f64::NAN);
        for (i, (strategy, timing)) in results.iter().enumerate() {
            match timing {
                Some((time_ms, gflops)) => println!(
                    "{}. {:16} {:8.2} ms  {:6.2} GFLOPS  ({:.1}×)",
                    i + 1,
                    strategy.name(),
                    time_ms,
                    gflops,
                    baseline_time / time_ms
                ),
                None => println!("{}. {:16} {:>8}", i + 1, strategy.name(), "n/a"),
            }
        }
        println!();

        all_results.push((size, results));
    }

    print_summary_table(&all_results);

    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

enum BenchError {
    Refused(matmul::MatmulError),
    Wrong(String),
}

/// Warm up once, check against the reference, then time `ITERATIONS` runs.
fn bench_strategy(
    strategy: Strategy,
    a: &Matrix,
    b: &Matrix,
    config: &MatmulConfig,
    reference: &Matrix,
) -> Result<(f64, f64), BenchError> {
    let warmup = multiply_with(strategy, a, b, config).map_err(BenchError::Refused)?;
    // Entries are in [0, 1), so no cancellation: a relative bound covers
    // reordered summation.
    if let Some(m) = first_mismatch(reference, &warmup, Tolerance::new(1e-9, 1e-9)) {
        return Err(BenchError::Wrong(format!(
            "wrong result at ({}, {}): expected {}, got {}",
            m.row, m.col, m.expected, m.actual
        )));
    }

    let mut total = 0.0;
    for _ in 0..ITERATIONS {
        let start = Instant::now();
        let c = multiply_with(strategy, a, b, config).map_err(BenchError::Refused)?;
        total += start.elapsed().as_secs_f64();
        std::hint::black_box(c);
    }

    let (m, k) = a.shape();
    let n = b.cols();
    let avg = total / ITERATIONS as f64;
    let gflops = 2.0 * (m * n * k) as f64 / avg / 1e9;
    Ok((avg * 1000.0, gflops))
}

fn print_summary_table(all_results: &[(usize, SizeResults)]) {
    println!("\n{}", "=".repeat(90));
    println!("SUMMARY");
    println!("{}", "=".repeat(90));

    print!("\n{:<18}", "Method");
    for (size, _) in all_results {
        print!(" {:>14}", format!("{}×{}", size, size));
    }
    println!(" {:>12}", "Speedup");
    println!("{}", "-".repeat(90));

    for (idx, strategy) in Strategy::ALL.iter().enumerate() {
        print!("{:<18}", strategy.name());

        let mut speedups = Vec::new();
        for (_, results) in all_results {
            match results[idx].1 {
                Some((time_ms, gflops)) => {
                    print!(" {:>10.2} GF ", gflops);
                    if let Some((baseline_ms, _)) = results[0].1 {
                        speedups.push(baseline_ms / time_ms);
                    }
                }
                None => print!(" {:>14}", "n/a"),
            }
        }

        if speedups.is_empty() {
            println!(" {:>12}", "n/a");
        } else {
            let avg_speedup = speedups.iter().sum::<f64>() / speedups.len() as f64;
            println!(" {:>10.1}×", avg_speedup);
        }
    }

    println!("{}", "=".repeat(90));
    println!("\nGF = GFLOPS (billion floating point operations per second)");
    println!("Speedup relative to reference (i-j-k). Higher is better.\n");
}
