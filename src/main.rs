//! Lineflow - Serial Production Line Evaluator
//!
//! Estimates steady-state throughput and inventory for a serial line of
//! stations with exponential service rates and finite buffers.
//!
//! # Usage
//!
//! ```bash
//! lineflow --rates 10,10,10,10 --capacities 1000,1000,1000
//! ```

use clap::Parser;
use lineflow_core::{
    error::Result, solver::SolverConfig, Decomposition, Line,
};

/// Serial production line throughput evaluator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Station service rates in flow order (comma-separated)
    #[arg(short, long, value_delimiter = ',', required = true)]
    rates: Vec<f64>,

    /// Buffer capacities in flow order, one fewer than rates (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    capacities: Vec<usize>,

    /// Relative throughput-agreement tolerance
    #[arg(short, long, default_value_t = lineflow_core::solver::DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Maximum number of decomposition sweeps
    #[arg(short, long, default_value_t = lineflow_core::solver::DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let line = Line::from_rates(&args.rates, &args.capacities);
    let config = SolverConfig::new()
        .with_tolerance(args.tolerance)
        .with_max_iterations(args.max_iterations);

    let result = Decomposition::with_config(line, config).solve()?;

    println!("Throughput: {:.6}", result.throughput);
    println!("Iterations: {}", result.iterations);

    if !result.per_buffer.is_empty() {
        println!();
        println!("Buffer  Starving  Blocking  Mean inventory");
        for (i, kpis) in result.per_buffer.iter().enumerate() {
            println!(
                "{:>6}  {:>8.5}  {:>8.5}  {:>14.4}",
                i, kpis.starving_prob, kpis.blocking_prob, kpis.mean_inventory
            );
        }
    }

    Ok(())
}
