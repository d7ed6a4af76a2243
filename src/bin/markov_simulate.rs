use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use markov_learning::config::ComparisonOutcome;
use markov_learning::env_config;
use markov_learning::presets;
use markov_learning::storage::save_json;
use markov_learning::SimulationConfig;

#[derive(Parser)]
#[command(name = "markov-simulate")]
#[command(about = "Evolve intervention schedules and compare their trajectories", long_about = None)]
struct Cli {
    /// Built-in simulation (1-5)
    #[arg(long, conflicts_with = "config")]
    preset: Option<u8>,

    /// JSON simulation config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory for <i>.csv trajectories (default: $MARKOV_OUTPUT_DIR or .)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write comparison results as JSON
    #[arg(long)]
    results: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let config = match (cli.preset, &cli.config) {
        (Some(n), None) => presets::tutorial(n)?,
        (None, Some(path)) => SimulationConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        _ => bail!("pass exactly one of --preset <1-{}> or --config <file>", presets::PRESET_COUNT),
    };

    let threads = env_config::init_rayon_threads()?;
    let output_dir = cli.output.unwrap_or_else(env_config::output_dir);

    println!("=== markov-simulate ===");
    println!(
        "{}: {} conditions, {} states, horizon {}",
        config.name.as_deref().unwrap_or("config"),
        config.conditions.len(),
        config.initial_state.len(),
        config.horizon
    );
    println!("Output: {}  Threads: {}", output_dir.display(), threads);

    let t0 = Instant::now();
    let mut process = config.build(Some(&output_dir))?;
    println!(
        "Evolved {} schedules in {:.1} ms",
        process.schedule_count(),
        t0.elapsed().as_secs_f64() * 1000.0
    );

    let outcomes = config.run_comparisons(&mut process)?;
    for outcome in &outcomes {
        print_outcome(outcome);
    }

    if let Some(path) = &cli.results {
        save_json(path, &outcomes)?;
        println!("\nResults written to {}", path.display());
    }
    Ok(())
}

fn print_outcome(outcome: &ComparisonOutcome) {
    match outcome {
        ComparisonOutcome::Pair { t_tests, mixed } => {
            println!(
                "\n--- Schedule {} vs {} ---",
                mixed.schedule_a, mixed.schedule_b
            );
            println!(
                "{:>6} {:>12} {:>12} {:>12} {:>10}",
                "DV", "t", "p", "p (Šídák)", "Cohen's D"
            );
            for r in t_tests {
                println!(
                    "{:>6} {:>12.4} {:>12.4e} {:>12.4e} {:>10.4}",
                    r.measure.column(),
                    r.t_statistic,
                    r.p_value,
                    r.corrected_p_value,
                    r.cohens_d
                );
            }
            println!("{:>12} {:>12} {:>10} {:>12}", "formula", "SCH coef", "z", "p");
            for f in &mixed.fits {
                println!(
                    "{:>12} {:>12.4} {:>10.3} {:>12.4e}",
                    f.formula, f.schedule_coefficient, f.z_value, f.p_value
                );
            }
        }
        ComparisonOutcome::RegularT { results } => {
            println!("\n--- t-test: every interval vs baseline ---");
            println!(
                "{:>5} {:>12} {:>12} {:>12} {:>10}",
                "sched", "t", "p", "p (Šídák)", "Cohen's D"
            );
            for r in results {
                println!(
                    "{:>5} {:>12.4} {:>12.4e} {:>12.4e} {:>10.4}",
                    r.schedule_a, r.t_statistic, r.p_value, r.corrected_p_value, r.cohens_d
                );
            }
        }
        ComparisonOutcome::RegularMixed { fits } => {
            println!("\n--- mixed model: every interval vs baseline ---");
            for (i, f) in fits.iter().enumerate() {
                println!(
                    "{:>5} {:>12} coef {:>12.4}  z {:>9.3}  p {:.4e}",
                    i, f.formula, f.schedule_coefficient, f.z_value, f.p_value
                );
            }
        }
    }
}
