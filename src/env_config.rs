//! Environment configuration shared by the simulation binary and library
//! callers.
//!
//! | Variable | Default | Used for |
//! |----------|---------|----------|
//! | `MARKOV_OUTPUT_DIR` | `.` | where `<i>.csv` trajectories are written |
//! | `RAYON_NUM_THREADS` | `OMP_NUM_THREADS`, then 8 | global rayon pool size |

use std::path::PathBuf;

use tracing::info;

use crate::constants::{DEFAULT_OUTPUT_DIR, DEFAULT_THREADS};

pub const OUTPUT_DIR_VAR: &str = "MARKOV_OUTPUT_DIR";

/// Read `MARKOV_OUTPUT_DIR` (default `"."`).
pub fn output_dir() -> PathBuf {
    PathBuf::from(std::env::var(OUTPUT_DIR_VAR).unwrap_or_else(|_| DEFAULT_OUTPUT_DIR.to_string()))
}

/// Read `RAYON_NUM_THREADS` (fallback `OMP_NUM_THREADS`, default 8).
pub fn thread_count() -> usize {
    parse_threads(
        std::env::var("RAYON_NUM_THREADS")
            .or_else(|_| std::env::var("OMP_NUM_THREADS"))
            .ok(),
    )
}

fn parse_threads(value: Option<String>) -> usize {
    value
        .and_then(|s| s.trim().parse().ok())
        .filter(|&n: &usize| n > 0)
        .unwrap_or(DEFAULT_THREADS)
}

/// Build the rayon global thread pool. Returns thread count.
pub fn init_rayon_threads() -> Result<usize, rayon::ThreadPoolBuildError> {
    let num_threads = thread_count();
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()?;
    info!(threads = num_threads, "rayon pool ready");
    Ok(num_threads)
}

/// Like [`init_rayon_threads`] but tolerates an already-initialized pool.
/// Returns thread count.
pub fn init_rayon_threads_lenient() -> usize {
    let num_threads = thread_count();
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
        .ok(); // Fails if a global pool already exists
    info!(threads = num_threads, "rayon pool ready");
    num_threads
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_threads() {
        assert_eq!(parse_threads(None), DEFAULT_THREADS);
        assert_eq!(parse_threads(Some("4".into())), 4);
        assert_eq!(parse_threads(Some(" 12 ".into())), 12);
        assert_eq!(parse_threads(Some("0".into())), DEFAULT_THREADS);
        assert_eq!(parse_threads(Some("many".into())), DEFAULT_THREADS);
    }

    #[test]
    fn test_lenient_init_tolerates_existing_pool() {
        let first = init_rayon_threads_lenient();
        assert!(first >= 1);
        assert_eq!(init_rayon_threads_lenient(), first);
    }
}
