//! # Markov learning: intervention schedules over a population Markov chain
//!
//! Simulates how a population moves between behavioural states (e.g.
//! participating / non-participating) when each time step applies one of
//! several intervention conditions, then compares two schedules' outcomes
//! statistically, following Han et al. (2016).
//!
//! ## Pipeline
//!
//! | Stage | Module | Description |
//! |-------|--------|-------------|
//! | 1 | [`transition`] | One column-stochastic matrix per condition; validated ratio or raw-count input |
//! | 2 | [`process`], [`evolution`], [`schedule`] | Evolve the initial state through each schedule: `row[t] = M[schedule[t]] · row[t-1]` |
//! | 3 | [`comparison`] | Tidy `T, SCH, Y1, Y2, DIFF, RATIO` dataset for two evolved schedules |
//! | 4 | [`analysis`], [`stats`] | Pooled t-test (Cohen's D, Šídák correction) and random-intercept mixed model |
//!
//! ## Modes
//!
//! - **Explicit**: a fixed number of schedules, each set with
//!   [`LearningProcess::set_schedule`](process::LearningProcess::set_schedule).
//! - **Regular**: `horizon/2 + 1` generated schedules (treatment every k-th
//!   step, k = 1..=horizon/2) with an all-control baseline; batch comparisons
//!   test each against the baseline.
//!
//! Independent schedules evolve in parallel on the rayon pool. Trajectories
//! are persisted as `<i>.csv` when the process has an output directory
//! ([`storage`]).
//!
//! Reproducible set-ups live in [`config`] (JSON) and [`presets`].

pub mod analysis;
pub mod comparison;
pub mod config;
pub mod constants;
pub mod env_config;
pub mod error;
pub mod evolution;
pub mod presets;
pub mod process;
pub mod schedule;
pub mod stats;
pub mod storage;
pub mod transition;

pub use analysis::compare_processes;
pub use comparison::{ComparisonDataset, ComparisonRow, MeasureSlot};
pub use config::SimulationConfig;
pub use error::{
    ComparisonError, ConfigError, FitError, MatrixError, ProcessError, StatsError, StorageError,
};
pub use evolution::Trajectory;
pub use process::LearningProcess;
pub use transition::TransitionMatrix;
