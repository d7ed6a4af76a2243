//! Declarative simulation set-up, loaded from JSON.
//!
//! ```json
//! {
//!   "name": "attainable vs control",
//!   "horizon": 100,
//!   "conditions": [
//!     { "ratio": [[0.5625, 0.1], [0.4375, 0.9]] },
//!     { "raw": [[30, 12], [4, 21]] }
//!   ],
//!   "initial_state": [111, 127],
//!   "regular": { "treatment": 0, "control": 1 },
//!   "comparisons": [
//!     { "kind": "pair", "schedule_a": 10, "schedule_b": 50, "measure1": 0, "measure2": 1 },
//!     { "kind": "regular_t", "measure1": 0, "measure2": 1, "result_type": 0 }
//!   ]
//! }
//! ```
//!
//! Exactly one of `schedules` (explicit list) and `regular` must be given.
//! The state size is the length of `initial_state`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::comparison::MeasureSlot;
use crate::error::{ConfigError, StatsError};
use crate::process::LearningProcess;
use crate::schedule::{cyclic_schedule, expanding_interval_schedule};
use crate::stats::{MixedEffectsReport, MixedFit, TTestResult};

/// One condition's transition matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixSpec {
    /// Column-stochastic ratios; every column must sum to exactly 1.0.
    Ratio(Vec<Vec<f64>>),
    /// Transition counts, normalized per column.
    Raw(Vec<Vec<f64>>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleSpec {
    Explicit(Vec<usize>),
    Cyclic(Vec<usize>),
    ExpandingInterval {
        increment: usize,
        treatment: usize,
        control: usize,
    },
}

impl ScheduleSpec {
    /// Expand to one condition per step over `horizon`.
    pub fn resolve(&self, horizon: usize) -> Result<Vec<usize>, ConfigError> {
        Ok(match self {
            ScheduleSpec::Explicit(steps) => steps.clone(),
            ScheduleSpec::Cyclic(pattern) => cyclic_schedule(horizon, pattern)?,
            ScheduleSpec::ExpandingInterval {
                increment,
                treatment,
                control,
            } => expanding_interval_schedule(horizon, *increment, *treatment, *control),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegularSpec {
    pub treatment: usize,
    pub control: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComparisonRequest {
    /// t-test on every measure slot plus the four mixed-model fits.
    Pair {
        schedule_a: usize,
        schedule_b: usize,
        measure1: usize,
        measure2: usize,
    },
    RegularT {
        measure1: usize,
        measure2: usize,
        result_type: usize,
    },
    RegularMixed {
        measure1: usize,
        measure2: usize,
        result_type: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComparisonOutcome {
    Pair {
        t_tests: Vec<TTestResult>,
        mixed: MixedEffectsReport,
    },
    RegularT {
        results: Vec<TTestResult>,
    },
    RegularMixed {
        fits: Vec<MixedFit>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub horizon: usize,
    pub conditions: Vec<MatrixSpec>,
    pub initial_state: Vec<f64>,
    #[serde(default)]
    pub schedules: Vec<ScheduleSpec>,
    #[serde(default)]
    pub regular: Option<RegularSpec>,
    #[serde(default)]
    pub comparisons: Vec<ComparisonRequest>,
}

impl SimulationConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Configure and evolve a process. Trajectories are written to
    /// `output_dir` when given.
    pub fn build(&self, output_dir: Option<&Path>) -> Result<LearningProcess, ConfigError> {
        let explicit = match (self.schedules.is_empty(), self.regular.is_some()) {
            (false, false) => true,
            (true, true) => false,
            (false, true) => return Err(ConfigError::ScheduleSource("both")),
            (true, false) => return Err(ConfigError::ScheduleSource("neither")),
        };
        let schedule_count = if explicit { self.schedules.len() } else { 0 };

        let mut process = LearningProcess::new(
            self.conditions.len(),
            self.initial_state.len(),
            self.horizon,
            schedule_count,
        )?;
        process.set_output_dir(output_dir.map(Path::to_path_buf));

        for (i, spec) in self.conditions.iter().enumerate() {
            match spec {
                MatrixSpec::Ratio(values) => process.set_condition_matrix(i, values)?,
                MatrixSpec::Raw(values) => process.set_condition_raw_counts(i, values)?,
            }
        }
        process.set_initial_state(&self.initial_state)?;

        match self.regular {
            Some(RegularSpec { treatment, control }) if !explicit => {
                process.set_regular_schedule(treatment, control)?;
            }
            _ => {
                for (i, spec) in self.schedules.iter().enumerate() {
                    process.set_schedule(i, &spec.resolve(self.horizon)?)?;
                }
                process.evolve_all_schedules()?;
            }
        }

        info!(
            name = self.name.as_deref().unwrap_or("unnamed"),
            schedules = process.schedule_count(),
            horizon = self.horizon,
            "simulation built"
        );
        Ok(process)
    }

    /// Run every requested comparison against an evolved process, in order.
    pub fn run_comparisons(
        &self,
        process: &mut LearningProcess,
    ) -> Result<Vec<ComparisonOutcome>, ConfigError> {
        self.comparisons
            .iter()
            .map(|request| run_comparison(process, request))
            .collect()
    }
}

fn run_comparison(
    process: &mut LearningProcess,
    request: &ComparisonRequest,
) -> Result<ComparisonOutcome, ConfigError> {
    Ok(match *request {
        ComparisonRequest::Pair {
            schedule_a,
            schedule_b,
            measure1,
            measure2,
        } => {
            process.build_comparison(schedule_a, schedule_b, measure1, measure2)?;
            let t_tests = MeasureSlot::ALL
                .iter()
                .map(|slot| process.t_test(slot.index()))
                .collect::<Result<Vec<_>, StatsError>>()?;
            let mixed = process.mixed_effects_test()?;
            ComparisonOutcome::Pair { t_tests, mixed }
        }
        ComparisonRequest::RegularT {
            measure1,
            measure2,
            result_type,
        } => ComparisonOutcome::RegularT {
            results: process.compare_all_schedules_t(measure1, measure2, result_type)?,
        },
        ComparisonRequest::RegularMixed {
            measure1,
            measure2,
            result_type,
        } => ComparisonOutcome::RegularMixed {
            fits: process.compare_all_schedules_mixed(measure1, measure2, result_type)?,
        },
    })
}
