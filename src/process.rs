//! The learning process: conditions, schedules and trajectory evolution.
//!
//! A [`LearningProcess`] owns one [`TransitionMatrix`] per intervention
//! condition, the population's initial state, and a set of schedules. Each
//! schedule is evolved into a trajectory of `horizon` state vectors.
//!
//! Two modes:
//!
//! - **Explicit**: created with `schedule_count > 0`; schedules are supplied
//!   with [`LearningProcess::set_schedule`] and evolved one by one with
//!   [`LearningProcess::evolve_all`] (or together with
//!   [`LearningProcess::evolve_all_schedules`]).
//! - **Regular**: created with `schedule_count == 0`;
//!   [`LearningProcess::set_regular_schedule`] generates `horizon/2 + 1`
//!   schedules (treatment every k-th step, plus an all-control baseline) and
//!   evolves them all.
//!
//! Every completed evolution invalidates the stored comparison dataset, and
//! is written to `<output_dir>/<schedule>.csv` when an output directory is
//! configured.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::comparison::ComparisonDataset;
use crate::constants::{regular_schedule_count, MIN_CONDITIONS, MIN_MATRIX_SIZE};
use crate::error::ProcessError;
use crate::evolution::{advance, evolve_many, Trajectory};
use crate::schedule::regular_schedules;
use crate::stats::TTestResult;
use crate::storage::save_trajectory_csv;
use crate::transition::TransitionMatrix;

/// Treatment/control pair of a generated regular schedule family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegularPair {
    pub treatment: usize,
    pub control: usize,
}

#[derive(Debug, Clone)]
pub struct LearningProcess {
    pub(crate) matrices: Vec<TransitionMatrix>,
    pub(crate) state_size: usize,
    pub(crate) horizon: usize,
    /// 0 until a regular family is generated in regular mode.
    pub(crate) schedule_count: usize,
    pub(crate) initial_state: Option<Vec<f64>>,
    pub(crate) schedules: Vec<Option<Vec<usize>>>,
    pub(crate) trajectories: Vec<Trajectory>,
    pub(crate) evolved: Vec<bool>,
    /// Shared step cursor used by [`LearningProcess::step_once`].
    pub(crate) cursor: usize,
    pub(crate) regular: Option<RegularPair>,
    pub(crate) comparison: Option<ComparisonDataset>,
    pub(crate) regular_t_results: Vec<TTestResult>,
    pub(crate) output_dir: Option<PathBuf>,
}

impl LearningProcess {
    /// Create a process with `conditions` empty transition matrices of
    /// `state_size`, simulating `horizon` steps.
    ///
    /// `schedule_count == 0` selects regular mode (see
    /// [`set_regular_schedule`](Self::set_regular_schedule)).
    pub fn new(
        conditions: usize,
        state_size: usize,
        horizon: usize,
        schedule_count: usize,
    ) -> Result<Self, ProcessError> {
        let mut process = Self {
            matrices: Vec::new(),
            state_size: 0,
            horizon,
            schedule_count: 0,
            initial_state: None,
            schedules: Vec::new(),
            trajectories: Vec::new(),
            evolved: Vec::new(),
            cursor: 0,
            regular: None,
            comparison: None,
            regular_t_results: Vec::new(),
            output_dir: None,
        };
        process.add_conditions(conditions, state_size)?;
        process.allocate_schedules(schedule_count);
        Ok(process)
    }

    /// Persist every completed trajectory as `<dir>/<schedule>.csv`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn set_output_dir(&mut self, dir: Option<PathBuf>) {
        self.output_dir = dir;
    }

    pub fn output_dir(&self) -> Option<&Path> {
        self.output_dir.as_deref()
    }

    // ── Accessors ───────────────────────────────────────────────────

    pub fn condition_count(&self) -> usize {
        self.matrices.len()
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    pub fn horizon(&self) -> usize {
        self.horizon
    }

    pub fn schedule_count(&self) -> usize {
        self.schedule_count
    }

    pub fn current_step(&self) -> usize {
        self.cursor
    }

    pub fn is_regular(&self) -> bool {
        self.regular.is_some()
    }

    pub fn regular_pair(&self) -> Option<RegularPair> {
        self.regular
    }

    pub fn initial_state(&self) -> Option<&[f64]> {
        self.initial_state.as_deref()
    }

    pub fn matrix(&self, condition: usize) -> Option<&TransitionMatrix> {
        self.matrices.get(condition)
    }

    pub fn schedule(&self, index: usize) -> Option<&[usize]> {
        self.schedules.get(index)?.as_deref()
    }

    pub fn is_evolved(&self, index: usize) -> bool {
        self.evolved.get(index).copied().unwrap_or(false)
    }

    /// Results of the last [`compare_all_schedules_t`](Self::compare_all_schedules_t) run.
    pub fn regular_t_results(&self) -> &[TTestResult] {
        &self.regular_t_results
    }

    /// Completed trajectory of schedule `index`.
    pub fn trajectory(&self, index: usize) -> Result<&Trajectory, ProcessError> {
        self.check_schedule_index(index)?;
        if !self.evolved[index] {
            return Err(ProcessError::NotEvolved(index));
        }
        Ok(&self.trajectories[index])
    }

    // ── Configuration ───────────────────────────────────────────────

    /// Replace the condition set with `conditions` empty matrices of
    /// `state_size`.
    ///
    /// Existing trajectories are reset; an initial state of the wrong length
    /// is dropped.
    pub fn add_conditions(
        &mut self,
        conditions: usize,
        state_size: usize,
    ) -> Result<(), ProcessError> {
        if conditions < MIN_CONDITIONS {
            return Err(ProcessError::InvalidConditionCount(conditions));
        }
        if state_size < MIN_MATRIX_SIZE {
            return Err(ProcessError::InvalidStateSize(state_size));
        }

        self.matrices = (0..conditions)
            .map(|_| TransitionMatrix::new(state_size))
            .collect::<Result<_, _>>()?;
        self.state_size = state_size;

        if self
            .initial_state
            .as_ref()
            .is_some_and(|s| s.len() != state_size)
        {
            self.initial_state = None;
        }
        self.trajectories = vec![Trajectory::zeros(self.horizon, state_size); self.schedule_count];
        self.evolved = vec![false; self.schedule_count];
        self.cursor = 0;
        self.comparison = None;
        Ok(())
    }

    /// Set the ratio matrix of one condition.
    pub fn set_condition_matrix<R: AsRef<[f64]>>(
        &mut self,
        condition: usize,
        values: &[R],
    ) -> Result<(), ProcessError> {
        let len = self.matrices.len();
        let matrix = self
            .matrices
            .get_mut(condition)
            .ok_or(ProcessError::IndexOutOfRange {
                index: condition,
                len,
            })?;
        matrix.set_ratio(values)?;
        Ok(())
    }

    /// Set one condition's matrix from raw transition counts.
    pub fn set_condition_raw_counts<R: AsRef<[f64]>>(
        &mut self,
        condition: usize,
        values: &[R],
    ) -> Result<(), ProcessError> {
        let len = self.matrices.len();
        let matrix = self
            .matrices
            .get_mut(condition)
            .ok_or(ProcessError::IndexOutOfRange {
                index: condition,
                len,
            })?;
        matrix.set_raw_counts(values)?;
        Ok(())
    }

    /// Set the population distribution at t = 0.
    pub fn set_initial_state(&mut self, state: &[f64]) -> Result<(), ProcessError> {
        if state.len() != self.state_size {
            return Err(ProcessError::SizeMismatch {
                expected: self.state_size,
                actual: state.len(),
            });
        }
        self.initial_state = Some(state.to_vec());
        Ok(())
    }

    /// Store the condition sequence of schedule `index`.
    pub fn set_schedule(&mut self, index: usize, sequence: &[usize]) -> Result<(), ProcessError> {
        self.check_schedule_index(index)?;
        if sequence.len() != self.horizon {
            return Err(ProcessError::LengthMismatch {
                expected: self.horizon,
                actual: sequence.len(),
            });
        }
        let conditions = self.matrices.len();
        if let Some(&condition) = sequence.iter().find(|&&c| c >= conditions) {
            return Err(ProcessError::ConditionIndexOutOfRange {
                condition,
                conditions,
            });
        }

        self.schedules[index] = Some(sequence.to_vec());
        self.evolved[index] = false;
        if self
            .comparison
            .as_ref()
            .is_some_and(|ds| ds.schedule_a == index || ds.schedule_b == index)
        {
            self.comparison = None;
        }
        Ok(())
    }

    // ── Evolution ───────────────────────────────────────────────────

    /// Rewind the shared step cursor to t = 0.
    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// Advance schedule `index` by one step under `condition`, writing row
    /// `current_step()` of its trajectory and moving the shared cursor.
    pub fn step_once(&mut self, index: usize, condition: usize) -> Result<(), ProcessError> {
        self.check_schedule_index(index)?;
        if condition >= self.matrices.len() {
            return Err(ProcessError::ConditionIndexOutOfRange {
                condition,
                conditions: self.matrices.len(),
            });
        }
        let t = self.cursor;
        if t >= self.horizon {
            return Err(ProcessError::HorizonReached {
                schedule: index,
                horizon: self.horizon,
            });
        }

        let prev = if t == 0 {
            self.initial_state
                .clone()
                .ok_or(ProcessError::InitialStateNotSet)?
        } else {
            self.trajectories[index].row(t - 1).to_vec()
        };
        let out = self.trajectories[index].row_mut(t);
        advance(&self.matrices, index, t, condition, &prev, out)?;

        self.cursor += 1;
        Ok(())
    }

    /// Evolve schedule `index` over the full horizon.
    ///
    /// Marks the trajectory complete, invalidates the comparison dataset and
    /// writes `<index>.csv` when an output directory is set. Running it again
    /// reproduces the same trajectory.
    pub fn evolve_all(&mut self, index: usize) -> Result<(), ProcessError> {
        let sequence = self.ready_schedule(index)?.to_vec();
        self.warn_unset_conditions(&sequence);

        self.evolved[index] = false;
        self.cursor = 0;
        for &condition in &sequence {
            self.step_once(index, condition)?;
        }

        self.finish_evolution(index)?;
        debug!(schedule = index, steps = self.horizon, "evolution complete");
        Ok(())
    }

    /// Evolve every configured schedule in parallel.
    ///
    /// All schedules are validated before any work starts.
    pub fn evolve_all_schedules(&mut self) -> Result<(), ProcessError> {
        let t0 = Instant::now();
        let indices: Vec<usize> = (0..self.schedule_count).collect();
        for &i in &indices {
            self.ready_schedule(i)?;
        }
        if self.schedule_count == 0 {
            return Err(ProcessError::NoSchedulesConfigured);
        }

        let initial = self
            .initial_state
            .as_deref()
            .ok_or(ProcessError::InitialStateNotSet)?;
        let jobs: Vec<(usize, &[usize])> = indices
            .iter()
            .filter_map(|&i| Some((i, self.schedules[i].as_deref()?)))
            .collect();
        for (_, sequence) in &jobs {
            self.warn_unset_conditions(sequence);
        }

        let results = evolve_many(&self.matrices, initial, &jobs);
        let trajectories = results.into_iter().collect::<Result<Vec<_>, _>>()?;

        for (i, trajectory) in indices.iter().copied().zip(trajectories) {
            self.trajectories[i] = trajectory;
            self.evolved[i] = true;
        }
        self.cursor = self.horizon;
        self.comparison = None;
        self.persist_all(&indices)?;

        info!(
            schedules = indices.len(),
            elapsed_ms = t0.elapsed().as_secs_f64() * 1000.0,
            "evolved all schedules"
        );
        Ok(())
    }

    /// Generate and evolve the regular schedule family.
    ///
    /// Only valid in regular mode (created with `schedule_count == 0`).
    /// Schedule `i < horizon/2` applies `treatment` every `i + 1` steps
    /// starting at t = 0; the last schedule is all `control` and serves as
    /// the comparison baseline.
    pub fn set_regular_schedule(
        &mut self,
        treatment: usize,
        control: usize,
    ) -> Result<(), ProcessError> {
        if self.schedule_count > 0 {
            return Err(ProcessError::AlreadyConfigured {
                schedules: self.schedule_count,
            });
        }
        let conditions = self.matrices.len();
        for condition in [treatment, control] {
            if condition >= conditions {
                return Err(ProcessError::ConditionIndexOutOfRange {
                    condition,
                    conditions,
                });
            }
        }

        let count = regular_schedule_count(self.horizon);
        info!(
            treatment,
            control,
            schedules = count,
            horizon = self.horizon,
            "generating regular schedules"
        );
        self.allocate_schedules(count);
        for (slot, schedule) in self.schedules.iter_mut().zip(regular_schedules(
            self.horizon,
            treatment,
            control,
        )) {
            *slot = Some(schedule);
        }

        if let Err(e) = self.evolve_all_schedules() {
            self.allocate_schedules(0);
            return Err(e);
        }
        self.regular = Some(RegularPair { treatment, control });
        Ok(())
    }

    // ── Internals ───────────────────────────────────────────────────

    fn allocate_schedules(&mut self, count: usize) {
        self.schedule_count = count;
        self.schedules = vec![None; count];
        self.trajectories = vec![Trajectory::zeros(self.horizon, self.state_size); count];
        self.evolved = vec![false; count];
        self.regular_t_results.clear();
    }

    fn check_schedule_index(&self, index: usize) -> Result<(), ProcessError> {
        if index >= self.schedule_count {
            return Err(ProcessError::IndexOutOfRange {
                index,
                len: self.schedule_count,
            });
        }
        Ok(())
    }

    /// Validate that schedule `index` can be evolved and return its sequence.
    fn ready_schedule(&self, index: usize) -> Result<&[usize], ProcessError> {
        self.check_schedule_index(index)?;
        let sequence = self.schedules[index]
            .as_deref()
            .ok_or(ProcessError::EmptySchedule(index))?;
        if self.horizon == 0 || sequence.is_empty() {
            return Err(ProcessError::NoSchedulesConfigured);
        }
        if self.initial_state.is_none() {
            return Err(ProcessError::InitialStateNotSet);
        }
        Ok(sequence)
    }

    fn warn_unset_conditions(&self, sequence: &[usize]) {
        for (condition, matrix) in self.matrices.iter().enumerate() {
            if !matrix.is_set() && sequence.contains(&condition) {
                warn!(condition, "schedule uses a condition whose matrix was never set");
            }
        }
    }

    fn finish_evolution(&mut self, index: usize) -> Result<(), ProcessError> {
        self.evolved[index] = true;
        self.comparison = None;
        if let Some(dir) = &self.output_dir {
            save_trajectory_csv(dir, index, &self.trajectories[index])?;
        }
        Ok(())
    }

    /// Write each listed trajectory to its own file, in parallel.
    fn persist_all(&self, indices: &[usize]) -> Result<(), ProcessError> {
        let Some(dir) = &self.output_dir else {
            return Ok(());
        };
        indices
            .par_iter()
            .try_for_each(|&i| save_trajectory_csv(dir, i, &self.trajectories[i]).map(|_| ()))?;
        info!(dir = %dir.display(), files = indices.len(), "wrote trajectory files");
        Ok(())
    }
}
