//! Forward evolution of a population state through a schedule.
//!
//! Starting from the initial state vector, each step applies the transition
//! matrix of the condition scheduled at that step:
//!
//! ```text
//! row[0] = M[schedule[0]] · initial
//! row[t] = M[schedule[t]] · row[t-1]
//! ```
//!
//! Each schedule's trajectory depends only on the (read-only) matrices and
//! initial state, so [`evolve_many`] runs schedules in parallel with one
//! owned trajectory per rayon worker.

use rayon::prelude::*;
use serde::Serialize;

use crate::error::ProcessError;
use crate::transition::TransitionMatrix;

/// Evolved states for one schedule: `horizon` rows of `state_size` values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    state_size: usize,
    /// Row-major: `values[t * state_size + measure]`.
    values: Vec<f64>,
}

impl Trajectory {
    /// All-zero trajectory.
    pub fn zeros(horizon: usize, state_size: usize) -> Self {
        Self {
            state_size,
            values: vec![0.0; horizon * state_size],
        }
    }

    pub fn horizon(&self) -> usize {
        if self.state_size == 0 {
            0
        } else {
            self.values.len() / self.state_size
        }
    }

    pub fn state_size(&self) -> usize {
        self.state_size
    }

    /// State vector after step `t`.
    pub fn row(&self, t: usize) -> &[f64] {
        &self.values[t * self.state_size..(t + 1) * self.state_size]
    }

    /// Rows in time order (t = 0 first).
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.values.chunks_exact(self.state_size)
    }

    /// Population in `measure` after step `t`.
    pub fn value(&self, t: usize, measure: usize) -> f64 {
        self.values[t * self.state_size + measure]
    }

    pub(crate) fn row_mut(&mut self, t: usize) -> &mut [f64] {
        &mut self.values[t * self.state_size..(t + 1) * self.state_size]
    }

    /// Build from already-evolved rows (e.g. read back from CSV).
    ///
    /// `None` for a zero state size or a row of the wrong length.
    pub fn from_rows(state_size: usize, rows: Vec<Vec<f64>>) -> Option<Self> {
        if state_size == 0 || rows.iter().any(|r| r.len() != state_size) {
            return None;
        }
        Some(Self {
            state_size,
            values: rows.into_iter().flatten().collect(),
        })
    }
}

/// Apply the condition at step `t` to `prev`, writing into `out`.
pub(crate) fn advance(
    matrices: &[TransitionMatrix],
    schedule_index: usize,
    t: usize,
    condition: usize,
    prev: &[f64],
    out: &mut [f64],
) -> Result<(), ProcessError> {
    let matrix = matrices
        .get(condition)
        .ok_or(ProcessError::ConditionIndexOutOfRange {
            condition,
            conditions: matrices.len(),
        })?;
    matrix
        .step_into(prev, out)
        .map_err(|source| ProcessError::EvolutionError {
            schedule: schedule_index,
            step: t,
            source,
        })
}

/// Evolve `initial` through every step of `schedule`.
pub fn evolve_trajectory(
    matrices: &[TransitionMatrix],
    initial: &[f64],
    schedule_index: usize,
    schedule: &[usize],
) -> Result<Trajectory, ProcessError> {
    let state_size = initial.len();
    let mut trajectory = Trajectory::zeros(schedule.len(), state_size);
    let mut prev = initial.to_vec();

    for (t, &condition) in schedule.iter().enumerate() {
        let out = trajectory.row_mut(t);
        advance(matrices, schedule_index, t, condition, &prev, out)?;
        prev.copy_from_slice(out);
    }

    Ok(trajectory)
}

/// Evolve several `(schedule_index, schedule)` pairs in parallel.
///
/// Results come back in input order.
pub fn evolve_many(
    matrices: &[TransitionMatrix],
    initial: &[f64],
    schedules: &[(usize, &[usize])],
) -> Vec<Result<Trajectory, ProcessError>> {
    schedules
        .par_iter()
        .map(|&(index, schedule)| evolve_trajectory(matrices, initial, index, schedule))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrices() -> Vec<TransitionMatrix> {
        let mut a = TransitionMatrix::new(2).unwrap();
        a.set_ratio(&[[0.5, 0.25], [0.5, 0.75]]).unwrap();
        let mut b = TransitionMatrix::new(2).unwrap();
        b.set_ratio(&[[1.0, 0.0], [0.0, 1.0]]).unwrap();
        vec![a, b]
    }

    #[test]
    fn test_first_row_uses_initial_state() {
        let m = matrices();
        let traj = evolve_trajectory(&m, &[200.0, 0.0], 0, &[0, 1, 0]).unwrap();
        assert_eq!(traj.horizon(), 3);
        assert_eq!(traj.row(0), &[100.0, 100.0]);
        // Identity leaves the state alone.
        assert_eq!(traj.row(1), &[100.0, 100.0]);
        assert_eq!(traj.row(2), &[75.0, 125.0]);
    }

    #[test]
    fn test_rows_in_time_order() {
        let m = matrices();
        let traj = evolve_trajectory(&m, &[200.0, 0.0], 0, &[1, 0]).unwrap();
        let rows: Vec<&[f64]> = traj.rows().collect();
        assert_eq!(rows, vec![&[200.0, 0.0][..], &[100.0, 100.0][..]]);
        assert_eq!(traj.value(1, 1), 100.0);
    }

    #[test]
    fn test_bad_condition() {
        let m = matrices();
        let err = evolve_trajectory(&m, &[1.0, 1.0], 4, &[0, 7]).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::ConditionIndexOutOfRange {
                condition: 7,
                conditions: 2
            }
        ));
    }

    #[test]
    fn test_size_mismatch_reports_step() {
        let m = matrices();
        let err = evolve_trajectory(&m, &[1.0, 1.0, 1.0], 3, &[0, 0]).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::EvolutionError {
                schedule: 3,
                step: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let m = matrices();
        let s0 = vec![0, 0, 1, 0];
        let s1 = vec![1, 0, 1, 1];
        let parallel = evolve_many(&m, &[10.0, 30.0], &[(0, s0.as_slice()), (1, s1.as_slice())]);
        let seq0 = evolve_trajectory(&m, &[10.0, 30.0], 0, &s0).unwrap();
        let seq1 = evolve_trajectory(&m, &[10.0, 30.0], 1, &s1).unwrap();
        assert_eq!(parallel[0].as_ref().unwrap(), &seq0);
        assert_eq!(parallel[1].as_ref().unwrap(), &seq1);
    }

    #[test]
    fn test_from_rows_rejects_ragged() {
        assert!(Trajectory::from_rows(2, vec![vec![1.0, 2.0], vec![3.0]]).is_none());
        let t = Trajectory::from_rows(2, vec![vec![1.0, 2.0], vec![3.0, 4.0]]).unwrap();
        assert_eq!(t.horizon(), 2);
    }

    #[test]
    fn test_from_rows_rejects_zero_width() {
        assert!(Trajectory::from_rows(0, vec![]).is_none());
        assert!(Trajectory::from_rows(0, vec![vec![], vec![]]).is_none());
    }
}
