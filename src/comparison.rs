//! Tidy comparison dataset between two evolved schedules.
//!
//! For schedules A and B and two measures (state categories) m1, m2, the
//! dataset holds `2 · horizon` rows in long format:
//!
//! | rows | `SCH` | values from |
//! |------|-------|-------------|
//! | `0..horizon` | 0 | schedule A |
//! | `horizon..2·horizon` | 1 | schedule B |
//!
//! Every row carries `T`, `SCH`, `Y1 = m1`, `Y2 = m2`, `DIFF = Y1 - Y2` and
//! `RATIO = Y1 / Y2`, all computed from that row's own trajectory. `RATIO` is
//! `None` when `Y2` is zero.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::MEASURE_COLUMNS;
use crate::error::{ComparisonError, StatsError};
use crate::evolution::Trajectory;
use crate::process::LearningProcess;

/// One of the four derived measure columns of a comparison row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureSlot {
    Value1,
    Value2,
    Difference,
    Ratio,
}

impl MeasureSlot {
    pub const ALL: [MeasureSlot; 4] = [
        MeasureSlot::Value1,
        MeasureSlot::Value2,
        MeasureSlot::Difference,
        MeasureSlot::Ratio,
    ];

    pub fn index(self) -> usize {
        match self {
            MeasureSlot::Value1 => 0,
            MeasureSlot::Value2 => 1,
            MeasureSlot::Difference => 2,
            MeasureSlot::Ratio => 3,
        }
    }

    /// Dataset column header (`Y1`, `Y2`, `DIFF`, `RATIO`).
    pub fn column(self) -> &'static str {
        MEASURE_COLUMNS[self.index()]
    }
}

impl TryFrom<usize> for MeasureSlot {
    type Error = usize;

    fn try_from(slot: usize) -> Result<Self, usize> {
        MeasureSlot::ALL.get(slot).copied().ok_or(slot)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub time: usize,
    pub schedule_flag: u8,
    pub value1: f64,
    pub value2: f64,
    pub difference: f64,
    pub ratio: Option<f64>,
}

impl ComparisonRow {
    pub fn new(time: usize, schedule_flag: u8, value1: f64, value2: f64) -> Self {
        Self {
            time,
            schedule_flag,
            value1,
            value2,
            difference: value1 - value2,
            ratio: if value2 == 0.0 {
                None
            } else {
                Some(value1 / value2)
            },
        }
    }

    pub fn get(&self, slot: MeasureSlot) -> Option<f64> {
        match slot {
            MeasureSlot::Value1 => Some(self.value1),
            MeasureSlot::Value2 => Some(self.value2),
            MeasureSlot::Difference => Some(self.difference),
            MeasureSlot::Ratio => self.ratio,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonDataset {
    pub schedule_a: usize,
    pub schedule_b: usize,
    pub measure1: usize,
    pub measure2: usize,
    rows: Vec<ComparisonRow>,
}

impl ComparisonDataset {
    /// Assemble the dataset from two trajectories of equal horizon.
    ///
    /// Both measures must be columns of both trajectories.
    pub fn from_trajectories(
        (schedule_a, traj_a): (usize, &Trajectory),
        (schedule_b, traj_b): (usize, &Trajectory),
        measure1: usize,
        measure2: usize,
    ) -> Result<Self, ComparisonError> {
        let state_size = traj_a.state_size().min(traj_b.state_size());
        if measure1 >= state_size {
            return Err(ComparisonError::Measure1OutOfRange {
                measure: measure1,
                state_size,
            });
        }
        if measure2 >= state_size {
            return Err(ComparisonError::Measure2OutOfRange {
                measure: measure2,
                state_size,
            });
        }
        let horizon = traj_a.horizon().min(traj_b.horizon());
        let mut rows = Vec::with_capacity(2 * horizon);
        for (flag, traj) in [(0u8, traj_a), (1u8, traj_b)] {
            rows.extend((0..horizon).map(|t| {
                ComparisonRow::new(t, flag, traj.value(t, measure1), traj.value(t, measure2))
            }));
        }
        Ok(Self {
            schedule_a,
            schedule_b,
            measure1,
            measure2,
            rows,
        })
    }

    pub fn horizon(&self) -> usize {
        self.rows.len() / 2
    }

    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    /// Rows of one schedule member: 0 = A, 1 = B.
    pub fn group(&self, flag: u8) -> &[ComparisonRow] {
        let h = self.horizon();
        match flag {
            0 => &self.rows[..h],
            _ => &self.rows[h..],
        }
    }

    /// One measure column for one schedule member.
    pub fn values(&self, slot: MeasureSlot, flag: u8) -> Result<Vec<f64>, StatsError> {
        self.group(flag)
            .iter()
            .map(|row| {
                row.get(slot).ok_or(StatsError::UndefinedRatio {
                    time: row.time,
                    flag: row.schedule_flag,
                })
            })
            .collect()
    }
}

impl LearningProcess {
    /// Build and store the comparison dataset between schedules `a` and `b`
    /// on measures `m1` and `m2`.
    ///
    /// Checks run in a fixed order: measure 1, measure 2, distinct measures,
    /// schedule A, schedule B, distinct schedules, A evolved, B evolved.
    pub fn build_comparison(
        &mut self,
        a: usize,
        b: usize,
        m1: usize,
        m2: usize,
    ) -> Result<&ComparisonDataset, ComparisonError> {
        let state_size = self.state_size;
        let schedules = self.schedule_count;

        if m1 >= state_size {
            return Err(ComparisonError::Measure1OutOfRange {
                measure: m1,
                state_size,
            });
        }
        if m2 >= state_size {
            return Err(ComparisonError::Measure2OutOfRange {
                measure: m2,
                state_size,
            });
        }
        if m1 == m2 {
            return Err(ComparisonError::SameMeasure(m1));
        }
        if a >= schedules {
            return Err(ComparisonError::ScheduleAOutOfRange {
                schedule: a,
                schedules,
            });
        }
        if b >= schedules {
            return Err(ComparisonError::ScheduleBOutOfRange {
                schedule: b,
                schedules,
            });
        }
        if a == b {
            return Err(ComparisonError::SameSchedule(a));
        }
        if !self.evolved[a] {
            return Err(ComparisonError::ScheduleANotEvolved(a));
        }
        if !self.evolved[b] {
            return Err(ComparisonError::ScheduleBNotEvolved(b));
        }

        debug!(a, b, m1, m2, "building comparison dataset");
        let dataset = ComparisonDataset::from_trajectories(
            (a, &self.trajectories[a]),
            (b, &self.trajectories[b]),
            m1,
            m2,
        )?;
        Ok(self.comparison.insert(dataset))
    }

    /// The last dataset built, unless an evolution has invalidated it.
    pub fn comparison(&self) -> Option<&ComparisonDataset> {
        self.comparison.as_ref()
    }
}
