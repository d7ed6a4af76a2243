//! Shared constants: dimension floors, dataset column names, file formats.
//!
//! The comparison dataset mirrors the tidy table used in Han et al. (2016):
//!
//! | Column | Meaning |
//! |--------|---------|
//! | `T` | time index (random-effect grouping) |
//! | `SCH` | schedule-member flag: 0 = schedule A, 1 = schedule B |
//! | `Y1` | first selected measure |
//! | `Y2` | second selected measure |
//! | `DIFF` | `Y1 - Y2` |
//! | `RATIO` | `Y1 / Y2` |

/// Smallest valid transition-matrix dimension (and population state count).
pub const MIN_MATRIX_SIZE: usize = 2;

/// Smallest number of intervention conditions a process can hold.
pub const MIN_CONDITIONS: usize = 2;

/// Number of derived measure columns in a comparison dataset (Y1, Y2, DIFF, RATIO).
pub const MEASURE_SLOT_COUNT: usize = 4;

/// Column header of the time index.
pub const TIME_COLUMN: &str = "T";

/// Column header of the schedule-member flag (fixed effect).
pub const SCHEDULE_COLUMN: &str = "SCH";

/// Column headers of the four derived measures, indexed by measure slot.
pub const MEASURE_COLUMNS: [&str; MEASURE_SLOT_COUNT] = ["Y1", "Y2", "DIFF", "RATIO"];

/// Placeholder written for an undefined ratio cell in comparison CSV output.
pub const MISSING_VALUE: &str = "NA";

/// Default output directory when `MARKOV_OUTPUT_DIR` is unset.
pub const DEFAULT_OUTPUT_DIR: &str = ".";

/// Default rayon worker count when neither `RAYON_NUM_THREADS` nor
/// `OMP_NUM_THREADS` is set.
pub const DEFAULT_THREADS: usize = 8;

/// File name of a persisted trajectory: `<schedule>.csv`.
pub fn trajectory_file_name(schedule: usize) -> String {
    format!("{}.csv", schedule)
}

/// Number of schedules in a regular family over `horizon` steps:
/// one per intervention interval 1..=horizon/2, plus the all-control baseline.
#[inline]
pub fn regular_schedule_count(horizon: usize) -> usize {
    horizon / 2 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_schedule_count() {
        assert_eq!(regular_schedule_count(100), 51);
        assert_eq!(regular_schedule_count(101), 51);
        assert_eq!(regular_schedule_count(1), 1);
        assert_eq!(regular_schedule_count(0), 1);
    }

    #[test]
    fn test_trajectory_file_name() {
        assert_eq!(trajectory_file_name(0), "0.csv");
        assert_eq!(trajectory_file_name(50), "50.csv");
    }
}
