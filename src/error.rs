//! Typed failures for every layer of the pipeline.
//!
//! Each layer owns one enum; lower-layer errors are wrapped rather than
//! flattened so callers can still match the original cause. Expected
//! validation failures are always returned, never panicked.

use std::path::PathBuf;

use thiserror::Error;

// ── Transition matrix ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatrixError {
    #[error("matrix size {size} is invalid (must be at least 2)")]
    InvalidSize { size: usize },

    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("column {column} sums to {sum}, not 1.0")]
    NotStochastic { column: usize, sum: f64 },
}

// ── Learning process ────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("condition count {0} is invalid (must be at least 2)")]
    InvalidConditionCount(usize),

    #[error("state size {0} is invalid (must be at least 2)")]
    InvalidStateSize(usize),

    #[error("index {index} out of range (0..{len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("state vector has length {actual}, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("schedule has length {actual}, expected horizon {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("condition {condition} out of range (0..{conditions})")]
    ConditionIndexOutOfRange { condition: usize, conditions: usize },

    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("evolution of schedule {schedule} failed at step {step}")]
    EvolutionError {
        schedule: usize,
        step: usize,
        #[source]
        source: MatrixError,
    },

    #[error("schedule {schedule} already reached the horizon ({horizon} steps)")]
    HorizonReached { schedule: usize, horizon: usize },

    #[error("schedule {0} has no condition sequence")]
    EmptySchedule(usize),

    #[error("no schedules are configured")]
    NoSchedulesConfigured,

    #[error("initial state has not been set")]
    InitialStateNotSet,

    #[error("{schedules} explicit schedules are already configured")]
    AlreadyConfigured { schedules: usize },

    #[error("schedule {0} has not been evolved")]
    NotEvolved(usize),

    #[error("schedule pattern is empty")]
    EmptyPattern,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

// ── Comparison dataset ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComparisonError {
    #[error("measure 1 ({measure}) out of range (0..{state_size})")]
    Measure1OutOfRange { measure: usize, state_size: usize },

    #[error("measure 2 ({measure}) out of range (0..{state_size})")]
    Measure2OutOfRange { measure: usize, state_size: usize },

    #[error("cannot compare measure {0} with itself")]
    SameMeasure(usize),

    #[error("schedule A ({schedule}) out of range (0..{schedules})")]
    ScheduleAOutOfRange { schedule: usize, schedules: usize },

    #[error("schedule B ({schedule}) out of range (0..{schedules})")]
    ScheduleBOutOfRange { schedule: usize, schedules: usize },

    #[error("cannot compare schedule {0} with itself")]
    SameSchedule(usize),

    #[error("schedule A ({0}) has not been evolved")]
    ScheduleANotEvolved(usize),

    #[error("schedule B ({0}) has not been evolved")]
    ScheduleBNotEvolved(usize),
}

// ── Statistics ──────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StatsError {
    #[error("no comparison dataset is ready")]
    NoDatasetReady,

    #[error("measure slot {0} is not one of 0 (Y1), 1 (Y2), 2 (DIFF), 3 (RATIO)")]
    InvalidMeasureSlot(usize),

    #[error("degenerate sample: {0}")]
    DegenerateSample(&'static str),

    #[error("ratio undefined at T={time}, SCH={flag} (zero denominator)")]
    UndefinedRatio { time: usize, flag: u8 },

    #[error("batch comparison requires a regular schedule family")]
    RegularScheduleRequired,

    #[error("measure {measure} out of range (0..{state_size})")]
    MeasureOutOfRange { measure: usize, state_size: usize },

    #[error("result type {0} is not one of 0 (Y1), 1 (Y2), 2 (DIFF), 3 (RATIO)")]
    InvalidResultType(usize),

    #[error("building comparison for schedule {schedule} failed")]
    ComparisonBuildFailed {
        schedule: usize,
        #[source]
        source: ComparisonError,
    },

    #[error("test for schedule {schedule} failed")]
    TestFailed {
        schedule: usize,
        #[source]
        source: Box<StatsError>,
    },

    #[error("fitting `{formula}` failed")]
    FitFailed {
        formula: String,
        #[source]
        source: FitError,
    },

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),
}

/// Failure raised across the mixed-model fitter boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    #[error("missing {column} value at T={time}")]
    MissingValue { column: &'static str, time: usize },

    #[error("need at least 2 groups, got {0}")]
    TooFewGroups(usize),

    #[error("group T={time} does not hold exactly one observation per schedule")]
    UnbalancedGroup { time: usize },

    #[error("singular fit: {0}")]
    Singular(&'static str),
}

// ── Storage ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON serialization failed")]
    Json(#[from] serde_json::Error),

    #[error("{path}:{line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

// ── Configuration ───────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON")]
    Parse(#[from] serde_json::Error),

    #[error("unknown preset {0} (available: 1-5)")]
    UnknownPreset(u8),

    #[error("config must give either `schedules` or `regular`, not {0}")]
    ScheduleSource(&'static str),

    #[error(transparent)]
    Process(#[from] ProcessError),

    #[error(transparent)]
    Comparison(#[from] ComparisonError),

    #[error(transparent)]
    Stats(#[from] StatsError),
}
