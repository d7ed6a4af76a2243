//! The four reference simulations as ready-made configurations.
//!
//! | Preset | Data | States | Schedules | Comparisons |
//! |--------|------|--------|-----------|-------------|
//! | 1 | Han et al. (2016) | 2 | regular, attainable (0) vs control (2) | pair 10/50, t batch, mixed batch |
//! | 2 | Han et al. (2016) | 2 | 50 expanding-interval schedules | none |
//! | 3 | hypothetical | 3 | regular, condition 0 vs 1 | pair 10/50, t batch, mixed batch |
//! | 4 | hypothetical | 3 | 5 cyclic mixed-intervention schedules | none |
//! | 5 | Han et al. (2016) | 2 | regular, extraordinary (1) vs control (2) | pair 10/50, t batch |
//!
//! The hypothetical matrices are written as decimals whose columns do not sum
//! to exactly 1.0 in binary floating point, so they are loaded as raw counts.

use crate::config::{
    ComparisonRequest, MatrixSpec, RegularSpec, ScheduleSpec, SimulationConfig,
};
use crate::error::ConfigError;

pub const PRESET_COUNT: u8 = 5;

const HORIZON: usize = 100;

fn han_conditions() -> Vec<MatrixSpec> {
    vec![
        // attainable
        MatrixSpec::Ratio(vec![
            vec![18.0 / 32.0, 4.0 / 40.0],
            vec![14.0 / 32.0, 36.0 / 40.0],
        ]),
        // extraordinary
        MatrixSpec::Ratio(vec![
            vec![30.0 / 34.0, 12.0 / 33.0],
            vec![4.0 / 34.0, 21.0 / 33.0],
        ]),
        // control
        MatrixSpec::Ratio(vec![
            vec![32.0 / 45.0, 14.0 / 50.0],
            vec![13.0 / 45.0, 36.0 / 50.0],
        ]),
    ]
}

fn regular_comparisons() -> Vec<ComparisonRequest> {
    vec![
        ComparisonRequest::Pair {
            schedule_a: 10,
            schedule_b: 50,
            measure1: 0,
            measure2: 1,
        },
        ComparisonRequest::RegularT {
            measure1: 0,
            measure2: 1,
            result_type: 0,
        },
        ComparisonRequest::RegularMixed {
            measure1: 0,
            measure2: 1,
            result_type: 0,
        },
    ]
}

fn raw(rows: [[f64; 3]; 3]) -> MatrixSpec {
    MatrixSpec::Raw(rows.iter().map(|r| r.to_vec()).collect())
}

/// Build preset `n` (1-5).
pub fn tutorial(n: u8) -> Result<SimulationConfig, ConfigError> {
    let config = match n {
        1 => SimulationConfig {
            name: Some("attainable vs control, regular intervals".into()),
            horizon: HORIZON,
            conditions: han_conditions(),
            initial_state: vec![111.0, 127.0],
            schedules: Vec::new(),
            regular: Some(RegularSpec {
                treatment: 0,
                control: 2,
            }),
            comparisons: regular_comparisons(),
        },
        2 => SimulationConfig {
            name: Some("attainable, expanding intervals".into()),
            horizon: HORIZON,
            conditions: han_conditions(),
            initial_state: vec![111.0, 127.0],
            schedules: (0..50)
                .map(|increment| ScheduleSpec::ExpandingInterval {
                    increment,
                    treatment: 0,
                    control: 2,
                })
                .collect(),
            regular: None,
            comparisons: Vec::new(),
        },
        3 => SimulationConfig {
            name: Some("hypothetical three-state, regular intervals".into()),
            horizon: HORIZON,
            conditions: vec![
                raw([[0.7, 0.5, 0.1], [0.2, 0.3, 0.2], [0.1, 0.2, 0.7]]),
                raw([[0.7, 0.3, 0.1], [0.2, 0.6, 0.6], [0.1, 0.1, 0.3]]),
                raw([[0.3, 0.1, 0.05], [0.5, 0.4, 0.15], [0.2, 0.5, 0.8]]),
            ],
            initial_state: vec![100.0, 100.0, 100.0],
            schedules: Vec::new(),
            regular: Some(RegularSpec {
                treatment: 0,
                control: 1,
            }),
            comparisons: regular_comparisons(),
        },
        4 => SimulationConfig {
            name: Some("hypothetical three-state, mixed interventions".into()),
            horizon: HORIZON,
            conditions: vec![
                raw([[0.7, 0.6, 0.1], [0.2, 0.3, 0.2], [0.1, 0.1, 0.7]]),
                raw([[0.3, 0.2, 0.1], [0.6, 0.7, 0.6], [0.1, 0.1, 0.3]]),
                raw([[0.3, 0.1, 0.05], [0.5, 0.4, 0.15], [0.2, 0.5, 0.8]]),
            ],
            initial_state: vec![1000.0, 1000.0, 1000.0],
            schedules: [vec![1, 0, 2], vec![0, 1, 2], vec![1, 1, 2], vec![0, 0, 2], vec![2]]
                .into_iter()
                .map(ScheduleSpec::Cyclic)
                .collect(),
            regular: None,
            comparisons: Vec::new(),
        },
        5 => SimulationConfig {
            name: Some("extraordinary vs control, regular intervals".into()),
            horizon: HORIZON,
            conditions: han_conditions(),
            initial_state: vec![111.0, 127.0],
            schedules: Vec::new(),
            regular: Some(RegularSpec {
                treatment: 1,
                control: 2,
            }),
            comparisons: regular_comparisons()
                .into_iter()
                .filter(|c| !matches!(c, ComparisonRequest::RegularMixed { .. }))
                .collect(),
        },
        other => return Err(ConfigError::UnknownPreset(other)),
    };
    Ok(config)
}
