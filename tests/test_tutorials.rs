//! End-to-end scenarios on the Han et al. (2016) matrices.

use markov_learning::stats::RandomInterceptFitter;
use markov_learning::{
    ComparisonError, LearningProcess, MatrixError, MeasureSlot, ProcessError, StatsError,
    TransitionMatrix,
};

const ATTAINABLE: [[f64; 2]; 2] = [[18.0 / 32.0, 4.0 / 40.0], [14.0 / 32.0, 36.0 / 40.0]];
const EXTRAORDINARY: [[f64; 2]; 2] = [[30.0 / 34.0, 12.0 / 33.0], [4.0 / 34.0, 21.0 / 33.0]];
const CONTROL: [[f64; 2]; 2] = [[32.0 / 45.0, 14.0 / 50.0], [13.0 / 45.0, 36.0 / 50.0]];

fn han_process(schedules: usize) -> LearningProcess {
    let mut p = LearningProcess::new(3, 2, 100, schedules).unwrap();
    p.set_condition_matrix(0, &ATTAINABLE).unwrap();
    p.set_condition_matrix(1, &EXTRAORDINARY).unwrap();
    p.set_condition_matrix(2, &CONTROL).unwrap();
    p.set_initial_state(&[111.0, 127.0]).unwrap();
    p
}

#[test]
fn test_regular_attainable_vs_control() {
    let mut p = han_process(0);
    p.set_regular_schedule(0, 2).unwrap();
    assert_eq!(p.schedule_count(), 51);
    assert!((0..51).all(|i| p.is_evolved(i)));

    p.build_comparison(10, 50, 0, 1).unwrap();
    let r = p.t_test(0).unwrap();
    assert!(r.t_statistic.is_finite());
    assert!((0.0..=1.0).contains(&r.p_value));
    assert!((0.0..=1.0).contains(&r.corrected_p_value));
    assert!(r.cohens_d.is_finite());
    assert_eq!((r.schedule_a, r.schedule_b), (10, 50));

    let batch = p.compare_all_schedules_t(0, 1, 0).unwrap();
    assert_eq!(batch.len(), 50);
    // More frequent treatment moves the population further from baseline.
    assert!(batch[0].t_statistic.abs() > batch[49].t_statistic.abs());

    let fits = p.compare_all_schedules_mixed(0, 1, 0).unwrap();
    assert_eq!(fits.len(), 50);
}

#[test]
fn test_regular_extraordinary_vs_control() {
    let mut p = han_process(0);
    p.set_regular_schedule(1, 2).unwrap();
    p.build_comparison(10, 50, 0, 1).unwrap();
    let report = p.mixed_effects_test_with(&RandomInterceptFitter).unwrap();
    assert_eq!(report.fits.len(), 4);
    // Extraordinary keeps more of the population in state 0 than control.
    let y1 = report.fit(MeasureSlot::Value1).unwrap();
    assert!(y1.schedule_coefficient < 0.0);
}

#[test]
fn test_population_conserved_along_trajectory() {
    let mut p = han_process(0);
    p.set_regular_schedule(0, 2).unwrap();
    for i in [0, 10, 50] {
        for row in p.trajectory(i).unwrap().rows() {
            let total: f64 = row.iter().sum();
            assert!((total - 238.0).abs() < 1e-9, "schedule {i}: {total}");
        }
    }
}

#[test]
fn test_t_test_before_comparison() {
    let p = han_process(2);
    assert!(matches!(p.t_test(0), Err(StatsError::NoDatasetReady)));
}

#[test]
fn test_wrong_schedule_length() {
    let mut p = han_process(2);
    assert!(matches!(
        p.set_schedule(0, &[0; 99]),
        Err(ProcessError::LengthMismatch {
            expected: 100,
            actual: 99
        })
    ));
}

#[test]
fn test_resize_to_one() {
    let mut m = TransitionMatrix::new(2).unwrap();
    assert_eq!(m.resize(1), Err(MatrixError::InvalidSize { size: 1 }));
}

#[test]
fn test_self_comparison_and_unevolved() {
    let mut p = han_process(2);
    p.set_schedule(0, &[0; 100]).unwrap();
    p.set_schedule(1, &[2; 100]).unwrap();
    p.evolve_all(0).unwrap();
    assert_eq!(
        p.build_comparison(0, 0, 0, 1).unwrap_err(),
        ComparisonError::SameSchedule(0)
    );
    assert_eq!(
        p.build_comparison(0, 1, 0, 1).unwrap_err(),
        ComparisonError::ScheduleBNotEvolved(1)
    );
    p.evolve_all(1).unwrap();
    assert!(p.build_comparison(0, 1, 0, 1).is_ok());
}
