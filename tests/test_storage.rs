//! Trajectory, comparison and result files.

use std::fs;

use markov_learning::presets;
use markov_learning::storage::{
    load_trajectory_csv, save_comparison_csv, save_json, save_trajectory_csv, trajectory_path,
};
use markov_learning::{ComparisonDataset, LearningProcess, StorageError, Trajectory};

fn small_process() -> LearningProcess {
    let mut p = LearningProcess::new(2, 2, 5, 2).unwrap();
    p.set_condition_matrix(0, &[[0.5, 0.25], [0.5, 0.75]]).unwrap();
    p.set_condition_matrix(1, &[[1.0, 0.0], [0.0, 1.0]]).unwrap();
    p.set_initial_state(&[200.0, 0.0]).unwrap();
    p.set_schedule(0, &[0, 1, 0, 1, 0]).unwrap();
    p.set_schedule(1, &[1; 5]).unwrap();
    p
}

#[test]
fn test_evolve_writes_numbered_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = small_process().with_output_dir(dir.path());
    p.evolve_all(0).unwrap();
    p.evolve_all(1).unwrap();

    let text = fs::read_to_string(dir.path().join("0.csv")).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 5);
    assert_eq!(
        lines[0],
        "1.000000000000000000e2,1.000000000000000000e2"
    );

    let loaded = load_trajectory_csv(&dir.path().join("1.csv")).unwrap();
    assert_eq!(&loaded, p.trajectory(1).unwrap());
}

#[test]
fn test_parallel_evolution_writes_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let mut p = small_process().with_output_dir(dir.path());
    p.evolve_all_schedules().unwrap();
    for i in 0..2 {
        let loaded = load_trajectory_csv(&trajectory_path(dir.path(), i)).unwrap();
        assert_eq!(&loaded, p.trajectory(i).unwrap());
    }
}

#[test]
fn test_round_trip_preserves_bits() {
    let dir = tempfile::tempdir().unwrap();
    let traj = Trajectory::from_rows(
        3,
        vec![vec![1.0 / 3.0, 2.0 / 7.0, 1e-12], vec![123456.789, 0.0, 5.5]],
    )
    .unwrap();
    let path = save_trajectory_csv(dir.path(), 3, &traj).unwrap();
    assert_eq!(path, dir.path().join("3.csv"));
    assert_eq!(load_trajectory_csv(&path).unwrap(), traj);
}

#[test]
fn test_load_rejects_bad_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.csv");

    fs::write(&path, "1.0,2.0\n3.0\n").unwrap();
    assert!(matches!(
        load_trajectory_csv(&path),
        Err(StorageError::Parse { line: 2, .. })
    ));

    fs::write(&path, "1.0,abc\n").unwrap();
    assert!(matches!(
        load_trajectory_csv(&path),
        Err(StorageError::Parse { line: 1, .. })
    ));

    fs::write(&path, "").unwrap();
    assert!(matches!(
        load_trajectory_csv(&path),
        Err(StorageError::Parse { .. })
    ));
}

#[test]
fn test_comparison_csv_marks_missing_ratio() {
    let a = Trajectory::from_rows(2, vec![vec![4.0, 0.0], vec![3.0, 1.0]]).unwrap();
    let b = Trajectory::from_rows(2, vec![vec![2.0, 2.0], vec![1.0, 3.0]]).unwrap();
    let ds = ComparisonDataset::from_trajectories((0, &a), (1, &b), 0, 1).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cmp.csv");
    save_comparison_csv(&path, &ds).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "T,SCH,Y1,Y2,DIFF,RATIO");
    assert_eq!(lines[1], "0,0,4,0,4,NA");
    assert_eq!(lines[3], "0,1,2,2,0,1");
    assert_eq!(lines.len(), 5);
}

#[test]
fn test_results_json() {
    let config = presets::tutorial(1).unwrap();
    let mut process = config.build(None).unwrap();
    let outcomes = config.run_comparisons(&mut process).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("results.json");
    save_json(&path, &outcomes).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["kind"], "pair");
    assert_eq!(items[1]["kind"], "regular_t");
    assert_eq!(items[1]["results"].as_array().unwrap().len(), 50);
    assert_eq!(items[0]["t_tests"][0]["measure"], "value1");
}
