//! Text I/O for trajectories, comparison datasets and results.
//!
//! | File | Format |
//! |------|--------|
//! | `<dir>/<i>.csv` | one row per step, state values comma-separated, `{:.18e}`, no header |
//! | comparison CSV | header `T,SCH,Y1,Y2,DIFF,RATIO`, undefined ratio as `NA` |
//! | results JSON | pretty-printed `serde_json` |

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::comparison::ComparisonDataset;
use crate::constants::{
    trajectory_file_name, MEASURE_COLUMNS, MISSING_VALUE, SCHEDULE_COLUMN, TIME_COLUMN,
};
use crate::error::StorageError;
use crate::evolution::Trajectory;

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> StorageError + '_ {
    move |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn create(path: &Path) -> Result<BufWriter<File>, StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err(parent))?;
    }
    Ok(BufWriter::new(File::create(path).map_err(io_err(path))?))
}

/// Path of schedule `index`'s trajectory file inside `dir`.
pub fn trajectory_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(trajectory_file_name(index))
}

/// Write one trajectory to `<dir>/<index>.csv`. Returns the file path.
pub fn save_trajectory_csv(
    dir: &Path,
    index: usize,
    trajectory: &Trajectory,
) -> Result<PathBuf, StorageError> {
    let path = trajectory_path(dir, index);
    let mut f = create(&path)?;
    let write = |f: &mut BufWriter<File>| -> std::io::Result<()> {
        for row in trajectory.rows() {
            let line: Vec<String> = row.iter().map(|v| format!("{:.18e}", v)).collect();
            writeln!(f, "{}", line.join(","))?;
        }
        f.flush()
    };
    write(&mut f).map_err(io_err(&path))?;
    Ok(path)
}

/// Read a trajectory CSV written by [`save_trajectory_csv`].
pub fn load_trajectory_csv(path: &Path) -> Result<Trajectory, StorageError> {
    let reader = BufReader::new(File::open(path).map_err(io_err(path))?);
    let mut rows: Vec<Vec<f64>> = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line.map_err(io_err(path))?;
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split(',')
            .map(|cell| cell.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::Parse {
                path: path.to_path_buf(),
                line: i + 1,
                message: e.to_string(),
            })?;
        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(StorageError::Parse {
                    path: path.to_path_buf(),
                    line: i + 1,
                    message: format!("expected {} values, got {}", first.len(), row.len()),
                });
            }
        }
        rows.push(row);
    }

    let Some(state_size) = rows.first().map(Vec::len) else {
        return Err(StorageError::Parse {
            path: path.to_path_buf(),
            line: 0,
            message: "no rows".to_string(),
        });
    };
    Trajectory::from_rows(state_size, rows).ok_or_else(|| StorageError::Parse {
        path: path.to_path_buf(),
        line: 0,
        message: "ragged rows".to_string(),
    })
}

/// Write the tidy comparison table.
pub fn save_comparison_csv(path: &Path, dataset: &ComparisonDataset) -> Result<(), StorageError> {
    let mut f = create(path)?;
    let write = |f: &mut BufWriter<File>| -> std::io::Result<()> {
        writeln!(
            f,
            "{},{},{}",
            TIME_COLUMN,
            SCHEDULE_COLUMN,
            MEASURE_COLUMNS.join(",")
        )?;
        for row in dataset.rows() {
            let ratio = row
                .ratio
                .map_or_else(|| MISSING_VALUE.to_string(), |r| r.to_string());
            writeln!(
                f,
                "{},{},{},{},{},{}",
                row.time, row.schedule_flag, row.value1, row.value2, row.difference, ratio
            )?;
        }
        f.flush()
    };
    write(&mut f).map_err(io_err(path))
}

/// Pretty-print any serializable result to `path`.
pub fn save_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), StorageError> {
    let mut f = create(path)?;
    serde_json::to_writer_pretty(&mut f, value)?;
    f.flush().map_err(io_err(path))
}
