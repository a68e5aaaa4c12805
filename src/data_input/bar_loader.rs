// src/data_input/bar_loader.rs

use crate::data_input::curve_loader::read_numeric_rows;
use crate::error::PlotError;
use crate::types::{BarMatrix, PlotResult};

/// Loads the bar-chart matrix: exactly one file, rows are the bars within
/// a group and columns are the groups. A single-row file becomes a 1xN
/// matrix. Values are kept as read, NaN cells included; bar data is never
/// truncated.
pub fn load_bar_matrix(files: &[String], skip_header: usize) -> PlotResult<BarMatrix> {
    if files.len() != 1 {
        return Err(PlotError::data(format!(
            "bar charts read exactly one data file, got {}",
            files.len()
        )));
    }

    let rows = read_numeric_rows(&files[0], skip_header)?;
    let nrows = rows.len();
    let ncols = rows[0].len();
    let flat: Vec<f64> = rows.into_iter().flatten().collect();

    BarMatrix::from_shape_vec((nrows, ncols), flat)
        .map_err(|e| PlotError::data(format!("data file '{}': {e}", files[0])))
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn data_file(dir: &TempDir, name: &str, body: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn exactly_one_file_is_required() {
        let dir = TempDir::new().unwrap();
        let a = data_file(&dir, "a.txt", "1 2\n");
        let b = data_file(&dir, "b.txt", "3 4\n");

        assert!(load_bar_matrix(&[a.clone(), b], 0).is_err());
        assert!(load_bar_matrix(&[a], 0).is_ok());
    }

    #[test]
    fn single_row_becomes_one_by_n() {
        let dir = TempDir::new().unwrap();
        let f = data_file(&dir, "row.txt", "0.3 0.5 0.7\n");

        let matrix = load_bar_matrix(&[f], 0).unwrap();
        assert_eq!(matrix.shape(), [1, 3]);
        assert_eq!(matrix[[0, 2]], 0.7);
    }

    #[test]
    fn matrix_keeps_shape_and_nan_cells() {
        let dir = TempDir::new().unwrap();
        let f = data_file(&dir, "groups.txt", "1 2 3\n4 x 6\n");

        let matrix = load_bar_matrix(&[f], 0).unwrap();
        assert_eq!(matrix.shape(), [2, 3]);
        assert_eq!(matrix[[1, 0]], 4.0);
        assert!(matrix[[1, 1]].is_nan());
    }
}

// src/data_input/bar_loader.rs
