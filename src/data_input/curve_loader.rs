// src/data_input/curve_loader.rs

use std::fs;

use ndarray::Array1;

use crate::error::PlotError;
use crate::types::{CurveSet, PlotResult};

/// Reads one whitespace-delimited numeric table. Drops `skip_header`
/// leading lines and blank lines, turns unparseable cells into NaN, and
/// rejects rows whose width differs from the first data row.
pub(crate) fn read_numeric_rows(path: &str, skip_header: usize) -> PlotResult<Vec<Vec<f64>>> {
    let contents = fs::read_to_string(path)
        .map_err(|e| PlotError::data(format!("cannot read data file '{path}': {e}")))?;

    let mut rows: Vec<Vec<f64>> = Vec::new();
    let mut width = 0usize;

    for (idx, line) in contents.lines().enumerate().skip(skip_header) {
        let cells: Vec<f64> = line
            .split_whitespace()
            .map(|t| t.parse::<f64>().unwrap_or(f64::NAN))
            .collect();
        if cells.is_empty() {
            continue;
        }
        if rows.is_empty() {
            width = cells.len();
        } else if cells.len() != width {
            return Err(PlotError::data(format!(
                "data file '{path}' line {}: got {} values, expected {}",
                idx + 1,
                cells.len(),
                width
            )));
        }
        rows.push(cells);
    }

    if rows.is_empty() {
        return Err(PlotError::data(format!("data file '{path}' contains no data")));
    }
    Ok(rows)
}

/// Loads curve data from a list of files, one print line per file.
///
/// A single-row file yields one curve made of that row; a multi-row file
/// yields one curve per column. NaN cells are replaced by `nan_value`
/// before each curve is truncated to `max_points`. When `max_curves` is
/// positive, only the first that many curves survive.
pub fn load_curves(
    files: &[String],
    max_points: usize,
    skip_header: usize,
    nan_value: f64,
    max_curves: i64,
) -> PlotResult<CurveSet> {
    let mut curves: CurveSet = Vec::new();

    for file in files {
        println!("Loading file: {file}");
        let mut rows = read_numeric_rows(file, skip_header)?;

        for row in &mut rows {
            for cell in row.iter_mut() {
                if cell.is_nan() {
                    *cell = nan_value;
                }
            }
        }

        if rows.len() == 1 {
            let mut row = rows.remove(0);
            row.truncate(max_points);
            curves.push(Array1::from_vec(row));
        } else {
            let ncols = rows[0].len();
            for col in 0..ncols {
                let mut column: Vec<f64> = rows.iter().map(|r| r[col]).collect();
                column.truncate(max_points);
                curves.push(Array1::from_vec(column));
            }
        }
    }

    if max_curves > 0 {
        curves.truncate(max_curves as usize);
    }
    Ok(curves)
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn data_file(dir: &TempDir, name: &str, body: &str) -> String {
        let path: PathBuf = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn single_row_becomes_one_curve() {
        let dir = TempDir::new().unwrap();
        let f = data_file(&dir, "row.txt", "1.0 2.0 3.0 4.0\n");

        let curves = load_curves(&[f], 1000, 0, 0.0, -1).unwrap();
        assert_eq!(curves.len(), 1);
        assert_eq!(curves[0].to_vec(), vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn columns_split_into_curves_and_truncate() {
        let dir = TempDir::new().unwrap();
        let f = data_file(&dir, "cols.txt", "1 10\n2 20\n3 30\n4 40\n");

        let curves = load_curves(&[f], 3, 0, 0.0, -1).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(curves[1].to_vec(), vec![10.0, 20.0, 30.0]);
    }

    #[test]
    fn nan_cells_take_the_substitute_value() {
        let dir = TempDir::new().unwrap();
        let f = data_file(&dir, "gap.txt", "1\nx\n3\n");

        let curves = load_curves(&[f], 1000, 0, -1.0, -1).unwrap();
        assert_eq!(curves[0].to_vec(), vec![1.0, -1.0, 3.0]);
    }

    #[test]
    fn skip_header_drops_leading_lines() {
        let dir = TempDir::new().unwrap();
        let f = data_file(&dir, "head.txt", "epoch loss\n1 0.5\n2 0.25\n");

        let curves = load_curves(&[f], 1000, 1, 0.0, -1).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].to_vec(), vec![1.0, 2.0]);
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let dir = TempDir::new().unwrap();
        let f = data_file(&dir, "ragged.txt", "1 2\n3 4 5\n");

        let err = load_curves(&[f], 1000, 0, 0.0, -1).unwrap_err();
        assert!(err.to_string().contains("expected 2"));
    }

    #[test]
    fn empty_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let f = data_file(&dir, "empty.txt", "\n\n");

        let err = load_curves(&[f], 1000, 0, 0.0, -1).unwrap_err();
        assert!(err.to_string().contains("contains no data"));
    }

    #[test]
    fn max_curves_keeps_the_leading_curves() {
        let dir = TempDir::new().unwrap();
        let f = data_file(&dir, "wide.txt", "1 2 3\n4 5 6\n");

        let curves = load_curves(&[f], 1000, 0, 0.0, 2).unwrap();
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[1].to_vec(), vec![2.0, 5.0]);
    }
}

// src/data_input/curve_loader.rs
