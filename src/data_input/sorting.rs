// src/data_input/sorting.rs

use std::cmp::Ordering;

use ndarray::Array1;

use crate::error::PlotError;
use crate::types::{Curve, PlotResult};

/// How curve values are reordered before plotting. Sorting is keyed on
/// the first curve's Y values and applied to every curve uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortMode {
    None,
    Ascend,
    Descend,
}

impl SortMode {
    pub fn parse(name: &str) -> PlotResult<SortMode> {
        match name.to_ascii_lowercase().as_str() {
            "none" => Ok(SortMode::None),
            "ascend" => Ok(SortMode::Ascend),
            "descend" => Ok(SortMode::Descend),
            other => Err(PlotError::config(format!("unknown sort_data mode '{other}'"))),
        }
    }
}

/// Reorders every Y curve (and the x tick labels, when present) by the
/// first curve's values. All X curves must be identical, since one
/// permutation is applied across the whole set while the X values stay
/// in place.
pub fn sort_curves(
    xs: &[Curve],
    ys: &mut [Curve],
    xticklabel: &mut Vec<String>,
    mode: SortMode,
) -> PlotResult<()> {
    for pair in xs.windows(2) {
        if pair[0] != pair[1] {
            return Err(PlotError::data("x values are not equal, cannot be sorted"));
        }
    }

    if mode == SortMode::None || ys.is_empty() {
        return Ok(());
    }

    let mut order: Vec<usize> = (0..ys[0].len()).collect();
    {
        let key = &ys[0];
        order.sort_by(|&a, &b| key[a].partial_cmp(&key[b]).unwrap_or(Ordering::Equal));
    }
    if mode == SortMode::Descend {
        order.reverse();
    }

    for y in ys.iter_mut() {
        let permuted: Vec<f64> = order.iter().map(|&i| y[i]).collect();
        *y = Array1::from_vec(permuted);
    }

    if !xticklabel.is_empty() {
        if xticklabel.len() < order.len() {
            return Err(PlotError::data(format!(
                "{} x tick labels cannot be reordered over {} points",
                xticklabel.len(),
                order.len()
            )));
        }
        *xticklabel = order.iter().map(|&i| xticklabel[i].clone()).collect();
    }

    Ok(())
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;

    fn curve(values: &[f64]) -> Curve {
        Array1::from_vec(values.to_vec())
    }

    #[test]
    fn parse_accepts_the_three_modes() {
        assert_eq!(SortMode::parse("None").unwrap(), SortMode::None);
        assert_eq!(SortMode::parse("ascend").unwrap(), SortMode::Ascend);
        assert_eq!(SortMode::parse("descend").unwrap(), SortMode::Descend);
        assert!(SortMode::parse("shuffled").is_err());
    }

    #[test]
    fn ascend_orders_every_curve_by_the_first() {
        let xs = vec![curve(&[0.0, 1.0, 2.0]), curve(&[0.0, 1.0, 2.0])];
        let mut ys = vec![curve(&[3.0, 1.0, 2.0]), curve(&[30.0, 10.0, 20.0])];
        let mut labels = vec!["c".to_string(), "a".to_string(), "b".to_string()];

        sort_curves(&xs, &mut ys, &mut labels, SortMode::Ascend).unwrap();
        assert_eq!(ys[0].to_vec(), vec![1.0, 2.0, 3.0]);
        assert_eq!(ys[1].to_vec(), vec![10.0, 20.0, 30.0]);
        assert_eq!(labels, ["a", "b", "c"]);
    }

    #[test]
    fn descend_is_the_reversed_ascend_order() {
        let xs = vec![curve(&[0.0, 1.0, 2.0])];
        let mut ys = vec![curve(&[3.0, 1.0, 2.0])];
        let mut labels = Vec::new();

        sort_curves(&xs, &mut ys, &mut labels, SortMode::Descend).unwrap();
        assert_eq!(ys[0].to_vec(), vec![3.0, 2.0, 1.0]);
    }

    #[test]
    fn none_leaves_everything_in_place() {
        let xs = vec![curve(&[0.0, 1.0])];
        let mut ys = vec![curve(&[2.0, 1.0])];
        let mut labels = vec!["x".to_string(), "y".to_string()];

        sort_curves(&xs, &mut ys, &mut labels, SortMode::None).unwrap();
        assert_eq!(ys[0].to_vec(), vec![2.0, 1.0]);
        assert_eq!(labels, ["x", "y"]);
    }

    #[test]
    fn unequal_x_curves_cannot_be_sorted() {
        let xs = vec![curve(&[0.0, 1.0]), curve(&[0.0, 2.0])];
        let mut ys = vec![curve(&[1.0, 2.0]), curve(&[3.0, 4.0])];

        let err = sort_curves(&xs, &mut ys, &mut Vec::new(), SortMode::Ascend).unwrap_err();
        assert!(err.to_string().contains("cannot be sorted"));
    }
}

// src/data_input/sorting.rs
