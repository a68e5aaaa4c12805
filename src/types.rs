// src/types.rs
// Shared aliases for the numeric containers moved between loading,
// sorting, and rendering.

use ndarray::{Array1, Array2};

use crate::error::PlotError;

/// One column of samples from a data file. Immutable after load apart
/// from the sort permutation applied uniformly across a curve set.
pub type Curve = Array1<f64>;

/// Ordered list of curves, in file/column order.
pub type CurveSet = Vec<Curve>;

/// Bar-chart input: rows are bars within a group, columns are groups.
pub type BarMatrix = Array2<f64>;

pub type PlotResult<T> = Result<T, PlotError>;

// src/types.rs
