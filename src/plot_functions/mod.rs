// src/plot_functions/mod.rs

pub mod plot_bars;
pub mod plot_curves;
pub mod plot_twins;

use std::path::Path;

use crate::config::options::{PlotOptions, PlotType};
use crate::types::PlotResult;

/// Renders the figure a parsed config describes, writing it to
/// `save_name`.
pub fn render_figure(opts: &PlotOptions, save_name: &Path) -> PlotResult<()> {
    match opts.plot_type {
        PlotType::Ploty | PlotType::Plotxy => plot_curves::plot_curves(opts, save_name),
        PlotType::Plottwins => plot_twins::plot_twins(opts, save_name),
        PlotType::Plotbar => plot_bars::plot_bars(opts, save_name),
    }
}

// src/plot_functions/mod.rs
