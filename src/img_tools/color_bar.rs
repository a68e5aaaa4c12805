// src/img_tools/color_bar.rs

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use ndarray::Array3;

use crate::error::PlotError;
use crate::img_tools::raster;
use crate::types::PlotResult;

// Reference colorbars for figures: a vertical (or transposed horizontal)
// gradient strip through a named palette.

// Classic jet breakpoints, piecewise-linear per channel. The viridis
// palette comes from colorous; jet has no counterpart there.
const JET_RED: [(f64, f64); 5] = [(0.0, 0.0), (0.35, 0.0), (0.66, 1.0), (0.89, 1.0), (1.0, 0.5)];
const JET_GREEN: [(f64, f64); 6] = [
    (0.0, 0.0),
    (0.125, 0.0),
    (0.375, 1.0),
    (0.64, 1.0),
    (0.91, 0.0),
    (1.0, 0.0),
];
const JET_BLUE: [(f64, f64); 5] = [(0.0, 0.5), (0.11, 1.0), (0.34, 1.0), (0.65, 0.0), (1.0, 0.0)];

enum Palette {
    Jet,
    Viridis,
}

impl Palette {
    fn parse(name: &str) -> PlotResult<Palette> {
        match name {
            "jet" => Ok(Palette::Jet),
            "viridis" => Ok(Palette::Viridis),
            other => Err(PlotError::unsupported("colormap", other.to_string())),
        }
    }

    fn color_at(&self, t: f64) -> [f32; 3] {
        match self {
            Palette::Jet => [
                piecewise(&JET_RED, t) as f32,
                piecewise(&JET_GREEN, t) as f32,
                piecewise(&JET_BLUE, t) as f32,
            ],
            Palette::Viridis => {
                let color = colorous::VIRIDIS.eval_continuous(t);
                [
                    color.r as f32 / 255.0,
                    color.g as f32 / 255.0,
                    color.b as f32 / 255.0,
                ]
            }
        }
    }
}

fn piecewise(points: &[(f64, f64)], t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    for pair in points.windows(2) {
        let (x0, y0) = pair[0];
        let (x1, y1) = pair[1];
        if t <= x1 {
            return y0 + (y1 - y0) * (t - x0) / (x1 - x0);
        }
    }
    points[points.len() - 1].1
}

/// Builds the gradient strip: row `i` carries the palette color for
/// `i / (height - 1)`, replicated across the width.
pub fn build_colorbar(height: usize, width: usize, palette: &str) -> PlotResult<Array3<f32>> {
    let palette = Palette::parse(palette)?;
    let mut bar = Array3::<f32>::zeros((height, width, 3));
    for row in 0..height {
        let t = if height > 1 {
            row as f64 / (height - 1) as f64
        } else {
            0.0
        };
        let [red, green, blue] = palette.color_at(t);
        for col in 0..width {
            bar[[row, col, 0]] = red;
            bar[[row, col, 1]] = green;
            bar[[row, col, 2]] = blue;
        }
    }
    Ok(bar)
}

/// Output path: `<save_dir>/color_bar_<palette>[_horz].<format>`.
pub fn colorbar_save_path(save_dir: &Path, palette: &str, horizontal: bool, format: &str) -> PathBuf {
    let mut name = format!("color_bar_{palette}");
    if horizontal {
        name.push_str("_horz");
    }
    save_dir.join(format!("{name}.{format}"))
}

/// Builds, optionally transposes, and saves a colorbar, returning the
/// written path.
pub fn render_colorbar(
    height: usize,
    width: usize,
    palette: &str,
    horizontal: bool,
    save_dir: &Path,
    format: &str,
) -> PlotResult<PathBuf> {
    let mut bar = build_colorbar(height, width, palette)?;
    if horizontal {
        bar = bar.permuted_axes([1, 0, 2]);
    }
    fs::create_dir_all(save_dir)?;
    let save_name = colorbar_save_path(save_dir, palette, horizontal, format);
    raster::save_image(&bar, &save_name)?;
    println!("  Colorbar saved as '{}'.", save_name.display());
    Ok(save_name)
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn unknown_colormaps_are_rejected() {
        let err = build_colorbar(4, 2, "plasma").unwrap_err();
        assert!(err.to_string().contains("plasma"));
    }

    #[test]
    fn jet_runs_from_dark_blue_to_dark_red() {
        let bar = build_colorbar(11, 1, "jet").unwrap();
        assert_eq!(bar.dim(), (11, 1, 3));
        // First row is the low end (half blue), last row the high end.
        assert_eq!(bar[[0, 0, 0]], 0.0);
        assert!((bar[[0, 0, 2]] - 0.5).abs() < 1e-6);
        assert!((bar[[10, 0, 0]] - 0.5).abs() < 1e-6);
        assert_eq!(bar[[10, 0, 2]], 0.0);
        // Mid-ramp green saturates.
        assert!((bar[[5, 0, 1]] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn horizontal_bars_transpose_and_tag_the_name() {
        let dir = tempdir().unwrap();
        let path = render_colorbar(6, 3, "viridis", true, dir.path(), "png").unwrap();
        assert!(path.file_name().unwrap().to_str().unwrap() == "color_bar_viridis_horz.png");
        let written = raster::read_image(&path).unwrap();
        assert_eq!(written.dim(), (3, 6, 3));
    }
}

// src/img_tools/color_bar.rs
