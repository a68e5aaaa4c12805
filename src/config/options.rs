// src/config/options.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::store::ConfigStore;
use crate::data_input::sorting::SortMode;
use crate::error::PlotError;
use crate::types::PlotResult;

/// Which of the four chart shapes a config file asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlotType {
    /// Y values only; x is synthesized as 0..n-1 per curve.
    Ploty,
    /// Curves alternate x, y, x, y, ... and are paired in order.
    Plotxy,
    /// Two Y curves sharing an x axis, one per y axis.
    Plottwins,
    /// Grouped bar chart from a single matrix file.
    Plotbar,
}

impl PlotType {
    pub fn parse(name: &str) -> PlotResult<PlotType> {
        match name {
            "ploty" => Ok(PlotType::Ploty),
            "plotxy" => Ok(PlotType::Plotxy),
            "plottwins" => Ok(PlotType::Plottwins),
            "plotbar" => Ok(PlotType::Plotbar),
            other => Err(PlotError::config(format!("unknown plot type '{other}'"))),
        }
    }
}

/// Immutable, fully typed view of a parsed [`ConfigStore`]. Built once
/// after parsing (and after any command-line format override) and handed
/// unchanged through the pipeline.
#[derive(Debug, Clone)]
pub struct PlotOptions {
    pub plot_type: PlotType,
    pub format: String,

    // Canvas, in inches and dots per inch.
    pub width: f64,
    pub height: f64,
    pub dpi: f64,

    pub title: String,
    pub title_font: String,
    pub xlabel: String,
    pub xlabel_font: String,
    pub ylabel: Vec<String>,
    pub ylabel_font: String,

    pub xticklabel: Vec<String>,
    pub xtick_font: String,
    pub xtick_rot: f64,
    pub yticklabel: Vec<String>,
    pub ytick: Vec<String>,
    pub ytick_font: String,
    pub ytick_rot: f64,

    // Infinite values mean "take the range from the data".
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: Vec<String>,
    pub y_max: Vec<String>,

    pub legend_loc: String,
    pub legend: Vec<String>,
    pub legend_ncol: usize,
    pub legend_font: String,
    pub bbox_to_anchor: Vec<String>,
    pub custom_legend: bool,

    pub grid_on: bool,

    pub datafile: Vec<String>,
    pub max_point_num: usize,
    pub sort_data: SortMode,

    pub color: Vec<String>,
    pub linewidth: f64,
    pub line_style: Vec<String>,
    pub max_curve_num: i64,
    pub markersize: f64,
    pub marker: Vec<String>,
    pub draw_dot: bool,
    pub dotsize: f64,

    pub bar_width: f64,
    pub opacity: Vec<String>,
    pub put_text: bool,
    pub text_font: f64,
    pub text_prec: String,
    pub percentage: bool,

    pub source_path: PathBuf,
}

impl PlotOptions {
    /// Resolves a parsed store into typed options. Fails on an unknown
    /// plot type or sort literal, and on an unreadable `xtick_path`.
    pub fn from_store(store: &ConfigStore) -> PlotResult<PlotOptions> {
        let source_path = store.source_path().to_path_buf();
        let base_dir = source_path.parent().unwrap_or_else(|| Path::new(""));

        let mut xticklabel = store.list("xticklabel")?.to_vec();
        let xtick_path = store.text("xtick_path")?;
        if !xtick_path.is_empty() {
            xticklabel = read_tick_labels(xtick_path, base_dir)?;
        }

        Ok(PlotOptions {
            plot_type: PlotType::parse(store.text("plot_type")?)?,
            format: store.text("format")?.to_string(),

            width: store.number("width")?,
            height: store.number("height")?,
            dpi: store.number("dpi")?,

            title: store.text("title")?.to_string(),
            title_font: store.text("title_font")?.to_string(),
            xlabel: store.text("xlabel")?.to_string(),
            xlabel_font: store.text("xlabel_font")?.to_string(),
            ylabel: store.list("ylabel")?.to_vec(),
            ylabel_font: store.text("ylabel_font")?.to_string(),

            xticklabel,
            xtick_font: store.text("xtick_font")?.to_string(),
            xtick_rot: store.number("xtick_rot")?,
            yticklabel: store.list("yticklabel")?.to_vec(),
            ytick: store.list("ytick")?.to_vec(),
            ytick_font: store.text("ytick_font")?.to_string(),
            ytick_rot: store.number("ytick_rot")?,

            x_min: store.number("x_min")?,
            x_max: store.number("x_max")?,
            y_min: store.list("y_min")?.to_vec(),
            y_max: store.list("y_max")?.to_vec(),

            legend_loc: store.text("legend_loc")?.to_string(),
            legend: store.list("legend")?.to_vec(),
            legend_ncol: store.number("legend_ncol")?.max(1.0) as usize,
            legend_font: store.text("legend_font")?.to_string(),
            bbox_to_anchor: store.list("bbox_to_anchor")?.to_vec(),
            custom_legend: store.flag("custom_legend")?,

            grid_on: store.flag("grid_on")?,

            datafile: store.list("datafile")?.to_vec(),
            max_point_num: store.number("max_point_num")?.max(0.0) as usize,
            sort_data: SortMode::parse(store.text("sort_data")?)?,

            color: store.list("color")?.to_vec(),
            linewidth: store.number("linewidth")?,
            line_style: store.list("line_style")?.to_vec(),
            max_curve_num: store.number("max_curve_num")? as i64,
            markersize: store.number("markersize")?,
            marker: store.list("marker")?.to_vec(),
            draw_dot: store.number("draw_dot")? != 0.0,
            dotsize: store.number("dotsize")?,

            bar_width: store.number("bar_width")?,
            opacity: store.list("opacity")?.to_vec(),
            put_text: store.flag("put_text")?,
            text_font: store.number("text_font")?,
            text_prec: store.text("text_prec")?.to_string(),
            percentage: store.flag("percentage")?,

            source_path,
        })
    }

    /// Derived output path: the figure lands next to its config file,
    /// named `<prefix><config dir name>_<config stem>.<format>`.
    pub fn save_name(&self, prefix: &str) -> PathBuf {
        let save_dir = self.source_path.parent().unwrap_or_else(|| Path::new(""));
        let parent_name = save_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let conf_stem = self
            .source_path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        save_dir.join(format!("{prefix}{parent_name}_{conf_stem}.{}", self.format))
    }

    /// Splits the options into the per-axis pair used by the twin-axis
    /// chart: every list of exactly two entries becomes two singletons,
    /// everything else is shared by copy.
    pub fn split_twin(&self) -> (PlotOptions, PlotOptions) {
        let mut left = self.clone();
        let mut right = self.clone();

        let pairs: [(&mut Vec<String>, &mut Vec<String>); 13] = [
            (&mut left.ylabel, &mut right.ylabel),
            (&mut left.xticklabel, &mut right.xticklabel),
            (&mut left.yticklabel, &mut right.yticklabel),
            (&mut left.ytick, &mut right.ytick),
            (&mut left.y_min, &mut right.y_min),
            (&mut left.y_max, &mut right.y_max),
            (&mut left.legend, &mut right.legend),
            (&mut left.bbox_to_anchor, &mut right.bbox_to_anchor),
            (&mut left.datafile, &mut right.datafile),
            (&mut left.color, &mut right.color),
            (&mut left.line_style, &mut right.line_style),
            (&mut left.marker, &mut right.marker),
            (&mut left.opacity, &mut right.opacity),
        ];

        for (l, r) in pairs {
            if l.len() == 2 {
                *r = l.split_off(1);
            }
        }

        (left, right)
    }
}

fn read_tick_labels(tick_path: &str, base_dir: &Path) -> PlotResult<Vec<String>> {
    let mut path = PathBuf::from(tick_path);
    if !path.exists() {
        path = base_dir.join(tick_path);
    }
    let contents = fs::read_to_string(&path).map_err(|e| {
        PlotError::config(format!("cannot read xtick_path '{}': {e}", path.display()))
    })?;
    Ok(contents.lines().map(|l| l.trim().to_string()).collect())
}

// --- Tests ---


// src/config/options.rs
