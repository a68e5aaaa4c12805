// src/plot_functions/plot_bars.rs

use plotters::backend::{BitMapBackend, DrawingBackend, SVGBackend};
use plotters::chart::{ChartBuilder, SeriesLabelPosition};
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Rectangle, Text};
use plotters::style::colors::{BLACK, WHITE};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color, IntoFont};

use std::path::Path;

use crate::config::options::PlotOptions;
use crate::constants::{BAR_TEXT_OFFSET_DIVISOR, CHAR_WIDTH_RATIO, FONT_FAMILY};
use crate::data_input::bar_loader::load_bar_matrix;
use crate::error::PlotError;
use crate::plot_framework::{
    canvas_size, curve_color, draw_horizontal_grid, draw_x_tick_labels, draw_y_tick_labels,
    font_px, output_kind, pad_degenerate, parse_limit, pt_to_px, visible_text, OutputKind,
    LEGEND_BORDER_GREY,
};
use crate::types::{BarMatrix, PlotResult};

/// Renders a `plotbar` figure: grouped bars, one matrix row per bar
/// within a group, one column per group.
pub fn plot_bars(opts: &PlotOptions, save_name: &Path) -> PlotResult<()> {
    let dims = canvas_size(opts);
    match output_kind(&opts.format)? {
        OutputKind::Bitmap => {
            let root = BitMapBackend::new(save_name, dims).into_drawing_area();
            draw_bar_figure(&root, opts)?;
            root.present().map_err(PlotError::render)?;
        }
        OutputKind::Svg => {
            let root = SVGBackend::new(save_name, dims).into_drawing_area();
            draw_bar_figure(&root, opts)?;
            root.present().map_err(PlotError::render)?;
        }
    }
    println!("  Figure saved as '{}'.", save_name.display());
    Ok(())
}

fn draw_bar_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    opts: &PlotOptions,
) -> PlotResult<()> {
    root.fill(&WHITE).map_err(PlotError::render)?;

    let data = load_bar_matrix(&opts.datafile, 0)?;
    let nbars = data.nrows();
    let ngroups = data.ncols();

    let (data_lo, data_hi) = matrix_range(&data)?;
    let mut y_lo = data_lo;
    let mut y_hi = data_hi;
    if let Some(raw) = opts.y_min.first() {
        y_lo = parse_limit("y_min", raw)?;
    }
    if let Some(raw) = opts.y_max.first() {
        y_hi = parse_limit("y_max", raw)?;
    }
    let y_range = pad_degenerate(y_lo, y_hi);

    // The first group sits at x = 1; the auto range pads one bar width
    // on each side.
    let x_range = (1.0 - opts.bar_width)
        ..(ngroups as f64 + (nbars as f64 - 1.0) * opts.bar_width + opts.bar_width);

    let title_px = font_px(&opts.title_font, opts.dpi)?;
    let xlabel_px = font_px(&opts.xlabel_font, opts.dpi)?;
    let ylabel_px = font_px(&opts.ylabel_font, opts.dpi)?;
    let xtick_px = font_px(&opts.xtick_font, opts.dpi)?;
    let ytick_px = font_px(&opts.ytick_font, opts.dpi)?;
    let legend_px = font_px(&opts.legend_font, opts.dpi)?;
    let text_px = pt_to_px(opts.text_font, opts.dpi).round().max(1.0) as i32;

    let title = visible_text(&opts.title);
    let xlabel = visible_text(&opts.xlabel);
    let ylabel = opts.ylabel.first().and_then(|s| visible_text(s));

    let custom_x = !opts.xticklabel.is_empty();
    let custom_y = !opts.yticklabel.is_empty();

    const TICK_DIGITS: f64 = 6.0;

    let mut x_area = xtick_px + 10;
    if xlabel.is_some() {
        x_area += xlabel_px + 10;
    }
    let mut y_area = (ytick_px as f64 * CHAR_WIDTH_RATIO * TICK_DIGITS).round() as i32 + 10;
    if custom_y {
        let longest = opts
            .yticklabel
            .iter()
            .map(|l| l.chars().count())
            .max()
            .unwrap_or(0);
        y_area = (longest as f64 * ytick_px as f64 * CHAR_WIDTH_RATIO).round() as i32 + 10;
    }
    if ylabel.is_some() {
        y_area += ylabel_px + 10;
    }

    let mut builder = ChartBuilder::on(root);
    builder
        .margin(10)
        .x_label_area_size(x_area)
        .y_label_area_size(y_area);
    if let Some(text) = title {
        builder.caption(text, (FONT_FAMILY, title_px));
    }
    let mut chart = builder
        .build_cartesian_2d(x_range.clone(), y_range.clone())
        .map_err(PlotError::render)?;

    // Mesh pass 1: x labels; bar charts draw no vertical grid.
    {
        let mut mesh = chart.configure_mesh();
        mesh.light_line_style(WHITE.mix(0.7))
            .y_labels(0)
            .disable_x_mesh()
            .label_style((FONT_FAMILY, xtick_px))
            .axis_desc_style((FONT_FAMILY, xlabel_px));
        if let Some(text) = xlabel {
            mesh.x_desc(text);
        }
        if custom_x {
            mesh.x_labels(0);
        }
        if custom_y || !opts.grid_on {
            mesh.disable_y_mesh();
        }
        mesh.draw().map_err(PlotError::render)?;
    }
    // Mesh pass 2: y labels.
    {
        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .disable_y_mesh()
            .x_labels(0)
            .label_style((FONT_FAMILY, ytick_px))
            .axis_desc_style((FONT_FAMILY, ylabel_px));
        if let Some(text) = ylabel {
            mesh.y_desc(text);
        }
        if custom_y {
            mesh.y_labels(0);
        }
        mesh.draw().map_err(PlotError::render)?;
    }

    let x_positions: Option<Vec<f64>> = if custom_x {
        let centers = group_centers(ngroups, nbars, opts.bar_width);
        if centers.len() != opts.xticklabel.len() {
            return Err(PlotError::data(format!(
                "{} x tick labels for {} bar groups",
                opts.xticklabel.len(),
                centers.len()
            )));
        }
        Some(centers)
    } else {
        None
    };
    let y_positions: Option<Vec<f64>> = if custom_y {
        Some(bar_y_positions(opts)?)
    } else {
        None
    };

    if opts.grid_on {
        if let Some(positions) = &y_positions {
            draw_horizontal_grid(&mut chart, positions, &x_range)?;
        }
    }

    let half_width = opts.bar_width / 2.0;
    let text_offset = data_hi / BAR_TEXT_OFFSET_DIVISOR;
    for i in 0..nbars {
        let color = curve_color(opts, i)?;
        let alpha = bar_opacity(opts, i)?;
        let row = data.row(i);

        let series = chart
            .draw_series(row.iter().enumerate().filter(|(_, y)| y.is_finite()).map(
                |(g, &y)| {
                    let cx = (g + 1) as f64 + i as f64 * opts.bar_width;
                    Rectangle::new(
                        [(cx - half_width, 0.0), (cx + half_width, y)],
                        color.mix(alpha).filled(),
                    )
                },
            ))
            .map_err(PlotError::render)?;
        if let Some(label) = opts.legend.get(i) {
            series.label(label).legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 14, y + 5)], color.filled())
            });
        }

        if opts.put_text {
            for (g, &y) in row.iter().enumerate() {
                if !y.is_finite() {
                    continue;
                }
                let cx = (g + 1) as f64 + i as f64 * opts.bar_width;
                let text = bar_value_text(y, &opts.text_prec, opts.percentage)?;
                let style = (FONT_FAMILY, text_px)
                    .into_font()
                    .color(&BLACK)
                    .pos(Pos::new(HPos::Center, VPos::Bottom));
                chart
                    .draw_series(std::iter::once(Text::new(text, (cx, y + text_offset), style)))
                    .map_err(PlotError::render)?;
            }
        }
    }

    if let Some(positions) = &x_positions {
        draw_x_tick_labels(
            root,
            &chart,
            positions,
            &opts.xticklabel,
            y_range.start,
            xtick_px,
            0.0,
        )?;
    }
    if let Some(positions) = &y_positions {
        draw_y_tick_labels(
            root,
            &chart,
            positions,
            &opts.yticklabel,
            x_range.start,
            ytick_px,
            0.0,
        )?;
    }

    if !opts.legend.is_empty() {
        if opts.bbox_to_anchor.len() < 2 {
            return Err(PlotError::config(format!(
                "plotbar legends need two bbox_to_anchor values, got {}",
                opts.bbox_to_anchor.len()
            )));
        }
        let anchor_x = parse_limit("bbox_to_anchor", &opts.bbox_to_anchor[0])?;
        let anchor_y = parse_limit("bbox_to_anchor", &opts.bbox_to_anchor[1])?;
        let inner = chart.plotting_area().get_pixel_range();
        let plot_w = (inner.0.end - inner.0.start) as f64;
        let plot_h = (inner.1.end - inner.1.start) as f64;
        let position = SeriesLabelPosition::Coordinate(
            (anchor_x * plot_w).round() as i32,
            ((1.0 - anchor_y) * plot_h).round() as i32,
        );
        chart
            .configure_series_labels()
            .position(position)
            .background_style(WHITE.mix(0.8))
            .border_style(LEGEND_BORDER_GREY)
            .label_font((FONT_FAMILY, legend_px))
            .draw()
            .map_err(PlotError::render)?;
    }
    Ok(())
}

/// Smallest and largest finite cell of the bar matrix. NaN cells are
/// ignored here since the bar loader keeps them.
fn matrix_range(data: &BarMatrix) -> PlotResult<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for &value in data.iter() {
        if value.is_finite() {
            lo = lo.min(value);
            hi = hi.max(value);
        }
    }
    if lo > hi {
        return Err(PlotError::data("bar data has no finite values"));
    }
    Ok((lo, hi))
}

/// X position of each group's center, where its tick label sits.
fn group_centers(ngroups: usize, nbars: usize, bar_width: f64) -> Vec<f64> {
    (1..=ngroups)
        .map(|g| g as f64 + 0.5 * (nbars as f64 - 1.0) * bar_width)
        .collect()
}

/// Y tick positions in bar mode: `ytick` is required alongside
/// `yticklabel` and the counts must match.
fn bar_y_positions(opts: &PlotOptions) -> PlotResult<Vec<f64>> {
    let mut positions = Vec::with_capacity(opts.ytick.len());
    for raw in &opts.ytick {
        positions.push(parse_limit("ytick", raw)?);
    }
    if positions.len() != opts.yticklabel.len() {
        return Err(PlotError::data(format!(
            "{} y tick labels for {} tick positions",
            opts.yticklabel.len(),
            positions.len()
        )));
    }
    Ok(positions)
}

/// Bar `idx` takes its own opacity entry, falling back to the first.
fn bar_opacity(opts: &PlotOptions, idx: usize) -> PlotResult<f64> {
    let raw = opts
        .opacity
        .get(idx)
        .or_else(|| opts.opacity.first())
        .ok_or_else(|| PlotError::config("the opacity list is empty"))?;
    parse_limit("opacity", raw)
}

/// The label printed above a bar. Default precision is two decimals
/// below 1.0 and one above; `text_prec` overrides with a `%.Nf`
/// pattern; percentage mode truncates toward zero.
pub(crate) fn bar_value_text(
    value: f64,
    text_prec: &str,
    percentage: bool,
) -> PlotResult<String> {
    if percentage {
        return Ok(format!("{}%", (value * 100.0) as i64));
    }
    if text_prec.is_empty() {
        return Ok(if value < 1.0 {
            format!("{value:.2}")
        } else {
            format!("{value:.1}")
        });
    }
    let digits = text_prec
        .strip_prefix("%.")
        .and_then(|rest| rest.strip_suffix('f'))
        .and_then(|digits| digits.parse::<usize>().ok())
        .ok_or_else(|| {
            PlotError::config(format!("text_prec '{text_prec}' is not a %.Nf pattern"))
        })?;
    Ok(format!("{value:.digits$}"))
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::store::ConfigStore;
    use ndarray::array;

    fn options_from(settings: &[(&str, &[&str])]) -> PlotOptions {
        let mut store = ConfigStore::new();
        for (name, tokens) in settings {
            store.assign(name, tokens).unwrap();
        }
        PlotOptions::from_store(&store).unwrap()
    }

    #[test]
    fn value_text_defaults_switch_precision_at_one() {
        assert_eq!(bar_value_text(0.5, "", false).unwrap(), "0.50");
        assert_eq!(bar_value_text(5.0, "", false).unwrap(), "5.0");
    }

    #[test]
    fn value_text_honors_the_precision_pattern() {
        assert_eq!(bar_value_text(0.12345, "%.3f", false).unwrap(), "0.123");
        assert_eq!(bar_value_text(2.0, "%.0f", false).unwrap(), "2");
        assert!(bar_value_text(1.0, "three digits", false).is_err());
    }

    #[test]
    fn value_text_percentage_truncates_toward_zero() {
        assert_eq!(bar_value_text(0.42, "", true).unwrap(), "42%");
        assert_eq!(bar_value_text(0.999, "", true).unwrap(), "99%");
        assert_eq!(bar_value_text(-0.426, "", true).unwrap(), "-42%");
    }

    #[test]
    fn group_centers_sit_between_the_bars() {
        // Three bars of width 0.2: the middle bar is the center.
        assert_eq!(group_centers(2, 3, 0.2), vec![1.2, 2.2]);
        // A single bar is its own center.
        assert_eq!(group_centers(2, 1, 0.2), vec![1.0, 2.0]);
    }

    #[test]
    fn opacity_falls_back_to_the_first_entry() {
        let opts = options_from(&[("opacity", &["0.9", "0.5"])]);
        assert_eq!(bar_opacity(&opts, 1).unwrap(), 0.5);
        assert_eq!(bar_opacity(&opts, 7).unwrap(), 0.9);

        let opts = options_from(&[("opacity", &["dark"])]);
        assert!(bar_opacity(&opts, 0).is_err());
    }

    #[test]
    fn bar_mode_requires_matching_yticks() {
        let opts = options_from(&[("yticklabel", &["lo", "hi"])]);
        assert!(bar_y_positions(&opts).is_err());

        let opts = options_from(&[
            ("yticklabel", &["lo", "hi"]),
            ("ytick", &["0.0", "1.0"]),
        ]);
        assert_eq!(bar_y_positions(&opts).unwrap(), vec![0.0, 1.0]);
    }

    #[test]
    fn matrix_range_skips_nan_cells() {
        let data = array![[1.0, f64::NAN], [4.0, 2.0]];
        assert_eq!(matrix_range(&data).unwrap(), (1.0, 4.0));

        let empty = array![[f64::NAN]];
        assert!(matrix_range(&empty).is_err());
    }
}

// src/plot_functions/plot_bars.rs
