// src/plot_functions/plot_curves.rs

use plotters::backend::{BitMapBackend, DrawingBackend, SVGBackend};
use plotters::chart::ChartBuilder;
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::style::colors::WHITE;
use plotters::style::{Color, FontTransform};

use ndarray::Array1;

use std::path::Path;

use crate::config::options::{PlotOptions, PlotType};
use crate::constants::{CHAR_WIDTH_RATIO, FONT_FAMILY};
use crate::data_input::curve_loader::load_curves;
use crate::data_input::sorting::{sort_curves, SortMode};
use crate::error::PlotError;
use crate::plot_framework::{
    anchor_top_left, canvas_size, curve_color, draw_curve_line, draw_dots, draw_horizontal_grid,
    draw_legend_box, draw_markers, draw_vertical_grid, draw_x_tick_labels, draw_y_tick_labels,
    font_px, legend_box_size, legend_position, output_kind, parse_limit, pt_to_px,
    resolve_color, resolve_curve_style, resolve_line_style, resolve_x_range, resolve_y_range,
    tick_transform, visible_text, LegendEntry, OutputKind, LEGEND_BORDER_GREY,
};
use crate::types::{Curve, PlotResult};

/// Renders a `ploty` or `plotxy` figure and writes it to `save_name`.
pub fn plot_curves(opts: &PlotOptions, save_name: &Path) -> PlotResult<()> {
    let dims = canvas_size(opts);
    match output_kind(&opts.format)? {
        OutputKind::Bitmap => {
            let root = BitMapBackend::new(save_name, dims).into_drawing_area();
            draw_curve_figure(&root, opts)?;
            root.present().map_err(PlotError::render)?;
        }
        OutputKind::Svg => {
            let root = SVGBackend::new(save_name, dims).into_drawing_area();
            draw_curve_figure(&root, opts)?;
            root.present().map_err(PlotError::render)?;
        }
    }
    println!("  Figure saved as '{}'.", save_name.display());
    Ok(())
}

fn draw_curve_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    opts: &PlotOptions,
) -> PlotResult<()> {
    root.fill(&WHITE).map_err(PlotError::render)?;

    let curves = load_curves(&opts.datafile, opts.max_point_num, 0, 0.0, opts.max_curve_num)?;
    let (xs, mut ys) = split_into_xy(curves, opts.plot_type);
    if ys.is_empty() {
        return Err(PlotError::data("no curves to plot"));
    }

    let mut xticklabel = opts.xticklabel.clone();
    if opts.sort_data != SortMode::None {
        sort_curves(&xs, &mut ys, &mut xticklabel, opts.sort_data)?;
    }

    let x_range = resolve_x_range(&xs, opts)?;
    let y_range = resolve_y_range(&ys, &opts.y_min, &opts.y_max)?;
    println!(
        "Axis range: [{}, {}, {}, {}]",
        x_range.start, x_range.end, y_range.start, y_range.end
    );

    let title_px = font_px(&opts.title_font, opts.dpi)?;
    let xlabel_px = font_px(&opts.xlabel_font, opts.dpi)?;
    let ylabel_px = font_px(&opts.ylabel_font, opts.dpi)?;
    let xtick_px = font_px(&opts.xtick_font, opts.dpi)?;
    let ytick_px = font_px(&opts.ytick_font, opts.dpi)?;
    let legend_px = font_px(&opts.legend_font, opts.dpi)?;

    let title = visible_text(&opts.title);
    let xlabel = visible_text(&opts.xlabel);
    let ylabel = opts.ylabel.first().and_then(|s| visible_text(s));

    let custom_x = !xticklabel.is_empty();
    let custom_y = !opts.yticklabel.is_empty();

    // Room for a typical signed tick number when the mesh labels the
    // axis itself.
    const TICK_DIGITS: f64 = 6.0;

    let mut x_area = xtick_px + 10;
    if custom_x
        && matches!(
            tick_transform(opts.xtick_rot),
            FontTransform::Rotate90 | FontTransform::Rotate270
        )
    {
        let longest = xticklabel.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        x_area = (longest as f64 * xtick_px as f64 * CHAR_WIDTH_RATIO).round() as i32 + 10;
    }
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

    // Mesh pass 1: grid lines and the x axis labels.
    {
        let mut mesh = chart.configure_mesh();
        mesh.light_line_style(WHITE.mix(0.7))
            .y_labels(0)
            .label_style((FONT_FAMILY, xtick_px))
            .axis_desc_style((FONT_FAMILY, xlabel_px));
        if let Some(text) = xlabel {
            mesh.x_desc(text);
        }
        if custom_x {
            mesh.x_labels(0);
        }
        if custom_x || !opts.grid_on {
            mesh.disable_x_mesh();
        }
        if custom_y || !opts.grid_on {
            mesh.disable_y_mesh();
        }
        mesh.draw().map_err(PlotError::render)?;
    }
    // Mesh pass 2: the y axis labels, with their own font.
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
        let positions: Vec<f64> = xs[0].iter().copied().collect();
        if positions.len() != xticklabel.len() {
            return Err(PlotError::data(format!(
                "{} x tick labels for {} tick positions",
                xticklabel.len(),
                positions.len()
            )));
        }
        Some(positions)
    } else {
        None
    };
    let y_positions: Option<Vec<f64>> = if custom_y {
        Some(custom_y_positions(opts)?)
    } else {
        None
    };

    // Custom ticks carry their own grid, drawn below the series.
    if opts.grid_on {
        if let Some(positions) = &x_positions {
            draw_vertical_grid(&mut chart, positions, &y_range)?;
        }
        if let Some(positions) = &y_positions {
            draw_horizontal_grid(&mut chart, positions, &x_range)?;
        }
    }

    let dot_radius = (pt_to_px(opts.dotsize, opts.dpi) / 2.0).round().max(1.0) as i32;
    for (idx, y) in ys.iter().enumerate() {
        let label = if opts.custom_legend {
            None
        } else {
            opts.legend.get(idx).map(|s| s.as_str())
        };
        if opts.draw_dot {
            draw_dots(&mut chart, &xs[idx], y, curve_color(opts, idx)?, dot_radius, label)?;
        } else {
            let style = resolve_curve_style(opts, idx)?;
            draw_curve_line(&mut chart, &xs[idx], y, &style, label, opts.dpi)?;
            draw_markers(&mut chart, &xs[idx], y, &style)?;
        }
    }

    if let Some(positions) = &x_positions {
        draw_x_tick_labels(
            root,
            &chart,
            positions,
            &xticklabel,
            y_range.start,
            xtick_px,
            opts.xtick_rot,
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
            opts.ytick_rot,
        )?;
    }

    if !opts.legend.is_empty() {
        if opts.custom_legend {
            let entries = custom_legend_entries(opts)?;
            let (box_w, box_h) = legend_box_size(&entries, legend_px);
            let inner = chart.plotting_area().get_pixel_range();
            let top_left = anchor_top_left(&opts.legend_loc, &inner, box_w, box_h)?;
            draw_legend_box(root, &entries, top_left, legend_px)?;
        } else {
            let inner = chart.plotting_area().get_pixel_range();
            let position = legend_position(&opts.legend_loc, &inner)?;
            chart
                .configure_series_labels()
                .position(position)
                .background_style(WHITE.mix(0.8))
                .border_style(LEGEND_BORDER_GREY)
                .label_font((FONT_FAMILY, legend_px))
                .draw()
                .map_err(PlotError::render)?;
        }
    }
    Ok(())
}

/// Splits loaded curves into X and Y sets. `ploty` synthesizes X as
/// `0..n-1` per curve; `plotxy` pairs even-indexed X with odd-indexed Y
/// curves, dropping a trailing unpaired X.
fn split_into_xy(curves: Vec<Curve>, plot_type: PlotType) -> (Vec<Curve>, Vec<Curve>) {
    match plot_type {
        PlotType::Plotxy => {
            let mut xs = Vec::with_capacity(curves.len() / 2);
            let mut ys = Vec::with_capacity(curves.len() / 2);
            let mut iter = curves.into_iter();
            while let (Some(x), Some(y)) = (iter.next(), iter.next()) {
                xs.push(x);
                ys.push(y);
            }
            (xs, ys)
        }
        _ => {
            let xs = curves
                .iter()
                .map(|c| Array1::from_iter((0..c.len()).map(|i| i as f64)))
                .collect();
            (xs, curves)
        }
    }
}

/// Y tick positions in curve mode: the parsed `ytick` values, or
/// `0..n-1` when none were configured.
fn custom_y_positions(opts: &PlotOptions) -> PlotResult<Vec<f64>> {
    if opts.ytick.is_empty() {
        return Ok((0..opts.yticklabel.len()).map(|i| i as f64).collect());
    }
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

/// Two stacked swatches per legend entry, taking colors and line styles
/// `2i` and `2i+1` from the option lists.
fn custom_legend_entries(opts: &PlotOptions) -> PlotResult<Vec<LegendEntry>> {
    let mut entries = Vec::with_capacity(opts.legend.len());
    for (idx, label) in opts.legend.iter().enumerate() {
        let mut swatches = Vec::with_capacity(2);
        for slot in [2 * idx, 2 * idx + 1] {
            let color_name = opts.color.get(slot).ok_or_else(|| {
                PlotError::config(format!(
                    "custom legend entry {idx} needs color {slot}, but the color list has {} entries",
                    opts.color.len()
                ))
            })?;
            let style_name = opts.line_style.get(slot).ok_or_else(|| {
                PlotError::config(format!(
                    "custom legend entry {idx} needs line style {slot}, but the line_style list has {} entries",
                    opts.line_style.len()
                ))
            })?;
            swatches.push((resolve_color(color_name)?, resolve_line_style(style_name)?));
        }
        entries.push(LegendEntry {
            label: label.clone(),
            swatches,
        });
    }
    Ok(entries)
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::store::ConfigStore;

    fn options_from(settings: &[(&str, &[&str])]) -> PlotOptions {
        let mut store = ConfigStore::new();
        for (name, tokens) in settings {
            store.assign(name, tokens).unwrap();
        }
        PlotOptions::from_store(&store).unwrap()
    }

    fn curve(values: &[f64]) -> Curve {
        Array1::from_vec(values.to_vec())
    }

    #[test]
    fn ploty_synthesizes_x_from_indices() {
        let (xs, ys) = split_into_xy(vec![curve(&[5.0, 6.0, 7.0])], PlotType::Ploty);
        assert_eq!(xs.len(), 1);
        assert_eq!(xs[0].to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(ys[0].to_vec(), vec![5.0, 6.0, 7.0]);
    }

    #[test]
    fn plotxy_pairs_curves_and_drops_a_trailing_x() {
        let curves = vec![
            curve(&[0.0, 1.0]),
            curve(&[5.0, 6.0]),
            curve(&[2.0, 3.0]),
            curve(&[7.0, 8.0]),
            curve(&[9.0, 9.0]),
        ];
        let (xs, ys) = split_into_xy(curves, PlotType::Plotxy);
        assert_eq!(xs.len(), 2);
        assert_eq!(ys.len(), 2);
        assert_eq!(xs[1].to_vec(), vec![2.0, 3.0]);
        assert_eq!(ys[1].to_vec(), vec![7.0, 8.0]);
    }

    #[test]
    fn custom_legend_needs_two_styles_per_entry() {
        let opts = options_from(&[
            ("legend", &["before", "after"]),
            ("color", &["r", "b", "g"]),
            ("line_style", &["-", "--", "-", "--"]),
        ]);
        // Entry 1 asks for color slot 3, which does not exist.
        assert!(custom_legend_entries(&opts).is_err());

        let opts = options_from(&[
            ("legend", &["before"]),
            ("color", &["r", "b"]),
            ("line_style", &["-", "--"]),
        ]);
        let entries = custom_legend_entries(&opts).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].swatches.len(), 2);
    }

    #[test]
    fn curve_mode_y_positions_default_to_indices() {
        let opts = options_from(&[("yticklabel", &["lo", "mid", "hi"])]);
        assert_eq!(custom_y_positions(&opts).unwrap(), vec![0.0, 1.0, 2.0]);

        let opts = options_from(&[
            ("yticklabel", &["lo", "hi"]),
            ("ytick", &["0.0", "0.5", "1.0"]),
        ]);
        assert!(custom_y_positions(&opts).is_err());
    }
}

// src/plot_functions/plot_curves.rs
