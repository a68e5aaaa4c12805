// src/plot_functions/plot_twins.rs

use plotters::backend::{BitMapBackend, DrawingBackend, SVGBackend};
use plotters::chart::{ChartBuilder, DualCoordChartContext};
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::drawing::{DrawingArea, IntoDrawingArea};
use plotters::element::{Circle, Cross, TriangleMarker};
use plotters::series::{DashedLineSeries, LineSeries};
use plotters::style::colors::WHITE;
use plotters::style::{Color, FontTransform, IntoFont, RGBColor};

use ndarray::Array1;

use std::path::Path;

use crate::config::options::PlotOptions;
use crate::constants::{CHAR_WIDTH_RATIO, FONT_FAMILY};
use crate::data_input::curve_loader::load_curves;
use crate::error::PlotError;
use crate::plot_framework::{
    bbox_anchor_px, bbox_top_left, canvas_size, curve_color, dash_lengths, draw_curve_line,
    draw_legend_box, draw_markers, draw_vertical_grid, draw_x_tick_labels, font_px,
    legend_box_size, output_kind, parse_limit, resolve_curve_style, resolve_line_style,
    resolve_x_range, resolve_y_range, tick_transform, visible_text, CurveStyle, LegendEntry,
    LineStyleKind, MarkerKind, OutputKind,
};
use crate::types::{Curve, PlotResult};

type DualChart2d<'a, DB> = DualCoordChartContext<
    'a,
    DB,
    Cartesian2d<RangedCoordf64, RangedCoordf64>,
    Cartesian2d<RangedCoordf64, RangedCoordf64>,
>;

/// Renders a `plottwins` figure: two curves sharing an x axis, each
/// with its own colored y axis.
pub fn plot_twins(opts: &PlotOptions, save_name: &Path) -> PlotResult<()> {
    let dims = canvas_size(opts);
    match output_kind(&opts.format)? {
        OutputKind::Bitmap => {
            let root = BitMapBackend::new(save_name, dims).into_drawing_area();
            draw_twin_figure(&root, opts)?;
            root.present().map_err(PlotError::render)?;
        }
        OutputKind::Svg => {
            let root = SVGBackend::new(save_name, dims).into_drawing_area();
            draw_twin_figure(&root, opts)?;
            root.present().map_err(PlotError::render)?;
        }
    }
    println!("  Figure saved as '{}'.", save_name.display());
    Ok(())
}

fn draw_twin_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    opts: &PlotOptions,
) -> PlotResult<()> {
    root.fill(&WHITE).map_err(PlotError::render)?;

    let curves = load_curves(&opts.datafile, opts.max_point_num, 0, 0.0, opts.max_curve_num)?;
    if curves.len() < 2 {
        return Err(PlotError::data(format!(
            "plottwins needs two data curves, got {}",
            curves.len()
        )));
    }
    let left_y_curve = curves[0].clone();
    let right_y_curve = curves[1].clone();
    let left_x = index_curve(left_y_curve.len());
    let right_x = index_curve(right_y_curve.len());

    let (left, right) = opts.split_twin();
    let left_color = curve_color(&left, 0)?;
    let right_color = curve_color(&right, 0)?;

    // Both legend anchors come before any drawing, since the original
    // fails on a short list even when the legends are empty.
    let anchors = twin_anchors(opts)?;

    let x_range = resolve_x_range(&[left_x.clone(), right_x.clone()], opts)?;
    let left_range = resolve_y_range(
        std::slice::from_ref(&left_y_curve),
        &left.y_min,
        &left.y_max,
    )?;
    let right_range = resolve_y_range(
        std::slice::from_ref(&right_y_curve),
        &right.y_min,
        &right.y_max,
    )?;

    let title_px = font_px(&opts.title_font, opts.dpi)?;
    let xlabel_px = font_px(&opts.xlabel_font, opts.dpi)?;
    let ylabel_px = font_px(&opts.ylabel_font, opts.dpi)?;
    let xtick_px = font_px(&opts.xtick_font, opts.dpi)?;
    let ytick_px = font_px(&opts.ytick_font, opts.dpi)?;
    let legend_px = font_px(&opts.legend_font, opts.dpi)?;

    let title = visible_text(&opts.title);
    let xlabel = visible_text(&opts.xlabel);
    let left_label = left.ylabel.first().and_then(|s| visible_text(s));
    let right_label = right.ylabel.first().and_then(|s| visible_text(s));

    // Tick labels come from the unsplit option: a two-entry list here
    // means two tick labels, not one per axis.
    let xticklabel = &opts.xticklabel;
    let custom_x = !xticklabel.is_empty();

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

    let tick_span = (ytick_px as f64 * CHAR_WIDTH_RATIO * TICK_DIGITS).round() as i32 + 10;
    let mut left_area = tick_span;
    if left_label.is_some() {
        left_area += ylabel_px + 10;
    }
    let mut right_area = tick_span;
    if right_label.is_some() {
        right_area += ylabel_px + 10;
    }

    let mut builder = ChartBuilder::on(root);
    builder
        .margin(10)
        .x_label_area_size(x_area)
        .y_label_area_size(left_area)
        .right_y_label_area_size(right_area);
    if let Some(text) = title {
        builder.caption(text, (FONT_FAMILY, title_px));
    }
    let mut chart = builder
        .build_cartesian_2d(x_range.clone(), left_range.clone())
        .map_err(PlotError::render)?
        .set_secondary_coord(x_range.clone(), right_range.clone());

    // Mesh pass 1: grid and black x labels.
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
        if !opts.grid_on {
            mesh.disable_y_mesh();
        }
        mesh.draw().map_err(PlotError::render)?;
    }
    // Mesh pass 2: the left axis labels in the left curve's color.
    {
        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .disable_y_mesh()
            .x_labels(0)
            .label_style((FONT_FAMILY, ytick_px).into_font().color(&left_color))
            .axis_desc_style((FONT_FAMILY, ylabel_px).into_font().color(&left_color));
        if let Some(text) = left_label {
            mesh.y_desc(text);
        }
        mesh.draw().map_err(PlotError::render)?;
    }
    // Right axis labels in the right curve's color.
    {
        let mut axes = chart.configure_secondary_axes();
        axes.label_style((FONT_FAMILY, ytick_px).into_font().color(&right_color))
            .axis_desc_style((FONT_FAMILY, ylabel_px).into_font().color(&right_color));
        if let Some(text) = right_label {
            axes.y_desc(text);
        }
        axes.draw().map_err(PlotError::render)?;
    }

    let x_positions: Option<Vec<f64>> = custom_x
        .then(|| (0..xticklabel.len()).map(|i| i as f64).collect());
    if opts.grid_on {
        if let Some(positions) = &x_positions {
            draw_vertical_grid(&mut chart, positions, &left_range)?;
        }
    }

    let left_style = resolve_curve_style(&left, 0)?;
    draw_curve_line(&mut chart, &left_x, &left_y_curve, &left_style, None, opts.dpi)?;
    draw_markers(&mut chart, &left_x, &left_y_curve, &left_style)?;

    let right_style = resolve_curve_style(&right, 0)?;
    draw_secondary_curve(&mut chart, &right_x, &right_y_curve, &right_style, opts.dpi)?;

    if let Some(positions) = &x_positions {
        draw_x_tick_labels(
            root,
            &chart,
            positions,
            xticklabel,
            left_range.start,
            xtick_px,
            opts.xtick_rot,
        )?;
    }

    let inner = chart.plotting_area().get_pixel_range();
    let sides = [
        (&left, left_color, (anchors[0], anchors[1])),
        (&right, right_color, (anchors[2], anchors[3])),
    ];
    for (axis_opts, color, anchor) in sides {
        if axis_opts.legend.is_empty() {
            continue;
        }
        let entries = axis_legend_entries(axis_opts, color)?;
        let (box_w, box_h) = legend_box_size(&entries, legend_px);
        let anchor_px = bbox_anchor_px(anchor, &inner);
        let top_left = bbox_top_left(&opts.legend_loc, anchor_px, box_w, box_h)?;
        draw_legend_box(root, &entries, top_left, legend_px)?;
    }
    Ok(())
}

fn index_curve(len: usize) -> Curve {
    Array1::from_iter((0..len).map(|i| i as f64))
}

/// The four `bbox_to_anchor` fractions, one (x, y) pair per axis.
fn twin_anchors(opts: &PlotOptions) -> PlotResult<[f64; 4]> {
    if opts.bbox_to_anchor.len() < 4 {
        return Err(PlotError::config(format!(
            "plottwins needs four bbox_to_anchor values, got {}",
            opts.bbox_to_anchor.len()
        )));
    }
    let mut anchors = [0.0; 4];
    for (slot, raw) in anchors.iter_mut().zip(opts.bbox_to_anchor.iter()) {
        *slot = parse_limit("bbox_to_anchor", raw)?;
    }
    Ok(anchors)
}

fn axis_legend_entries(
    axis_opts: &PlotOptions,
    color: RGBColor,
) -> PlotResult<Vec<LegendEntry>> {
    let mut entries = Vec::with_capacity(axis_opts.legend.len());
    for (idx, label) in axis_opts.legend.iter().enumerate() {
        let line = match axis_opts.line_style.get(idx) {
            Some(style) => resolve_line_style(style)?,
            None => LineStyleKind::Solid,
        };
        entries.push(LegendEntry {
            label: label.clone(),
            swatches: vec![(color, line)],
        });
    }
    Ok(entries)
}

/// Line plus marker overlay on the secondary coordinate system.
fn draw_secondary_curve<DB: DrawingBackend>(
    chart: &mut DualChart2d<'_, DB>,
    x: &Curve,
    y: &Curve,
    style: &CurveStyle,
    dpi: f64,
) -> PlotResult<()> {
    let points: Vec<(f64, f64)> = x.iter().zip(y.iter()).map(|(&a, &b)| (a, b)).collect();
    let shape = style.color.stroke_width(style.stroke);
    match dash_lengths(style.line, dpi) {
        None => chart
            .draw_secondary_series(LineSeries::new(points.clone(), shape))
            .map_err(PlotError::render)?,
        Some((dash, gap)) => chart
            .draw_secondary_series(DashedLineSeries::new(points.clone(), dash, gap, shape))
            .map_err(PlotError::render)?,
    };

    let radius = style.marker_radius;
    match style.marker {
        MarkerKind::Circle => chart
            .draw_secondary_series(
                points
                    .into_iter()
                    .map(|p| Circle::new(p, radius, style.color.filled())),
            )
            .map_err(PlotError::render)?,
        MarkerKind::Triangle => chart
            .draw_secondary_series(
                points
                    .into_iter()
                    .map(|p| TriangleMarker::new(p, radius, style.color.filled())),
            )
            .map_err(PlotError::render)?,
        MarkerKind::Cross => chart
            .draw_secondary_series(points.into_iter().map(|p| {
                Cross::new(p, radius, style.color.stroke_width((style.stroke / 2).max(1)))
            }))
            .map_err(PlotError::render)?,
    };
    Ok(())
}

// --- Tests ---


// src/plot_functions/plot_twins.rs
