// src/plot_framework.rs

use plotters::backend::DrawingBackend;
use plotters::chart::ChartContext;
use plotters::chart::SeriesLabelPosition;
use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::drawing::DrawingArea;
use plotters::element::Circle;
use plotters::element::Cross;
use plotters::element::PathElement;
use plotters::element::Rectangle;
use plotters::element::Text;
use plotters::element::TriangleMarker;
use plotters::series::{DashedLineSeries, LineSeries};
use plotters::style::colors::{BLACK, WHITE};
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::{Color, FontTransform, IntoFont, RGBColor};

use std::ops::Range;

use ndarray_stats::QuantileExt;

use crate::config::options::PlotOptions;
use crate::constants::{
    CHAR_WIDTH_RATIO, DEGENERATE_RANGE_PAD, FONT_FAMILY, LEGEND_ENTRY_GAP_PX, LEGEND_PADDING_PX,
    LEGEND_SWATCH_LEN_PX, LINE_WIDTH_LEGEND, POINTS_PER_INCH,
};
use crate::error::PlotError;
use crate::types::{Curve, PlotResult};

/// Chart over two linear f64 axes, the only coordinate system the
/// toolkit draws in.
pub type Chart2d<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

// Matplotlib's default grid grey.
pub const GRID_LINE_GREY: RGBColor = RGBColor(176, 176, 176);
// Legend frame edge color, a 40% grey.
pub const LEGEND_BORDER_GREY: RGBColor = RGBColor(102, 102, 102);

const X_TICK_GAP_PX: i32 = 4;
const Y_TICK_GAP_PX: i32 = 6;

// --- Output backend selection ---

/// Which plotters backend a save format maps to. The actual backend is
/// instantiated at each chart's entry point, since the drawing code is
/// generic over `DrawingBackend`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Bitmap,
    Svg,
}

pub fn output_kind(format: &str) -> PlotResult<OutputKind> {
    match format {
        "png" | "jpg" | "jpeg" => Ok(OutputKind::Bitmap),
        "svg" => Ok(OutputKind::Svg),
        other => Err(PlotError::unsupported("save format", other)),
    }
}

/// Canvas size in pixels from the configured inches and dpi.
pub fn canvas_size(opts: &PlotOptions) -> (u32, u32) {
    let w = (opts.width * opts.dpi).round().max(1.0) as u32;
    let h = (opts.height * opts.dpi).round().max(1.0) as u32;
    (w, h)
}

/// Title and axis-label options treat the empty string and the literal
/// `None` as absent.
pub fn visible_text(text: &str) -> Option<&str> {
    if text.is_empty() || text == "None" {
        None
    } else {
        Some(text)
    }
}

// --- Fonts ---

pub fn pt_to_px(points: f64, dpi: f64) -> f64 {
    points * dpi / POINTS_PER_INCH
}

/// Resolves a font-size option into pixels. Accepts a numeric point
/// value or one of the named sizes, which step by a factor of 1.2 around
/// the 10pt `medium`.
pub fn font_px(spec: &str, dpi: f64) -> PlotResult<i32> {
    let points = if let Ok(value) = spec.parse::<f64>() {
        value
    } else {
        let steps: i32 = match spec {
            "xx-small" => -3,
            "x-small" => -2,
            "small" => -1,
            "medium" => 0,
            "large" => 1,
            "x-large" => 2,
            "xx-large" => 3,
            other => {
                return Err(PlotError::config(format!("unknown font size '{other}'")));
            }
        };
        10.0 * 1.2f64.powi(steps)
    };
    Ok(pt_to_px(points, dpi).round().max(1.0) as i32)
}

// --- Colors ---

/// Maps a color option to RGB: the single-letter matplotlib codes, the
/// `tab:` palette, or a `#rrggbb` literal.
pub fn resolve_color(name: &str) -> PlotResult<RGBColor> {
    if let Some(hex) = name.strip_prefix('#') {
        return parse_hex_color(hex)
            .ok_or_else(|| PlotError::config(format!("unknown color '{name}'")));
    }
    let (r, g, b) = match name {
        "r" => (255, 0, 0),
        "k" => (0, 0, 0),
        "b" => (0, 0, 255),
        "g" => (0, 128, 0),
        "y" => (191, 191, 0),
        "m" => (191, 0, 191),
        "c" => (0, 191, 191),
        "w" => (255, 255, 255),
        "tab:blue" => (0x1f, 0x77, 0xb4),
        "tab:orange" => (0xff, 0x7f, 0x0e),
        "tab:green" => (0x2c, 0xa0, 0x2c),
        "tab:red" => (0xd6, 0x27, 0x28),
        "tab:purple" => (0x94, 0x67, 0xbd),
        "tab:brown" => (0x8c, 0x56, 0x4b),
        "tab:pink" => (0xe3, 0x77, 0xc2),
        "tab:gray" => (0x7f, 0x7f, 0x7f),
        "tab:olive" => (0xbc, 0xbd, 0x22),
        "tab:cyan" => (0x17, 0xbe, 0xcf),
        other => return Err(PlotError::config(format!("unknown color '{other}'"))),
    };
    Ok(RGBColor(r, g, b))
}

fn parse_hex_color(hex: &str) -> Option<RGBColor> {
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(RGBColor(r, g, b))
}

// --- Line styles and markers ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyleKind {
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

pub fn resolve_line_style(style: &str) -> PlotResult<LineStyleKind> {
    match style {
        "-" => Ok(LineStyleKind::Solid),
        "--" => Ok(LineStyleKind::Dashed),
        ":" => Ok(LineStyleKind::Dotted),
        "-." => Ok(LineStyleKind::DashDot),
        other => Err(PlotError::config(format!("unknown line style '{other}'"))),
    }
}

/// The marker alphabet collapses onto the three glyphs the backend
/// offers; every entry of the default marker cycle has a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Circle,
    Triangle,
    Cross,
}

pub fn resolve_marker(marker: &str) -> PlotResult<MarkerKind> {
    match marker {
        "o" | "8" | "." | "p" | "*" | "h" | "H" => Ok(MarkerKind::Circle),
        "v" | "^" | "<" | ">" | "1" | "2" | "3" | "4" | "d" | "D" => Ok(MarkerKind::Triangle),
        "s" | "+" | "x" | "X" | "|" | "_" => Ok(MarkerKind::Cross),
        other => Err(PlotError::config(format!("unknown marker '{other}'"))),
    }
}

/// Resolved drawing style for one curve.
#[derive(Debug, Clone, Copy)]
pub struct CurveStyle {
    pub color: RGBColor,
    pub line: LineStyleKind,
    pub stroke: u32,
    pub marker: MarkerKind,
    pub marker_radius: i32,
}

/// Color for series `idx`; running off the end of the color list is
/// fatal.
pub fn curve_color(opts: &PlotOptions, idx: usize) -> PlotResult<RGBColor> {
    let name = opts.color.get(idx).ok_or_else(|| {
        PlotError::config(format!(
            "series {idx} has no color; the color list has {} entries",
            opts.color.len()
        ))
    })?;
    resolve_color(name)
}

/// Looks up the style for curve `idx`. Running out of colors or markers
/// is fatal; a missing line style falls back to solid, mirroring the
/// uneven forgiveness of the original option set.
pub fn resolve_curve_style(opts: &PlotOptions, idx: usize) -> PlotResult<CurveStyle> {
    let marker_name = opts.marker.get(idx).ok_or_else(|| {
        PlotError::config(format!(
            "curve {idx} has no marker; the marker list has {} entries",
            opts.marker.len()
        ))
    })?;
    let line = match opts.line_style.get(idx) {
        Some(style) => resolve_line_style(style)?,
        None => LineStyleKind::Solid,
    };

    Ok(CurveStyle {
        color: curve_color(opts, idx)?,
        line,
        stroke: pt_to_px(opts.linewidth, opts.dpi).round().max(1.0) as u32,
        marker: resolve_marker(marker_name)?,
        marker_radius: (pt_to_px(opts.markersize, opts.dpi) / 2.0).round().max(1.0) as i32,
    })
}

// --- Axis ranges ---

/// Smallest and largest value over a set of curves.
pub fn value_range(curves: &[Curve]) -> PlotResult<(f64, f64)> {
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for curve in curves {
        let cmin = curve
            .min()
            .map_err(|_| PlotError::data("cannot compute the value range of empty data"))?;
        let cmax = curve
            .max()
            .map_err(|_| PlotError::data("cannot compute the value range of empty data"))?;
        lo = lo.min(*cmin);
        hi = hi.max(*cmax);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return Err(PlotError::data("cannot compute the value range of empty data"));
    }
    Ok((lo, hi))
}

/// X range: data extent, overridden by `x_min`/`x_max` whenever those
/// were set (their infinite defaults mean unset).
pub fn resolve_x_range(xs: &[Curve], opts: &PlotOptions) -> PlotResult<Range<f64>> {
    let (mut lo, mut hi) = value_range(xs)?;
    if opts.x_min < f64::INFINITY {
        lo = opts.x_min;
    }
    if opts.x_max > f64::NEG_INFINITY {
        hi = opts.x_max;
    }
    Ok(pad_degenerate(lo, hi))
}

/// Y range: data extent, overridden by the leading `y_min`/`y_max` list
/// entries when present.
pub fn resolve_y_range(ys: &[Curve], y_min: &[String], y_max: &[String]) -> PlotResult<Range<f64>> {
    let (mut lo, mut hi) = value_range(ys)?;
    if let Some(raw) = y_min.first() {
        lo = parse_limit("y_min", raw)?;
    }
    if let Some(raw) = y_max.first() {
        hi = parse_limit("y_max", raw)?;
    }
    Ok(pad_degenerate(lo, hi))
}

pub(crate) fn parse_limit(option: &str, raw: &str) -> PlotResult<f64> {
    raw.parse::<f64>()
        .map_err(|_| PlotError::config(format!("{option} value '{raw}' is not a number")))
}

/// A collapsed range gets a symmetric pad so the coordinate mapping
/// keeps a non-zero span.
pub fn pad_degenerate(lo: f64, hi: f64) -> Range<f64> {
    if lo == hi {
        (lo - DEGENERATE_RANGE_PAD)..(hi + DEGENERATE_RANGE_PAD)
    } else {
        lo..hi
    }
}

// --- Series drawing ---

/// Dash and gap length in pixels for the non-solid line styles, scaled
/// from matplotlib's point-based dash patterns.
pub fn dash_lengths(kind: LineStyleKind, dpi: f64) -> Option<(u32, u32)> {
    let (dash_pt, gap_pt) = match kind {
        LineStyleKind::Solid => return None,
        LineStyleKind::Dashed => (3.7, 1.6),
        LineStyleKind::Dotted => (1.0, 1.65),
        LineStyleKind::DashDot => (4.8, 1.6),
    };
    Some((
        pt_to_px(dash_pt, dpi).round().max(1.0) as u32,
        pt_to_px(gap_pt, dpi).round().max(1.0) as u32,
    ))
}

/// Draws one curve as a line, dashed variants included, and registers a
/// legend entry when a label is given.
pub fn draw_curve_line<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    x: &Curve,
    y: &Curve,
    style: &CurveStyle,
    label: Option<&str>,
    dpi: f64,
) -> PlotResult<()> {
    let points: Vec<(f64, f64)> = x.iter().zip(y.iter()).map(|(&a, &b)| (a, b)).collect();
    let shape = style.color.stroke_width(style.stroke);

    let series = match dash_lengths(style.line, dpi) {
        None => chart
            .draw_series(LineSeries::new(points, shape))
            .map_err(PlotError::render)?,
        Some((dash, gap)) => chart
            .draw_series(DashedLineSeries::new(points, dash, gap, shape))
            .map_err(PlotError::render)?,
    };

    if let Some(label) = label {
        let color = style.color;
        series.label(label).legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LINE_WIDTH_LEGEND))
        });
    }
    Ok(())
}

/// Overlays the per-point marker glyphs on a curve.
pub fn draw_markers<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    x: &Curve,
    y: &Curve,
    style: &CurveStyle,
) -> PlotResult<()> {
    let points: Vec<(f64, f64)> = x.iter().zip(y.iter()).map(|(&a, &b)| (a, b)).collect();
    let radius = style.marker_radius;
    match style.marker {
        MarkerKind::Circle => chart
            .draw_series(
                points
                    .into_iter()
                    .map(|p| Circle::new(p, radius, style.color.filled())),
            )
            .map_err(PlotError::render)?,
        MarkerKind::Triangle => chart
            .draw_series(
                points
                    .into_iter()
                    .map(|p| TriangleMarker::new(p, radius, style.color.filled())),
            )
            .map_err(PlotError::render)?,
        MarkerKind::Cross => chart
            .draw_series(points.into_iter().map(|p| {
                Cross::new(p, radius, style.color.stroke_width((style.stroke / 2).max(1)))
            }))
            .map_err(PlotError::render)?,
    };
    Ok(())
}

/// Scatter rendering for `draw_dot` mode: filled dots, no line.
pub fn draw_dots<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    x: &Curve,
    y: &Curve,
    color: RGBColor,
    dot_radius: i32,
    label: Option<&str>,
) -> PlotResult<()> {
    let points: Vec<(f64, f64)> = x.iter().zip(y.iter()).map(|(&a, &b)| (a, b)).collect();
    let series = chart
        .draw_series(
            points
                .into_iter()
                .map(|p| Circle::new(p, dot_radius, color.filled())),
        )
        .map_err(PlotError::render)?;
    if let Some(label) = label {
        series.label(label).legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(LINE_WIDTH_LEGEND))
        });
    }
    Ok(())
}

// --- Grid at explicit tick positions ---

pub fn draw_vertical_grid<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    positions: &[f64],
    y_range: &Range<f64>,
) -> PlotResult<()> {
    for &x in positions {
        chart
            .draw_series(LineSeries::new(
                vec![(x, y_range.start), (x, y_range.end)],
                GRID_LINE_GREY.stroke_width(1),
            ))
            .map_err(PlotError::render)?;
    }
    Ok(())
}

pub fn draw_horizontal_grid<DB: DrawingBackend>(
    chart: &mut Chart2d<'_, DB>,
    positions: &[f64],
    x_range: &Range<f64>,
) -> PlotResult<()> {
    for &y in positions {
        chart
            .draw_series(LineSeries::new(
                vec![(x_range.start, y), (x_range.end, y)],
                GRID_LINE_GREY.stroke_width(1),
            ))
            .map_err(PlotError::render)?;
    }
    Ok(())
}

// --- Custom tick labels ---

/// Rotation values snap to the nearest quarter turn, the granularity the
/// text backend supports. Positive angles read counter-clockwise.
pub fn tick_transform(rotation_deg: f64) -> FontTransform {
    let quarter = ((rotation_deg.rem_euclid(360.0) / 90.0).round() as i64) % 4;
    match quarter {
        1 => FontTransform::Rotate270,
        2 => FontTransform::Rotate180,
        3 => FontTransform::Rotate90,
        _ => FontTransform::None,
    }
}

/// Draws tick labels under the x axis at the given data positions. The
/// mesh's own labels are expected to be suppressed by the caller.
pub fn draw_x_tick_labels<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    chart: &Chart2d<'_, DB>,
    positions: &[f64],
    labels: &[String],
    anchor_y: f64,
    font_px: i32,
    rotation_deg: f64,
) -> PlotResult<()> {
    for (&x, label) in positions.iter().zip(labels.iter()) {
        let (px, py) = chart.backend_coord(&(x, anchor_y));
        let style = (FONT_FAMILY, font_px)
            .into_font()
            .transform(tick_transform(rotation_deg))
            .color(&BLACK)
            .pos(Pos::new(HPos::Center, VPos::Top));
        root.draw(&Text::new(label.clone(), (px, py + X_TICK_GAP_PX), style))
            .map_err(PlotError::render)?;
    }
    Ok(())
}

/// Draws tick labels left of the y axis at the given data positions.
pub fn draw_y_tick_labels<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    chart: &Chart2d<'_, DB>,
    positions: &[f64],
    labels: &[String],
    anchor_x: f64,
    font_px: i32,
    rotation_deg: f64,
) -> PlotResult<()> {
    for (&y, label) in positions.iter().zip(labels.iter()) {
        let (px, py) = chart.backend_coord(&(anchor_x, y));
        let style = (FONT_FAMILY, font_px)
            .into_font()
            .transform(tick_transform(rotation_deg))
            .color(&BLACK)
            .pos(Pos::new(HPos::Right, VPos::Center));
        root.draw(&Text::new(label.clone(), (px - Y_TICK_GAP_PX, py), style))
            .map_err(PlotError::render)?;
    }
    Ok(())
}

// --- Legends ---

/// Automatic legend placement mapped from the matplotlib location
/// strings. `center` has no named backend position, so it becomes an
/// explicit coordinate inside the plotting area.
pub fn legend_position(
    loc: &str,
    inner: &(Range<i32>, Range<i32>),
) -> PlotResult<SeriesLabelPosition> {
    Ok(match loc {
        "best" | "upper left" => SeriesLabelPosition::UpperLeft,
        "upper right" => SeriesLabelPosition::UpperRight,
        "lower left" => SeriesLabelPosition::LowerLeft,
        "lower right" => SeriesLabelPosition::LowerRight,
        "upper center" => SeriesLabelPosition::UpperMiddle,
        "lower center" => SeriesLabelPosition::LowerMiddle,
        "center left" => SeriesLabelPosition::MiddleLeft,
        "center right" | "right" => SeriesLabelPosition::MiddleRight,
        "center" => SeriesLabelPosition::Coordinate(
            (inner.0.start + inner.0.end) / 2,
            (inner.1.start + inner.1.end) / 2,
        ),
        other => return Err(PlotError::config(format!("unknown legend_loc '{other}'"))),
    })
}

/// One entry of a hand-drawn legend box: a label and the line swatches
/// shown next to it (two stacked swatches for before/after pairs).
pub struct LegendEntry {
    pub label: String,
    pub swatches: Vec<(RGBColor, LineStyleKind)>,
}

fn legend_entry_height(entries: &[LegendEntry], font_px: i32) -> i32 {
    let stacked = entries.iter().any(|e| e.swatches.len() > 1);
    let factor = if stacked { 1.9 } else { 1.5 };
    (font_px as f64 * factor).round() as i32
}

/// Estimated pixel size of a legend box; character width is approximated
/// from the font size rather than measured.
pub fn legend_box_size(entries: &[LegendEntry], font_px: i32) -> (i32, i32) {
    let longest = entries
        .iter()
        .map(|e| e.label.chars().count())
        .max()
        .unwrap_or(0);
    let char_w = font_px as f64 * CHAR_WIDTH_RATIO;
    let width = LEGEND_PADDING_PX * 2
        + LEGEND_SWATCH_LEN_PX
        + LEGEND_ENTRY_GAP_PX
        + (longest as f64 * char_w).round() as i32;
    let height = LEGEND_PADDING_PX * 2 + legend_entry_height(entries, font_px) * entries.len() as i32;
    (width, height)
}

/// Top-left pixel for a legend box placed by a matplotlib location
/// string inside the plotting area.
pub fn anchor_top_left(
    loc: &str,
    inner: &(Range<i32>, Range<i32>),
    box_w: i32,
    box_h: i32,
) -> PlotResult<(i32, i32)> {
    const INSET: i32 = 5;
    let left = inner.0.start + INSET;
    let right = inner.0.end - INSET - box_w;
    let top = inner.1.start + INSET;
    let bottom = inner.1.end - INSET - box_h;
    let center_x = inner.0.start + (inner.0.end - inner.0.start - box_w) / 2;
    let center_y = inner.1.start + (inner.1.end - inner.1.start - box_h) / 2;

    Ok(match loc {
        "best" | "upper left" => (left, top),
        "upper right" => (right, top),
        "lower left" => (left, bottom),
        "lower right" => (right, bottom),
        "upper center" => (center_x, top),
        "lower center" => (center_x, bottom),
        "center left" => (left, center_y),
        "center right" | "right" => (right, center_y),
        "center" => (center_x, center_y),
        other => return Err(PlotError::config(format!("unknown legend_loc '{other}'"))),
    })
}

/// Pixel position of a `bbox_to_anchor` fraction pair. The fractions
/// are measured from the lower-left corner of the plotting area, y
/// upward.
pub fn bbox_anchor_px(anchor: (f64, f64), inner: &(Range<i32>, Range<i32>)) -> (i32, i32) {
    let width = (inner.0.end - inner.0.start) as f64;
    let height = (inner.1.end - inner.1.start) as f64;
    let px = inner.0.start + (anchor.0 * width).round() as i32;
    let py = inner.1.start + ((1.0 - anchor.1) * height).round() as i32;
    (px, py)
}

/// Top-left pixel of a legend box whose `loc` corner sits at `anchor`,
/// the matplotlib anchored-placement rule.
pub fn bbox_top_left(
    loc: &str,
    anchor: (i32, i32),
    box_w: i32,
    box_h: i32,
) -> PlotResult<(i32, i32)> {
    let (ax, ay) = anchor;
    Ok(match loc {
        "best" | "upper left" => (ax, ay),
        "upper right" => (ax - box_w, ay),
        "upper center" => (ax - box_w / 2, ay),
        "lower left" => (ax, ay - box_h),
        "lower right" => (ax - box_w, ay - box_h),
        "lower center" => (ax - box_w / 2, ay - box_h),
        "center left" => (ax, ay - box_h / 2),
        "center right" | "right" => (ax - box_w, ay - box_h / 2),
        "center" => (ax - box_w / 2, ay - box_h / 2),
        other => return Err(PlotError::config(format!("unknown legend_loc '{other}'"))),
    })
}

fn swatch_segments(kind: LineStyleKind, x0: i32, x1: i32) -> Vec<(i32, i32)> {
    let len = x1 - x0;
    match kind {
        LineStyleKind::Solid => vec![(x0, x1)],
        LineStyleKind::Dashed => vec![(x0, x0 + len * 2 / 5), (x1 - len * 2 / 5, x1)],
        LineStyleKind::Dotted => vec![
            (x0, x0 + 2),
            (x0 + len / 2 - 1, x0 + len / 2 + 1),
            (x1 - 2, x1),
        ],
        LineStyleKind::DashDot => vec![(x0, x0 + len / 2), (x1 - len / 6, x1)],
    }
}

/// Draws a framed legend box with line swatches at an absolute pixel
/// position, on top of everything drawn before it.
pub fn draw_legend_box<DB: DrawingBackend>(
    root: &DrawingArea<DB, plotters::coord::Shift>,
    entries: &[LegendEntry],
    top_left: (i32, i32),
    font_px: i32,
) -> PlotResult<()> {
    let (box_w, box_h) = legend_box_size(entries, font_px);
    let (x0, y0) = top_left;

    root.draw(&Rectangle::new(
        [(x0, y0), (x0 + box_w, y0 + box_h)],
        WHITE.mix(0.8).filled(),
    ))
    .map_err(PlotError::render)?;
    root.draw(&Rectangle::new(
        [(x0, y0), (x0 + box_w, y0 + box_h)],
        LEGEND_BORDER_GREY.stroke_width(1),
    ))
    .map_err(PlotError::render)?;

    let entry_h = legend_entry_height(entries, font_px);
    for (i, entry) in entries.iter().enumerate() {
        let entry_top = y0 + LEGEND_PADDING_PX + entry_h * i as i32;
        let swatch_x0 = x0 + LEGEND_PADDING_PX;
        let swatch_x1 = swatch_x0 + LEGEND_SWATCH_LEN_PX;

        let rows = entry.swatches.len().max(1) as f64;
        for (j, (color, line)) in entry.swatches.iter().enumerate() {
            let frac = (j as f64 + 1.0) / (rows + 1.0);
            let swatch_y = entry_top + (entry_h as f64 * frac).round() as i32;
            for (seg_x0, seg_x1) in swatch_segments(*line, swatch_x0, swatch_x1) {
                root.draw(&PathElement::new(
                    vec![(seg_x0, swatch_y), (seg_x1, swatch_y)],
                    color.stroke_width(LINE_WIDTH_LEGEND),
                ))
                .map_err(PlotError::render)?;
            }
        }

        let style = (FONT_FAMILY, font_px)
            .into_font()
            .color(&BLACK)
            .pos(Pos::new(HPos::Left, VPos::Center));
        root.draw(&Text::new(
            entry.label.clone(),
            (swatch_x1 + LEGEND_ENTRY_GAP_PX, entry_top + entry_h / 2),
            style,
        ))
        .map_err(PlotError::render)?;
    }
    Ok(())
}

// --- Tests ---


// src/plot_framework.rs
