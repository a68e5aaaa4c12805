// src/constants.rs

// Point-to-pixel conversion for font sizes (canvas pixels = inches * dpi).
pub const POINTS_PER_INCH: f64 = 72.0;

// All chart text uses the serif family.
pub const FONT_FAMILY: &str = "serif";

// Default curve color cycle, in draw order. Matplotlib single-letter
// colors first, then the tab10-style named colors.
pub const DEFAULT_COLOR_CYCLE: [&str; 17] = [
    "r", "k", "b", "g", "y", "m", "c", "tab:blue", "tab:orange", "tab:green", "tab:red",
    "tab:purple", "tab:brown", "tab:pink", "tab:gray", "tab:olive", "tab:cyan",
];

// Default marker cycle for curve plots.
pub const DEFAULT_MARKER_CYCLE: [&str; 11] = ["d", "v", "1", "8", "o", "^", "<", ">", "s", "*", "p"];

// Symmetric padding applied when a resolved axis range collapses to a
// single value, so the coordinate mapping stays well-defined.
pub const DEGENERATE_RANGE_PAD: f64 = 0.5;

// --- Legend box rendering ---

// Approximate character width relative to font size, used to size manual
// legend boxes without measuring fonts.
pub const CHAR_WIDTH_RATIO: f64 = 0.6;
pub const LINE_WIDTH_LEGEND: u32 = 2;
pub const LEGEND_SWATCH_LEN_PX: i32 = 24;
pub const LEGEND_PADDING_PX: i32 = 6;
pub const LEGEND_ENTRY_GAP_PX: i32 = 4;

// --- Bar chart text ---

// Vertical text offset above a bar is the data maximum divided by this.
pub const BAR_TEXT_OFFSET_DIVISOR: f64 = 100.0;

// --- Cropper arrow geometry (OpenCV arrowedLine conventions) ---

// Tip segment length as a fraction of the shaft length.
pub const ARROW_TIP_LENGTH: f32 = 0.3;
// Angle between each tip segment and the shaft, radians.
pub const ARROW_TIP_ANGLE: f32 = std::f32::consts::FRAC_PI_4;

// src/constants.rs
