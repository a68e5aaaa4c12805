// src/img_tools/raster.rs

use std::path::Path;

use image::DynamicImage;
use image::ImageBuffer;
use image::Luma;
use image::LumaA;
use image::Rgb;
use image::Rgba;
use ndarray::s;
use ndarray::Array3;

use crate::constants::ARROW_TIP_ANGLE;
use crate::constants::ARROW_TIP_LENGTH;
use crate::error::PlotError;
use crate::types::PlotResult;

// Raster primitives shared by the cropper and the colorbar generator.
// Images are float planes of shape (height, width, channels) with values
// in [0, 1]; bit depth is restored only at save time.

// --- Decoding ---

/// Reads an image file into a float plane. 8-bit channels are divided by
/// 255, 16-bit channels by 65535; any other bit depth is unsupported.
pub fn read_image(path: &Path) -> PlotResult<Array3<f32>> {
    let decoded = image::open(path)
        .map_err(|e| PlotError::data(format!("cannot read image '{}': {e}", path.display())))?;
    match decoded {
        DynamicImage::ImageLuma8(buf) => {
            let (w, h) = buf.dimensions();
            plane(buf.as_raw(), h, w, 1, 255.0)
        }
        DynamicImage::ImageLumaA8(buf) => {
            let (w, h) = buf.dimensions();
            plane(buf.as_raw(), h, w, 2, 255.0)
        }
        DynamicImage::ImageRgb8(buf) => {
            let (w, h) = buf.dimensions();
            plane(buf.as_raw(), h, w, 3, 255.0)
        }
        DynamicImage::ImageRgba8(buf) => {
            let (w, h) = buf.dimensions();
            plane(buf.as_raw(), h, w, 4, 255.0)
        }
        DynamicImage::ImageLuma16(buf) => {
            let (w, h) = buf.dimensions();
            plane(buf.as_raw(), h, w, 1, 65535.0)
        }
        DynamicImage::ImageLumaA16(buf) => {
            let (w, h) = buf.dimensions();
            plane(buf.as_raw(), h, w, 2, 65535.0)
        }
        DynamicImage::ImageRgb16(buf) => {
            let (w, h) = buf.dimensions();
            plane(buf.as_raw(), h, w, 3, 65535.0)
        }
        DynamicImage::ImageRgba16(buf) => {
            let (w, h) = buf.dimensions();
            plane(buf.as_raw(), h, w, 4, 65535.0)
        }
        other => Err(PlotError::unsupported(
            "image bit depth",
            format!("{:?}", other.color()),
        )),
    }
}

fn plane<T>(raw: &[T], height: u32, width: u32, channels: usize, full_scale: f32) -> PlotResult<Array3<f32>>
where
    T: Into<f32> + Copy,
{
    let values: Vec<f32> = raw.iter().map(|&v| v.into() / full_scale).collect();
    Array3::from_shape_vec((height as usize, width as usize, channels), values)
        .map_err(|e| PlotError::data(format!("image buffer does not match its dimensions: {e}")))
}

// --- Pixel processing ---

/// Drops a fourth (alpha) channel unless the caller asked to keep it.
/// One- and three-channel planes pass through unchanged.
pub fn normalize_channels(img: Array3<f32>, keep_alpha: bool) -> Array3<f32> {
    if img.dim().2 == 4 && !keep_alpha {
        println!("  Removing alpha channel.");
        return img.slice(s![.., .., ..3]).to_owned();
    }
    img
}

/// Intensity scaling, clamped back into [0, 1].
pub fn apply_intensity_scale(img: &mut Array3<f32>, scale: f32) {
    img.mapv_inplace(|v| (v * scale).clamp(0.0, 1.0));
}

/// Gamma correction `v^(1/gamma)` on values clamped into [0, 1].
pub fn apply_gamma(img: &mut Array3<f32>, gamma: f32) {
    img.mapv_inplace(|v| v.clamp(0.0, 1.0).powf(1.0 / gamma));
}

// --- Annotation ---

/// Outline and arrow colors accepted by the cropper flags. `None` is the
/// original literal for an uncolored (black) outline.
pub fn outline_color(code: &str) -> PlotResult<[f32; 3]> {
    match code {
        "None" | "k" => Ok([0.0, 0.0, 0.0]),
        "r" => Ok([1.0, 0.0, 0.0]),
        "g" => Ok([0.0, 1.0, 0.0]),
        "b" => Ok([0.0, 0.0, 1.0]),
        other => Err(PlotError::config(format!("unknown annotation color '{other}'"))),
    }
}

/// Rectangle outline with the stroke centered on the one-pixel path
/// through (left, top) and (right - 1, bottom - 1). Out-of-image parts of
/// the stroke are clipped, not errors.
pub fn draw_rectangle(
    img: &mut Array3<f32>,
    top: i64,
    left: i64,
    bottom: i64,
    right: i64,
    color: [f32; 3],
    thickness: i64,
) {
    let below = thickness / 2;
    let above = thickness - below;
    let (row0, row1) = (top, bottom - 1);
    let (col0, col1) = (left, right - 1);
    paint(img, row0 - below, row0 + above, col0 - below, col1 + above, color);
    paint(img, row1 - below, row1 + above, col0 - below, col1 + above, color);
    paint(img, row0 - below, row1 + above, col0 - below, col0 + above, color);
    paint(img, row0 - below, row1 + above, col1 - below, col1 + above, color);
}

/// Arrow from one point to another, both given as (x, y). The shaft is a
/// straight line; the head is two segments leaving the end point at 45
/// degrees to the shaft, 0.3 of the shaft length each. Both endpoints
/// must lie inside the image.
pub fn draw_arrow(
    img: &mut Array3<f32>,
    from: (i64, i64),
    to: (i64, i64),
    color: [f32; 3],
    thickness: i64,
) -> PlotResult<()> {
    let height = img.dim().0 as i64;
    let width = img.dim().1 as i64;
    for (x, y) in [from, to] {
        if x < 0 || x >= width || y < 0 || y >= height {
            return Err(PlotError::geometry(format!(
                "arrow ({}, {}) -> ({}, {}) is outside the {} X {} image",
                from.0, from.1, to.0, to.1, height, width
            )));
        }
    }
    draw_line(img, from, to, color, thickness);

    let dx = (from.0 - to.0) as f64;
    let dy = (from.1 - to.1) as f64;
    let shaft = (dx * dx + dy * dy).sqrt();
    let tip = shaft * ARROW_TIP_LENGTH as f64;
    let back = dy.atan2(dx);
    for sign in [-1.0, 1.0] {
        let angle = back + sign * ARROW_TIP_ANGLE as f64;
        let end = (
            to.0 + (tip * angle.cos()).round() as i64,
            to.1 + (tip * angle.sin()).round() as i64,
        );
        draw_line(img, to, end, color, thickness);
    }
    Ok(())
}

// Bresenham walk stamping a thickness-wide square at every step. Head
// segments may leave the image; paint clips them.
fn draw_line(img: &mut Array3<f32>, from: (i64, i64), to: (i64, i64), color: [f32; 3], thickness: i64) {
    let below = thickness / 2;
    let above = thickness - below;
    let (mut x, mut y) = from;
    let dx = (to.0 - x).abs();
    let dy = -(to.1 - y).abs();
    let step_x = if x < to.0 { 1 } else { -1 };
    let step_y = if y < to.1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        paint(img, y - below, y + above, x - below, x + above, color);
        if x == to.0 && y == to.1 {
            break;
        }
        let doubled = 2 * err;
        if doubled >= dy {
            err += dy;
            x += step_x;
        }
        if doubled <= dx {
            err += dx;
            y += step_y;
        }
    }
}

// Fills [row0, row1) x [col0, col1) clamped to the image. Color channels
// beyond the third (alpha) are left untouched.
fn paint(img: &mut Array3<f32>, row0: i64, row1: i64, col0: i64, col1: i64, color: [f32; 3]) {
    let height = img.dim().0 as i64;
    let width = img.dim().1 as i64;
    let channels = img.dim().2.min(3);
    for row in row0.max(0)..row1.min(height) {
        for col in col0.max(0)..col1.min(width) {
            for ch in 0..channels {
                img[[row as usize, col as usize, ch]] = color[ch];
            }
        }
    }
}

// --- Cropping ---

/// Box admissibility: corners must satisfy `top >= 0`, `left >= 0`,
/// `bottom < height`, `right < width`. Bottom and right are exclusive crop
/// ends, so the last pixel row and column are never croppable; the bound
/// is kept as the original tools enforced it.
pub fn check_box(img: &Array3<f32>, top: i64, left: i64, bottom: i64, right: i64) -> PlotResult<()> {
    let height = img.dim().0 as i64;
    let width = img.dim().1 as i64;
    if top < 0 || left < 0 || bottom >= height || right >= width {
        return Err(PlotError::geometry(format!(
            "crop ({top}, {left}, {bottom}, {right}) is outside the {height} X {width} image"
        )));
    }
    if bottom <= top || right <= left {
        return Err(PlotError::geometry(format!(
            "crop ({top}, {left}, {bottom}, {right}) has no area"
        )));
    }
    Ok(())
}

/// Crops rows `top..bottom` and columns `left..right` after bounds checks.
pub fn crop(img: &Array3<f32>, top: i64, left: i64, bottom: i64, right: i64) -> PlotResult<Array3<f32>> {
    check_box(img, top, left, bottom, right)?;
    Ok(img
        .slice(s![top as usize..bottom as usize, left as usize..right as usize, ..])
        .to_owned())
}

/// Pixel-wise mean of equally shaped crops.
pub fn blend_mean(crops: &[Array3<f32>]) -> PlotResult<Array3<f32>> {
    let first = crops
        .first()
        .ok_or_else(|| PlotError::data("no crops were collected, nothing to blend"))?;
    let mut acc = Array3::<f32>::zeros(first.raw_dim());
    for crop in crops {
        if crop.raw_dim() != acc.raw_dim() {
            return Err(PlotError::data(
                "crops have different shapes and cannot be blended",
            ));
        }
        acc += crop;
    }
    acc /= crops.len() as f32;
    Ok(acc)
}

// --- Encoding ---

/// Writes a float plane back to disk. `png` and `jpg` quantize to 8 bits,
/// `tif` to 16 bits; any other extension is unsupported. Channel count
/// picks the pixel layout (1 gray, 2 gray+alpha, 3 color, 4 color+alpha).
pub fn save_image(img: &Array3<f32>, path: &Path) -> PlotResult<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();
    match extension {
        "png" | "jpg" => save_quantized::<u8>(img, path, 255.0),
        "tif" => save_quantized::<u16>(img, path, 65535.0),
        other => Err(PlotError::unsupported("save extension", other.to_string())),
    }
}

trait Quantized: Sized {
    fn from_unit(value: f32, full_scale: f32) -> Self;
    fn write(path: &Path, width: u32, height: u32, channels: usize, data: Vec<Self>) -> PlotResult<()>;
}

impl Quantized for u8 {
    fn from_unit(value: f32, full_scale: f32) -> Self {
        (value * full_scale) as u8
    }

    fn write(path: &Path, width: u32, height: u32, channels: usize, data: Vec<u8>) -> PlotResult<()> {
        match channels {
            1 => encode::<Luma<u8>>(path, width, height, data),
            2 => encode::<LumaA<u8>>(path, width, height, data),
            3 => encode::<Rgb<u8>>(path, width, height, data),
            4 => encode::<Rgba<u8>>(path, width, height, data),
            n => Err(PlotError::unsupported("channel count", n.to_string())),
        }
    }
}

impl Quantized for u16 {
    fn from_unit(value: f32, full_scale: f32) -> Self {
        (value * full_scale) as u16
    }

    fn write(path: &Path, width: u32, height: u32, channels: usize, data: Vec<u16>) -> PlotResult<()> {
        match channels {
            1 => encode::<Luma<u16>>(path, width, height, data),
            2 => encode::<LumaA<u16>>(path, width, height, data),
            3 => encode::<Rgb<u16>>(path, width, height, data),
            4 => encode::<Rgba<u16>>(path, width, height, data),
            n => Err(PlotError::unsupported("channel count", n.to_string())),
        }
    }
}

fn save_quantized<T: Quantized>(img: &Array3<f32>, path: &Path, full_scale: f32) -> PlotResult<()> {
    let (height, width, channels) = img.dim();
    // Truncating quantization, matching integer casts in the original
    // tools (1.0 still maps onto the full scale).
    let data: Vec<T> = img.iter().map(|&v| T::from_unit(v, full_scale)).collect();
    T::write(path, width as u32, height as u32, channels, data)
}

fn encode<P>(path: &Path, width: u32, height: u32, data: Vec<P::Subpixel>) -> PlotResult<()>
where
    P: image::PixelWithColorType,
    [P::Subpixel]: image::EncodableLayout,
{
    let buffer = ImageBuffer::<P, Vec<P::Subpixel>>::from_raw(width, height, data)
        .ok_or_else(|| PlotError::data("pixel data does not match the image dimensions"))?;
    buffer
        .save(path)
        .map_err(|e| PlotError::data(format!("cannot write image '{}': {e}", path.display())))
}

// --- Tests ---


// src/img_tools/raster.rs
