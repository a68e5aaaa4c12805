// src/bin/crop.rs

use std::error::Error;

use clap::ArgAction;
use clap::Parser;

use plotkit::img_tools::cropper::Cropper;
use plotkit::img_tools::cropper::CropperConfig;

#[derive(Parser, Debug)]
#[command(name = "crop", about = "Crop image patches and highlight them in the originals")]
struct Cli {
    /// Process all images in the directory
    #[arg(long, default_value = "")]
    in_dir: String,

    /// A single input image
    #[arg(long, default_value = "")]
    in_img: String,

    /// Select images whose file name matches this wildcard pattern
    #[arg(long, default_value = "*")]
    key: String,

    /// Accepted file suffixes for directory listings
    #[arg(long, num_args = 1.., default_values_t = [String::from(".jpg"), String::from(".png"), String::from(".tif")])]
    img_type: Vec<String>,

    /// Top of the box
    #[arg(short = 't', long = "t", default_value_t = -1, allow_negative_numbers = true)]
    top: i64,

    /// Left of the box
    #[arg(short = 'l', long = "l", default_value_t = -1, allow_negative_numbers = true)]
    left: i64,

    /// Bottom of the box
    #[arg(short = 'b', long = "b", default_value_t = -1, allow_negative_numbers = true)]
    bottom: i64,

    /// Right of the box
    #[arg(short = 'r', long = "r", default_value_t = -1, allow_negative_numbers = true)]
    right: i64,

    /// Height of the box; when positive, bottom = top + height
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    height: i64,

    /// Width of the box; when positive, right = left + width
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    width: i64,

    /// One box as four values, repeatable: --boxes t1 l1 b1 r1 --boxes t2 l2 b2 r2
    #[arg(long, num_args = 4, action = ArgAction::Append, value_name = "T L B R", allow_negative_numbers = true)]
    boxes: Vec<i64>,

    /// Outline color per box (k|r|g|b); no colors means no outlines
    #[arg(long, num_args = 1..)]
    colors: Vec<String>,

    /// Outline thickness in pixels
    #[arg(long, default_value_t = 2)]
    thick: i64,

    /// One arrow as four values, repeatable: --arrows x1 y1 x2 y2
    #[arg(long, num_args = 4, action = ArgAction::Append, value_name = "X1 Y1 X2 Y2", allow_negative_numbers = true)]
    arrows: Vec<i64>,

    /// Arrow thickness in pixels
    #[arg(long, default_value_t = 2)]
    arrow_thick: i64,

    /// Color per arrow (k|r|g|b)
    #[arg(long, num_args = 1..)]
    arrow_color: Vec<String>,

    /// Keep the alpha channel of 4-channel images
    #[arg(long)]
    keep_alpha: bool,

    /// Apply a gamma curve to the saved images
    #[arg(long)]
    do_gamma: bool,

    #[arg(long, default_value_t = 2.2)]
    gamma: f32,

    /// Scale image intensities by --iscale
    #[arg(long)]
    do_iscale: bool,

    #[arg(long, default_value_t = 2.57)]
    iscale: f32,

    /// Mean-blend the crops of each box across all images
    #[arg(long)]
    overlap: bool,

    /// Extension for the saved images
    #[arg(long, default_value = ".png")]
    save_ext: String,

    /// Subdirectory next to each image for the saved crops
    #[arg(long, default_value = "ROI")]
    save_dir: String,

    /// Ignore the original image name, 1 for true, 0 for false
    #[arg(long, default_value_t = 0)]
    rename: i64,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = CropperConfig {
        in_dir: cli.in_dir,
        in_img: cli.in_img,
        key: cli.key,
        img_type: cli.img_type,
        top: cli.top,
        left: cli.left,
        bottom: cli.bottom,
        right: cli.right,
        height: cli.height,
        width: cli.width,
        boxes: cli.boxes.chunks(4).map(|group| group.to_vec()).collect(),
        colors: cli.colors,
        thick: cli.thick,
        arrows: cli.arrows.chunks(4).map(|group| group.to_vec()).collect(),
        arrow_thick: cli.arrow_thick,
        arrow_color: cli.arrow_color,
        keep_alpha: cli.keep_alpha,
        do_gamma: cli.do_gamma,
        gamma: cli.gamma,
        do_iscale: cli.do_iscale,
        iscale: cli.iscale,
        overlap: cli.overlap,
        save_ext: cli.save_ext,
        save_dir: cli.save_dir,
        rename: cli.rename != 0,
    };
    let cropper = Cropper::new(config)?;
    cropper.run()?;
    Ok(())
}

// src/bin/crop.rs
