// src/bin/colorbar.rs

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use plotkit::img_tools::color_bar::render_colorbar;

#[derive(Parser, Debug)]
#[command(name = "colorbar", about = "Generate a colorbar strip image")]
struct Cli {
    /// Lay the bar out horizontally instead of vertically
    #[arg(long)]
    horizontal: bool,

    /// Height of the (vertical) bar in pixels
    #[arg(long = "h", default_value_t = 255)]
    height: usize,

    /// Width of the (vertical) bar in pixels
    #[arg(long = "w", default_value_t = 20)]
    width: usize,

    /// Palette name (jet|viridis)
    #[arg(long, default_value = "jet")]
    colormap: String,

    /// Output directory, created when missing
    #[arg(long, default_value = "results/")]
    save_dir: PathBuf,

    /// Output format (png|jpg)
    #[arg(long, default_value = "png")]
    format: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    render_colorbar(
        cli.height,
        cli.width,
        &cli.colormap,
        cli.horizontal,
        &cli.save_dir,
        &cli.format,
    )?;
    Ok(())
}

// src/bin/colorbar.rs
