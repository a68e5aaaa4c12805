// src/bin/plot.rs

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use plotkit::config::options::PlotOptions;
use plotkit::config::parser::parse_config_file;
use plotkit::plot_functions::render_figure;

#[derive(Parser, Debug)]
#[command(name = "plot", about = "Render a chart from a plot config file")]
struct Cli {
    /// Path of the config file
    #[arg(value_name = "CONFIG")]
    conf_file: PathBuf,

    /// String prepended to the derived figure name
    #[arg(long, default_value = "")]
    save_prefix: String,

    /// Overwrite the save figure format from the config (png|jpg|svg)
    #[arg(long)]
    format: Option<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut store = parse_config_file(&cli.conf_file, true)?;
    if let Some(format) = &cli.format {
        store.assign("format", &[format.as_str()])?;
    }
    let opts = PlotOptions::from_store(&store)?;

    let save_name = opts.save_name(&cli.save_prefix);
    println!("Save name: {}", save_name.display());
    render_figure(&opts, &save_name)?;
    Ok(())
}

// src/bin/plot.rs
