// tests/render_pipeline_test.rs
//
// End-to-end runs of the figure pipeline: config file in, figure file
// out. The configs label every tick themselves and leave captions off,
// so the output needs no font rasterization and renders the same on a
// bare CI box. SVG output keeps the drawn text inspectable.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::PathBuf;

    use tempfile::TempDir;

    use plotkit::config::options::PlotOptions;
    use plotkit::config::parser::parse_config_file;
    use plotkit::error::PlotError;
    use plotkit::plot_functions::render_figure;

    fn render(dir: &TempDir, conf_name: &str, conf_body: &str) -> Result<PathBuf, PlotError> {
        let conf_path = dir.path().join(conf_name);
        fs::write(&conf_path, conf_body).unwrap();

        let store = parse_config_file(&conf_path, true)?;
        let opts = PlotOptions::from_store(&store)?;
        let save_name = opts.save_name("");
        render_figure(&opts, &save_name)?;
        Ok(save_name)
    }

    #[test]
    fn a_ploty_config_renders_a_curve_figure() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("wave.txt"), "1 3 2 5 4\n").unwrap();
        fs::write(dir.path().join("decay.txt"), "5 4 3 2 1\n").unwrap();

        let save_name = render(
            &dir,
            "wave.conf",
            "! plot_type ploty\n\
             ! format svg\n\
             ! datafile wave.txt decay.txt\n\
             ! xticklabel p0 p1 p2 p3 p4\n\
             ! yticklabel low high\n\
             ! ytick 2 4\n\
             ! width 3\n\
             ! height 2\n\
             ! dpi 80\n",
        )
        .unwrap();
        println!("Rendered curve figure: {}", save_name.display());

        assert!(save_name.ends_with(
            PathBuf::from(format!(
                "{}_wave.svg",
                dir.path().file_name().unwrap().to_string_lossy()
            ))
        ));
        let svg = fs::read_to_string(&save_name).unwrap();
        assert!(svg.contains("<svg"));
        // The curve itself and all six self-drawn tick labels.
        assert!(svg.contains("polyline"));
        for label in ["p0", "p1", "p2", "p3", "p4", "low", "high"] {
            assert!(svg.contains(label), "missing tick label '{label}'");
        }
    }

    #[test]
    fn a_bar_config_renders_bars_with_value_labels() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("scores.txt"), "0.3 0.7\n0.5 0.2\n").unwrap();

        let save_name = render(
            &dir,
            "scores.conf",
            "! plot_type plotbar\n\
             ! format svg\n\
             ! datafile scores.txt\n\
             ! xticklabel before after\n\
             ! yticklabel zero half\n\
             ! ytick 0 0.5\n\
             ! y_min 0\n\
             ! put_text 1\n\
             ! percentage 1\n\
             ! width 3\n\
             ! height 2\n\
             ! dpi 80\n",
        )
        .unwrap();
        println!("Rendered bar figure: {}", save_name.display());

        let svg = fs::read_to_string(&save_name).unwrap();
        // Two rows of two bars each.
        assert!(svg.contains("<rect"));
        for label in ["before", "after", "zero", "half"] {
            assert!(svg.contains(label), "missing tick label '{label}'");
        }
        // put_text in percentage mode truncates each cell toward zero.
        for value in ["30%", "70%", "50%", "20%"] {
            assert!(svg.contains(value), "missing bar value '{value}'");
        }
    }

    #[test]
    fn mismatched_tick_labels_abort_the_render() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("wave.txt"), "1 3 2 5 4\n").unwrap();

        let err = render(
            &dir,
            "wave.conf",
            "! plot_type ploty\n\
             ! format svg\n\
             ! datafile wave.txt\n\
             ! xticklabel p0 p1\n",
        )
        .unwrap_err();
        println!("Render failed as expected: {err}");

        assert!(matches!(err, PlotError::Data(_)));
        assert!(err.to_string().contains("2 x tick labels for 5"));
    }

    #[test]
    fn an_unknown_save_format_is_rejected() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("wave.txt"), "1 2\n").unwrap();

        let err = render(
            &dir,
            "wave.conf",
            "! plot_type ploty\n\
             ! format pdf\n\
             ! datafile wave.txt\n",
        )
        .unwrap_err();

        assert!(matches!(err, PlotError::Unsupported { .. }));
    }
}

// tests/render_pipeline_test.rs
