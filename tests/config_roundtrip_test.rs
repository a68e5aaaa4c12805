// tests/config_roundtrip_test.rs

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use plotkit::config::options::{PlotOptions, PlotType};
    use plotkit::config::parser::parse_config_file;
    use plotkit::data_input::sorting::SortMode;

    #[test]
    fn a_written_config_resolves_to_typed_options() {
        let dir = TempDir::new().unwrap();
        let conf_path = dir.path().join("loss.conf");
        fs::write(
            &conf_path,
            "# training loss figure\n\
             ! plot_type plotxy\n\
             ! title Loss&over&epochs\n\
             ! xlabel epoch\n\
             ! ylabel loss\n\
             ! legend run&A run&B\n\
             ! color r b\n\
             ! line_style - --\n\
             ! width 4\n\
             ! height 3\n\
             ! dpi 110\n\
             ! grid_on 0\n\
             ! sort_data ascend\n\
             ! datafile a.txt b.txt\n\
             \n\
             ## trailing comment\n",
        )
        .unwrap();

        let store = parse_config_file(&conf_path, true).unwrap();
        let opts = PlotOptions::from_store(&store).unwrap();

        assert_eq!(opts.plot_type, PlotType::Plotxy);
        assert_eq!(opts.title, "Loss over epochs");
        assert_eq!(opts.xlabel, "epoch");
        assert_eq!(opts.ylabel, ["loss".to_string()]);
        assert_eq!(opts.legend, ["run A".to_string(), "run B".to_string()]);
        assert_eq!(opts.color, ["r".to_string(), "b".to_string()]);
        assert_eq!(opts.line_style, ["-".to_string(), "--".to_string()]);
        assert_eq!(opts.width, 4.0);
        assert_eq!(opts.height, 3.0);
        assert_eq!(opts.dpi, 110.0);
        assert!(!opts.grid_on);
        assert_eq!(opts.sort_data, SortMode::Ascend);

        // Data files missing from the working directory are re-anchored
        // at the config directory.
        assert_eq!(
            opts.datafile[0],
            dir.path().join("a.txt").to_string_lossy()
        );
        assert_eq!(
            opts.datafile[1],
            dir.path().join("b.txt").to_string_lossy()
        );
    }

    #[test]
    fn untouched_options_keep_their_defaults() {
        let dir = TempDir::new().unwrap();
        let conf_path = dir.path().join("bare.conf");
        fs::write(&conf_path, "! plot_type ploty\n").unwrap();

        let store = parse_config_file(&conf_path, true).unwrap();
        let opts = PlotOptions::from_store(&store).unwrap();

        assert_eq!(opts.format, "png");
        assert_eq!(opts.dpi, 220.0);
        assert_eq!(opts.max_point_num, 1000);
        assert_eq!(opts.sort_data, SortMode::None);
        assert!(opts.grid_on);
        assert_eq!(opts.color.len(), 17);
        assert_eq!(opts.marker.len(), 11);
    }

    #[test]
    fn the_figure_name_derives_from_the_config_location() {
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("exp7");
        fs::create_dir(&sub).unwrap();
        let conf_path = sub.join("curves.conf");
        fs::write(&conf_path, "! format svg\n").unwrap();

        let store = parse_config_file(&conf_path, true).unwrap();
        let opts = PlotOptions::from_store(&store).unwrap();

        assert_eq!(opts.save_name(""), sub.join("exp7_curves.svg"));
        assert_eq!(opts.save_name("v1_"), sub.join("v1_exp7_curves.svg"));
    }
}

// tests/config_roundtrip_test.rs
