// src/config/parser.rs
//
// Reader for the toolkit's plain-text config files. One directive per
// line: `! <option> <value...>`. Lines starting with '#' are comments.
// Values are space-delimited, with '&' standing in for a literal space.

use std::fs;
use std::path::Path;

use crate::config::store::ConfigStore;
use crate::error::PlotError;
use crate::types::PlotResult;

const SET_SYMBOL: &str = "!";

/// Parses a config file into a fully populated [`ConfigStore`].
///
/// Under `strict`, an option name the schema does not know is fatal;
/// otherwise it is skipped. Unknown line markers are always fatal.
/// After parsing, datafile entries that do not exist on disk are
/// re-anchored relative to the config file's directory, and the config
/// path itself is recorded for save-name derivation.
pub fn parse_config_file(path: &Path, strict: bool) -> PlotResult<ConfigStore> {
    let contents = fs::read_to_string(path).map_err(|e| {
        PlotError::config(format!("cannot read config file '{}': {e}", path.display()))
    })?;

    let mut store = ConfigStore::new();

    for (idx, line) in contents.lines().enumerate() {
        // Single-space split, not a whitespace split: the '&' placeholder
        // scheme relies on values never containing real spaces.
        let tokens: Vec<&str> = line.trim().split(' ').collect();

        let flag = tokens[0];
        if flag.is_empty() || flag.starts_with('#') {
            continue;
        }
        if flag != SET_SYMBOL {
            return Err(PlotError::config(format!(
                "unknown flag '{}' in config line {}",
                flag,
                idx + 1
            )));
        }

        let (option, values) = match tokens.get(1) {
            Some(option) if tokens.len() > 2 => (*option, &tokens[2..]),
            _ => {
                return Err(PlotError::config(format!(
                    "malformed directive at line {}: expected '! <option> <value>'",
                    idx + 1
                )))
            }
        };

        let known = store.assign(option, values)?;
        if !known && strict {
            return Err(PlotError::config(format!("unknown option '{option}'")));
        }
    }

    fix_datafile_paths(&mut store, path)?;
    store.set_source_path(path.to_path_buf());

    Ok(store)
}

/// Datafile entries are tried as given first; entries that do not exist
/// are rewritten relative to the config file's directory, whether or not
/// that rewrite produces an existing path.
fn fix_datafile_paths(store: &mut ConfigStore, config_path: &Path) -> PlotResult<()> {
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new(""));

    let fixed: Vec<String> = store
        .list("datafile")?
        .iter()
        .map(|entry| {
            if Path::new(entry).exists() {
                entry.clone()
            } else {
                base_dir.join(entry).to_string_lossy().into_owned()
            }
        })
        .collect();

    store.set_list("datafile", fixed)
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_conf(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn parses_directives_and_skips_comments() {
        let dir = TempDir::new().unwrap();
        let conf = write_conf(
            &dir,
            "demo.conf",
            "# header comment\n\
             ## another comment\n\
             \n\
             ! title Train&loss\n\
             ! dpi 150\n\
             ! legend run&1 run&2\n\
             ! grid_on 0\n",
        );

        let store = parse_config_file(&conf, true).unwrap();
        assert_eq!(store.text("title").unwrap(), "Train loss");
        assert_eq!(store.number("dpi").unwrap(), 150.0);
        assert_eq!(
            store.list("legend").unwrap(),
            ["run 1".to_string(), "run 2".to_string()]
        );
        assert!(!store.flag("grid_on").unwrap());
        assert_eq!(store.source_path(), conf.as_path());
    }

    #[test]
    fn rejects_unknown_line_marker() {
        let dir = TempDir::new().unwrap();
        let conf = write_conf(&dir, "demo.conf", "? title oops\n");
        let err = parse_config_file(&conf, true).unwrap_err();
        assert!(matches!(err, PlotError::Config(_)));
        assert!(err.to_string().contains("unknown flag"));
    }

    #[test]
    fn unknown_option_is_fatal_only_under_strict() {
        let dir = TempDir::new().unwrap();
        let conf = write_conf(&dir, "demo.conf", "! no_such_option 1\n");

        assert!(parse_config_file(&conf, true).is_err());
        assert!(parse_config_file(&conf, false).is_ok());
    }

    #[test]
    fn malformed_directive_is_fatal() {
        let dir = TempDir::new().unwrap();
        let conf = write_conf(&dir, "demo.conf", "! title\n");
        let err = parse_config_file(&conf, true).unwrap_err();
        assert!(err.to_string().contains("malformed directive"));
    }

    #[test]
    fn missing_datafiles_are_anchored_at_the_config_dir() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "1 2\n").unwrap();
        let conf = write_conf(&dir, "demo.conf", "! datafile a.txt b.txt\n");

        let store = parse_config_file(&conf, true).unwrap();
        let files = store.list("datafile").unwrap();
        // a.txt does not exist relative to the test's working directory,
        // so both entries are rewritten against the config dir.
        assert_eq!(files[0], dir.path().join("a.txt").to_string_lossy());
        assert_eq!(files[1], dir.path().join("b.txt").to_string_lossy());
    }
}

// src/config/parser.rs
