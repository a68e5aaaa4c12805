// src/config/store.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_COLOR_CYCLE, DEFAULT_MARKER_CYCLE};
use crate::error::PlotError;
use crate::types::PlotResult;

// Value tokens containing this character have it turned into a space,
// so multi-word titles and labels survive the space-delimited file format.
const SPACE_SYMBOL: char = '&';

/// A single configuration value. The variant is fixed by the schema
/// default for each option; assignments coerce into that variant and it
/// never changes over the store's lifetime.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Number(f64),
    Text(String),
    List(Vec<String>),
    Flag(bool),
}

/// The full option table with its defaults, plus the path of the config
/// file it was loaded from. Every option the toolkit understands is
/// present from construction; parsing only overwrites values.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    values: BTreeMap<&'static str, ConfigValue>,
    source_path: PathBuf,
}

impl ConfigStore {
    pub fn new() -> Self {
        use ConfigValue::{Flag, List, Number, Text};

        let mut v: BTreeMap<&'static str, ConfigValue> = BTreeMap::new();

        // --- Plot type and output ---
        v.insert("plot_type", Text("ploty".into()));
        v.insert("format", Text("png".into()));

        // --- Canvas ---
        v.insert("width", Number(3.0));
        v.insert("height", Number(3.0));
        v.insert("dpi", Number(220.0));

        // --- Title and axis labels ---
        v.insert("title", Text(String::new()));
        v.insert("title_font", Text("x-large".into()));
        v.insert("xlabel", Text(String::new()));
        v.insert("xlabel_font", Text("x-large".into()));
        // Two ylabels in twin mode, so this one is a list.
        v.insert("ylabel", List(Vec::new()));
        v.insert("ylabel_font", Text("x-large".into()));

        // --- Ticks ---
        v.insert("xticklabel", List(Vec::new()));
        v.insert("xtick_font", Text("x-large".into()));
        v.insert("xtick_rot", Number(0.0));
        v.insert("xtick_path", Text(String::new()));
        v.insert("yticklabel", List(Vec::new()));
        v.insert("ytick", List(Vec::new()));
        v.insert("ytick_font", Text("x-large".into()));
        v.insert("ytick_rot", Number(0.0));

        // --- Value ranges (infinities mean "not set") ---
        v.insert("x_min", Number(f64::INFINITY));
        v.insert("x_max", Number(f64::NEG_INFINITY));
        v.insert("y_min", List(Vec::new()));
        v.insert("y_max", List(Vec::new()));

        // --- Legend ---
        v.insert("legend_loc", Text("upper left".into()));
        v.insert("legend", List(Vec::new()));
        v.insert("legend_ncol", Number(1.0));
        v.insert("legend_font", Text("x-large".into()));
        v.insert("bbox_to_anchor", List(Vec::new()));
        v.insert("custom_legend", Flag(false));

        // --- Grid ---
        v.insert("grid_on", Flag(true));

        // --- Data ---
        v.insert("datafile", List(Vec::new()));
        v.insert("max_point_num", Number(1000.0));
        v.insert("sort_data", Text("None".into()));

        // --- Curves ---
        v.insert("color", List(string_list(&DEFAULT_COLOR_CYCLE)));
        v.insert("linewidth", Number(3.0));
        v.insert("line_style", List(vec!["-".into()]));
        v.insert("max_curve_num", Number(-1.0));
        v.insert("markersize", Number(6.0));
        v.insert("marker", List(string_list(&DEFAULT_MARKER_CYCLE)));
        v.insert("draw_dot", Number(0.0));
        v.insert("dotsize", Number(8.0));

        // --- Bars ---
        v.insert("bar_width", Number(0.2));
        v.insert("opacity", List(vec!["0.9".into()]));
        v.insert("put_text", Flag(true));
        v.insert("text_font", Number(13.0));
        v.insert("text_prec", Text(String::new()));
        v.insert("percentage", Flag(false));

        ConfigStore {
            values: v,
            source_path: PathBuf::new(),
        }
    }

    /// Assigns `tokens` to the named option, coercing into the option's
    /// schema variant. Returns `Ok(false)` when the option is unknown so
    /// the parser can decide between strict and lenient handling.
    pub fn assign(&mut self, name: &str, tokens: &[&str]) -> PlotResult<bool> {
        let first = *tokens
            .first()
            .ok_or_else(|| PlotError::config(format!("option '{name}' has no value")))?;

        let slot = match self.values.get_mut(name) {
            Some(slot) => slot,
            None => return Ok(false),
        };

        *slot = match slot {
            ConfigValue::Number(_) => {
                let parsed = first.parse::<f64>().map_err(|_| {
                    PlotError::config(format!("value '{first}' for option '{name}' is not a number"))
                })?;
                ConfigValue::Number(parsed)
            }
            ConfigValue::Text(_) => ConfigValue::Text(decode_spaces(first)),
            ConfigValue::List(_) => ConfigValue::List(tokens.iter().map(|t| decode_spaces(t)).collect()),
            ConfigValue::Flag(_) => ConfigValue::Flag(first == "1"),
        };
        Ok(true)
    }

    pub fn number(&self, name: &str) -> PlotResult<f64> {
        match self.values.get(name) {
            Some(ConfigValue::Number(n)) => Ok(*n),
            Some(_) => Err(PlotError::config(format!("option '{name}' is not a number"))),
            None => Err(PlotError::config(format!("unknown option '{name}'"))),
        }
    }

    pub fn text(&self, name: &str) -> PlotResult<&str> {
        match self.values.get(name) {
            Some(ConfigValue::Text(s)) => Ok(s),
            Some(_) => Err(PlotError::config(format!("option '{name}' is not text"))),
            None => Err(PlotError::config(format!("unknown option '{name}'"))),
        }
    }

    pub fn list(&self, name: &str) -> PlotResult<&[String]> {
        match self.values.get(name) {
            Some(ConfigValue::List(l)) => Ok(l),
            Some(_) => Err(PlotError::config(format!("option '{name}' is not a list"))),
            None => Err(PlotError::config(format!("unknown option '{name}'"))),
        }
    }

    pub fn flag(&self, name: &str) -> PlotResult<bool> {
        match self.values.get(name) {
            Some(ConfigValue::Flag(b)) => Ok(*b),
            Some(_) => Err(PlotError::config(format!("option '{name}' is not a flag"))),
            None => Err(PlotError::config(format!("unknown option '{name}'"))),
        }
    }

    /// Replaces a list option wholesale. Used for the datafile path fixup
    /// after parsing.
    pub fn set_list(&mut self, name: &str, list: Vec<String>) -> PlotResult<()> {
        match self.values.get_mut(name) {
            Some(ConfigValue::List(slot)) => {
                *slot = list;
                Ok(())
            }
            Some(_) => Err(PlotError::config(format!("option '{name}' is not a list"))),
            None => Err(PlotError::config(format!("unknown option '{name}'"))),
        }
    }

    pub fn set_source_path(&mut self, path: PathBuf) {
        self.source_path = path;
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        ConfigStore::new()
    }
}

fn decode_spaces(token: &str) -> String {
    token.replace(SPACE_SYMBOL, " ")
}

fn string_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// --- Tests ---

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_the_schema() {
        let store = ConfigStore::new();
        assert_eq!(store.text("plot_type").unwrap(), "ploty");
        assert_eq!(store.text("format").unwrap(), "png");
        assert_eq!(store.number("dpi").unwrap(), 220.0);
        assert!(store.flag("grid_on").unwrap());
        assert!(!store.flag("custom_legend").unwrap());
        assert_eq!(store.list("line_style").unwrap(), ["-".to_string()]);
        assert_eq!(store.list("color").unwrap().len(), 17);
        assert_eq!(store.list("marker").unwrap().len(), 11);
        assert!(store.number("x_min").unwrap().is_infinite());
    }

    #[test]
    fn assign_coerces_into_schema_variant() {
        let mut store = ConfigStore::new();

        store.assign("width", &["4.5"]).unwrap();
        assert_eq!(store.number("width").unwrap(), 4.5);

        store.assign("title", &["Loss&over&epochs", "ignored"]).unwrap();
        assert_eq!(store.text("title").unwrap(), "Loss over epochs");

        store.assign("legend", &["run&A", "run&B"]).unwrap();
        assert_eq!(
            store.list("legend").unwrap(),
            ["run A".to_string(), "run B".to_string()]
        );

        store.assign("grid_on", &["0"]).unwrap();
        assert!(!store.flag("grid_on").unwrap());
        store.assign("grid_on", &["1"]).unwrap();
        assert!(store.flag("grid_on").unwrap());
    }

    #[test]
    fn assign_reports_unknown_options() {
        let mut store = ConfigStore::new();
        assert!(!store.assign("no_such_option", &["1"]).unwrap());
    }

    #[test]
    fn assign_rejects_non_numeric_numbers() {
        let mut store = ConfigStore::new();
        let err = store.assign("dpi", &["fast"]).unwrap_err();
        assert!(matches!(err, PlotError::Config(_)));
    }
}

// src/config/store.rs
