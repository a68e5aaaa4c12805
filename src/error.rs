// src/error.rs

use std::io;
use thiserror::Error;

/// Fatal error classes for the toolkit. There is no retry and no
/// partial-success path: the first error aborts the whole invocation.
#[derive(Debug, Error)]
pub enum PlotError {
    /// Bad config file or bad option literal (unknown flag, unknown
    /// parameter under strict parsing, malformed directive line, value
    /// that does not coerce).
    #[error("config error: {0}")]
    Config(String),

    /// Data file problems and shape mismatches (missing/empty/ragged
    /// file, tick count vs. data count, unequal x values under sorting).
    #[error("data error: {0}")]
    Data(String),

    /// Crop box or arrow endpoint outside the image bounds.
    #[error("geometry error: {0}")]
    Geometry(String),

    /// A value the pipeline cannot handle: save extension, image bit
    /// depth, colormap name.
    #[error("unsupported {what}: {value}")]
    Unsupported { what: &'static str, value: String },

    #[error(transparent)]
    Io(#[from] io::Error),

    /// Backend failure while drawing or writing a figure.
    #[error("render error: {0}")]
    Render(String),
}

impl PlotError {
    pub fn config(msg: impl Into<String>) -> Self {
        PlotError::Config(msg.into())
    }

    pub fn data(msg: impl Into<String>) -> Self {
        PlotError::Data(msg.into())
    }

    pub fn geometry(msg: impl Into<String>) -> Self {
        PlotError::Geometry(msg.into())
    }

    pub fn unsupported(what: &'static str, value: impl Into<String>) -> Self {
        PlotError::Unsupported {
            what,
            value: value.into(),
        }
    }

    pub fn render(msg: impl std::fmt::Display) -> Self {
        PlotError::Render(msg.to_string())
    }
}

// src/error.rs
