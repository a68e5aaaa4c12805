// src/lib.rs - Library interface for internal module access

pub mod config;
pub mod constants;
pub mod data_input;
pub mod error;
pub mod img_tools;
pub mod plot_framework;
pub mod plot_functions;
pub mod types;
