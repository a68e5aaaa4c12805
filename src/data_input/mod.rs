// src/data_input/mod.rs

pub mod bar_loader;
pub mod curve_loader;
pub mod sorting;

// src/data_input/mod.rs
