// src/img_tools/mod.rs

pub mod color_bar;
pub mod cropper;
pub mod raster;

// src/img_tools/mod.rs
