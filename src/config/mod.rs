// src/config/mod.rs

pub mod options;
pub mod parser;
pub mod store;

// src/config/mod.rs
