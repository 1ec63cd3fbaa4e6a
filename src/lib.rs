//! Terminal dashboard of geocoded localities with cascading region/state
//! filters, a braille scatter map and a per-state bar chart.

pub mod app;
pub mod binder;
pub mod braille;
pub mod config;
pub mod data;
pub mod filter;
pub mod map;
pub mod options;
pub mod ui;
