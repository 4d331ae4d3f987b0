//! Report generation for sweep-bench results
//!
//! This crate turns a finished suite run into files:
//!
//! - PNG charts through [`PlotVisualizer`] (line charts with error bars,
//!   heatmaps, bar comparisons)
//! - CSV tables and a JSON document through [`CsvExporter`] and
//!   [`JsonExporter`]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod charts;
pub mod output;

pub use charts::PlotVisualizer;
pub use output::{CsvExporter, JsonExporter};
