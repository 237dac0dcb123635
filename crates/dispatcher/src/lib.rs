//! # Output Dispatcher
//!
//! Derived-frame fan-out to the analysis tables.
//!
//! Responsibilities:
//! - Maintain the set of open table files for a replay session
//! - Format each emitted frame into every table's fixed row layout
//! - Flush and close everything on orderly shutdown
//!
//! The table layouts (headers, column order, printf precisions and
//! integer scalings) are a compatibility contract with downstream
//! plotting tools and are reproduced exactly.

pub mod encode;

mod fanout;
mod tables;

pub use fanout::SinkDispatcher;
pub use tables::{
    Ekf1Table, Ekf2Table, Ekf3Table, Ekf4Table, Plot2Table, PlotTable,
};
