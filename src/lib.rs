//! Sales Lens: an interactive sales dashboard over a Superstore-style table.
//!
//! The [`data`] module is a library of pure functions (load, filter,
//! aggregate, export). Everything else is the egui front end.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod state;
pub mod ui;
