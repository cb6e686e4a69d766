//! Command-line front end.

pub mod cli;
pub mod ui;
