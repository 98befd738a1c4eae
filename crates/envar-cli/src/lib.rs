//! CLI library components for envar.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod paths;
pub mod summary;
