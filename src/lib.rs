//! `mcs`: unified command line for cluster, API, backup and restore tools

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod exitcode;
pub mod infrastructure;
pub mod logging;
pub mod registry;
pub mod util;
