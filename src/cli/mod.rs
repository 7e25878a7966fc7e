//! CLI layer: command tree composition and dispatch

pub mod app;
pub mod completion;
pub mod dispatcher;
pub mod error;
pub mod output;

pub use app::{dispatcher, registry, PROGRAM_NAME};
pub use dispatcher::{Dispatcher, Resolution};
pub use error::{CliError, CliResult};
