//! Command implementations mounted in the registry
//!
//! Each command delegates to an external program: the backup manager
//! script, the manual viewer, or the transport used for management API
//! requests.

pub mod api;
pub mod backup;
pub mod cluster;
pub mod cmapi;
pub mod error;
pub mod help_all;
pub mod restore;

use tracing::debug;

use crate::context::CommandContext;

pub use error::{CommandError, CommandResult};

/// Run `program` with `args` through the context's runner and map its exit
/// status onto a `CommandError`.
pub fn run_delegate(ctx: &CommandContext, program: &str, args: &[String]) -> CommandResult<()> {
    debug!(program, args = args.len(), "delegating");
    let status = ctx.runner.status(program, args);
    finish(program, status)
}

/// Like `run_delegate`, feeding `input` to the program's stdin.
///
/// Only the program name and argument count are logged; `input` never is.
pub fn run_delegate_with_input(
    ctx: &CommandContext,
    program: &str,
    args: &[String],
    input: &str,
) -> CommandResult<()> {
    debug!(program, args = args.len(), "delegating with stdin");
    let status = ctx
        .runner
        .status_with_input(program, args, input.as_bytes());
    finish(program, status)
}

fn finish(program: &str, status: std::io::Result<std::process::ExitStatus>) -> CommandResult<()> {
    let status = status.map_err(|source| CommandError::Spawn {
        program: program.to_string(),
        source,
    })?;
    CommandError::check_status(program, status)
}

/// Collect the values of a multi-valued string argument.
pub(crate) fn string_values(args: &clap::ArgMatches, id: &str) -> Vec<String> {
    args.get_many::<String>(id)
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}
