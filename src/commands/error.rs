//! Command handler errors

use std::process::ExitStatus;

use thiserror::Error;

use crate::exitcode;

/// Failures raised by command handlers, propagated unchanged to the exit
/// status of the process.
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {code}")]
    Exited { program: String, code: i32 },

    #[error("{program} was terminated by a signal")]
    Terminated { program: String },

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("encode request body: {0}")]
    Body(#[from] serde_json::Error),
}

pub type CommandResult<T> = Result<T, CommandError>;

impl CommandError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Spawn { .. } => exitcode::OSERR,
            CommandError::Exited { code, .. } => *code,
            CommandError::Terminated { .. } => exitcode::FAILURE,
            CommandError::InvalidArgs(_) => exitcode::USAGE,
            CommandError::Body(_) => exitcode::SOFTWARE,
        }
    }

    /// Turn a non-successful exit status of `program` into an error.
    pub fn check_status(program: &str, status: ExitStatus) -> CommandResult<()> {
        if status.success() {
            return Ok(());
        }
        match status.code() {
            Some(code) => Err(CommandError::Exited {
                program: program.to_string(),
                code,
            }),
            None => Err(CommandError::Terminated {
                program: program.to_string(),
            }),
        }
    }
}
