//! Per-invocation audit trail

use tracing::trace;

/// Target of the audit lines, so the logging config can route them.
pub const AUDIT_TARGET: &str = "mcs_cli";

const SEPARATOR_WIDTH: usize = 80;

/// The argument vector the process was started with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationRecord {
    program: String,
    args: Vec<String>,
}

impl InvocationRecord {
    /// `args` excludes the executable path itself.
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Capture the current process arguments.
    pub fn from_env(program: impl Into<String>) -> Self {
        Self::new(program, std::env::args().skip(1).collect())
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// `mcs <args...>` joined with single spaces.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }

    /// Emit the separator and the full command line at trace level.
    pub fn audit(&self) {
        trace!(target: AUDIT_TARGET, "{}", separator());
        trace!(target: AUDIT_TARGET, "Called \"{}\"", self.command_line());
    }
}

pub fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}
