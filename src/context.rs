//! Execution context handed to every command
//!
//! Wires settings, the process runner and the invocation record together.

use std::sync::Arc;

use crate::config::Settings;
use crate::infrastructure::{CommandRunner, RealCommandRunner};
use crate::logging::InvocationRecord;

/// Shared state for one invocation.
pub struct CommandContext {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Command runner abstraction
    pub runner: Arc<dyn CommandRunner>,

    /// Arguments the process was started with
    pub invocation: InvocationRecord,
}

impl CommandContext {
    /// Create a context with the real process runner.
    pub fn new(settings: Settings, invocation: InvocationRecord) -> Self {
        Self::with_deps(settings, Arc::new(RealCommandRunner), invocation)
    }

    /// Create a context with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        runner: Arc<dyn CommandRunner>,
        invocation: InvocationRecord,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            runner,
            invocation,
        }
    }

    /// Name the tool was invoked as.
    pub fn program_name(&self) -> &str {
        self.invocation.program()
    }
}
