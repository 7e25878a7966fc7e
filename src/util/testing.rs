//! Test support: logging setup and a recording process runner

use std::env;
use std::io;
use std::process::ExitStatus;
use std::sync::{Mutex, Once, PoisonError};

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::infrastructure::CommandRunner;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");

    // Create a filter for noisy modules
    let noisy_modules = ["config"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// One recorded spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub program: String,
    pub args: Vec<String>,
    /// What was written to the child's stdin, if anything
    pub stdin: Option<String>,
}

/// `CommandRunner` that records every spawn instead of running it.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    calls: Mutex<Vec<RecordedCall>>,
    exit_code: i32,
    spawn_fails: bool,
}

impl RecordingRunner {
    /// Every spawned program "exits" with `exit_code`.
    pub fn exiting_with(exit_code: i32) -> Self {
        Self {
            exit_code,
            ..Self::default()
        }
    }

    /// Every spawn fails as if the program were not installed.
    pub fn spawn_failing() -> Self {
        Self {
            spawn_fails: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl RecordingRunner {
    fn record(&self, cmd: &str, args: &[String], stdin: Option<&[u8]>) -> io::Result<ExitStatus> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedCall {
                program: cmd.to_string(),
                args: args.to_vec(),
                stdin: stdin.map(|bytes| String::from_utf8_lossy(bytes).into_owned()),
            });
        if self.spawn_fails {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{cmd}: not found"),
            ));
        }
        Ok(exit_status(self.exit_code))
    }
}

impl CommandRunner for RecordingRunner {
    fn status(&self, cmd: &str, args: &[String]) -> io::Result<ExitStatus> {
        self.record(cmd, args, None)
    }

    fn status_with_input(
        &self,
        cmd: &str,
        args: &[String],
        input: &[u8],
    ) -> io::Result<ExitStatus> {
        self.record(cmd, args, Some(input))
    }
}

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw((code & 0xff) << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}
