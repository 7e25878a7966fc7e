//! I/O boundary traits for testability
//!
//! Commands never spawn processes directly; they go through `CommandRunner`
//! so tests can observe the spawn without running the real program.

use std::io::{self, Write};
use std::process::{ExitStatus, Stdio};

/// External command runner abstraction.
pub trait CommandRunner: Send + Sync {
    /// Run `cmd` with inherited stdio and block until it exits.
    fn status(&self, cmd: &str, args: &[String]) -> io::Result<ExitStatus>;

    /// Like `status`, but `input` is written to the child's stdin, which is
    /// then closed. Stdout and stderr stay inherited.
    fn status_with_input(
        &self,
        cmd: &str,
        args: &[String],
        input: &[u8],
    ) -> io::Result<ExitStatus>;
}

/// Real command runner implementation.
#[derive(Debug, Default)]
pub struct RealCommandRunner;

impl CommandRunner for RealCommandRunner {
    fn status(&self, cmd: &str, args: &[String]) -> io::Result<ExitStatus> {
        std::process::Command::new(cmd).args(args).status()
    }

    fn status_with_input(
        &self,
        cmd: &str,
        args: &[String],
        input: &[u8],
    ) -> io::Result<ExitStatus> {
        let mut child = std::process::Command::new(cmd)
            .args(args)
            .stdin(Stdio::piped())
            .spawn()?;
        if let Some(mut stdin) = child.stdin.take() {
            // a child that exits without reading closes the pipe early
            if let Err(e) = stdin.write_all(input) {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    return Err(e);
                }
            }
        }
        child.wait()
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn given_true_when_running_then_success() {
        let status = RealCommandRunner.status("true", &[]).expect("spawn true");
        assert!(status.success());
    }

    #[test]
    fn given_input_when_running_with_input_then_child_reads_it() {
        let args = vec!["-c".to_string(), "read line && test \"$line\" = hello".to_string()];
        let status = RealCommandRunner
            .status_with_input("sh", &args, b"hello\n")
            .expect("spawn sh");
        assert!(status.success());
    }

    #[test]
    fn given_missing_program_when_running_then_spawn_error() {
        let result = RealCommandRunner.status("mcs-no-such-program-xyz", &[]);
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
    }
}
