//! Backup commands, delegated to the backup manager script

use clap::{Arg, ArgMatches, Command};

use super::{run_delegate, string_values, CommandResult};
use crate::context::CommandContext;
use crate::registry::Leaf;

const FORWARDED: &str = "args";

/// Runs `<backup_manager> <operation> <args...>`.
///
/// Options are owned by the script; every token after the command name is
/// forwarded verbatim.
#[derive(Debug, Clone)]
pub struct BackupManagerCommand {
    operation: &'static str,
    help: &'static str,
}

impl BackupManagerCommand {
    pub const fn new(operation: &'static str, help: &'static str) -> Self {
        Self { operation, help }
    }

    pub fn operation(&self) -> &str {
        self.operation
    }
}

impl Leaf for BackupManagerCommand {
    fn help(&self) -> &str {
        self.help
    }

    fn arguments(&self, cmd: Command) -> Command {
        cmd.arg(
            Arg::new(FORWARDED)
                .value_name("ARGS")
                .help("Options passed to the backup manager")
                .num_args(0..)
                .trailing_var_arg(true)
                .allow_hyphen_values(true),
        )
    }

    fn invoke(&self, ctx: &CommandContext, args: &ArgMatches) -> CommandResult<()> {
        let script = ctx.settings.backup_manager.to_string_lossy().into_owned();
        let mut forwarded = vec![self.operation.to_string()];
        forwarded.extend(string_values(args, FORWARDED));
        run_delegate(ctx, &script, &forwarded)
    }
}

pub fn backup() -> BackupManagerCommand {
    BackupManagerCommand::new("backup", "Backup Columnstore and/or MariaDB data.")
}

pub fn dbrm_backup() -> BackupManagerCommand {
    BackupManagerCommand::new("dbrm_backup", "Columnstore DBRM Backup.")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::commands::CommandError;
    use crate::config::Settings;
    use crate::logging::InvocationRecord;
    use crate::util::testing::RecordingRunner;

    fn run(
        leaf: &BackupManagerCommand,
        tokens: &[&str],
        runner: Arc<RecordingRunner>,
    ) -> CommandResult<()> {
        let cmd = leaf.arguments(Command::new("backup"));
        let matches = cmd
            .try_get_matches_from(std::iter::once("backup").chain(tokens.iter().copied()))
            .expect("parse");
        let ctx = CommandContext::with_deps(
            Settings::default(),
            runner,
            InvocationRecord::new("mcs", vec![]),
        );
        leaf.invoke(&ctx, &matches)
    }

    #[test]
    fn given_script_options_when_invoked_then_forwarded_verbatim() {
        let runner = Arc::new(RecordingRunner::exiting_with(0));

        run(
            &backup(),
            &["-bl", "/data/backups", "--parallel", "4"],
            Arc::clone(&runner),
        )
        .expect("backup");

        let calls = runner.calls();
        assert_eq!(calls[0].program, "/usr/bin/mcs_backup_manager.sh");
        assert_eq!(
            calls[0].args,
            vec!["backup", "-bl", "/data/backups", "--parallel", "4"]
        );
    }

    #[test]
    fn given_no_options_when_invoked_then_only_operation() {
        let runner = Arc::new(RecordingRunner::exiting_with(0));

        run(&dbrm_backup(), &[], Arc::clone(&runner)).expect("dbrm_backup");

        assert_eq!(runner.calls()[0].args, vec!["dbrm_backup"]);
    }

    #[test]
    fn given_script_fails_when_invoked_then_exit_code_propagated() {
        let runner = Arc::new(RecordingRunner::exiting_with(3));

        let err = run(&backup(), &[], runner).expect_err("should fail");

        assert!(matches!(err, CommandError::Exited { code: 3, .. }));
        assert_eq!(err.exit_code(), 3);
    }
}
