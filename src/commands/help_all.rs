//! `help-all`: open the tool's manual page

use clap::ArgMatches;
use tracing::debug;

use super::{CommandError, CommandResult};
use crate::context::CommandContext;
use crate::registry::Leaf;

/// Hands the terminal to the manual viewer and waits for it.
///
/// Takes no arguments and has no `--help` flag of its own. The viewer's exit
/// status is not an error; failing to start it is.
#[derive(Debug, Default)]
pub struct HelpAll;

impl Leaf for HelpAll {
    fn help(&self) -> &str {
        "Show help for all commands in man page style."
    }

    fn help_flag(&self) -> bool {
        false
    }

    fn invoke(&self, ctx: &CommandContext, _args: &ArgMatches) -> CommandResult<()> {
        let viewer = ctx.settings.man_viewer.as_str();
        let page = ctx.program_name().to_string();
        debug!(viewer, page, "opening manual page");

        let status = ctx
            .runner
            .status(viewer, &[page])
            .map_err(|source| CommandError::Spawn {
                program: viewer.to_string(),
                source,
            })?;
        debug!(%status, "manual viewer exited");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::config::Settings;
    use crate::logging::InvocationRecord;
    use crate::util::testing::RecordingRunner;

    fn context(runner: Arc<RecordingRunner>) -> CommandContext {
        CommandContext::with_deps(
            Settings::default(),
            runner,
            InvocationRecord::new("mcs", vec!["help-all".into()]),
        )
    }

    #[test]
    fn given_help_all_when_invoked_then_opens_program_page() {
        let runner = Arc::new(RecordingRunner::exiting_with(0));
        let ctx = context(Arc::clone(&runner));

        HelpAll.invoke(&ctx, &ArgMatches::default()).expect("help-all");

        let calls = runner.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "man");
        assert_eq!(calls[0].args, vec!["mcs"]);
    }

    #[test]
    fn given_viewer_failing_when_invoked_then_still_ok() {
        let runner = Arc::new(RecordingRunner::exiting_with(16));
        let ctx = context(Arc::clone(&runner));

        assert!(HelpAll.invoke(&ctx, &ArgMatches::default()).is_ok());
    }

    #[test]
    fn given_viewer_missing_when_invoked_then_spawn_error() {
        let runner = Arc::new(RecordingRunner::spawn_failing());
        let ctx = context(runner);

        let err = HelpAll
            .invoke(&ctx, &ArgMatches::default())
            .expect_err("spawn should fail");
        assert!(matches!(err, CommandError::Spawn { ref program, .. } if program == "man"));
    }

    #[test]
    fn test_help_flag_disabled() {
        assert!(!HelpAll.help_flag());
    }
}
