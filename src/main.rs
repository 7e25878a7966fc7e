use std::process;

use mcs_cli::cli::{self, output, CliResult, PROGRAM_NAME};
use mcs_cli::config::Settings;
use mcs_cli::context::CommandContext;
use mcs_cli::logging::{self, InvocationRecord};

fn main() {
    let code = match run() {
        Ok(code) => code,
        Err(e) => {
            output::error(&e);
            e.exit_code()
        }
    };
    process::exit(code);
}

fn run() -> CliResult<i32> {
    let settings = Settings::load()?;
    logging::initialize(&settings.log_config)?;

    let invocation = InvocationRecord::from_env(PROGRAM_NAME);
    let ctx = CommandContext::new(settings, invocation);
    let dispatcher = cli::dispatcher()?;
    dispatcher.run(&ctx)
}
