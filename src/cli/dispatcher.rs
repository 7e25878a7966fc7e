//! Argument resolution against the command registry
//!
//! The clap tree is rebuilt from the registry for every dispatch and never
//! holds state of its own. Hidden mounts stay parseable but are marked
//! `hide(true)`; the documented view used for completion scripts leaves them
//! out entirely.

use std::sync::Arc;

use clap::error::ErrorKind;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use tracing::{debug, instrument, warn};

use super::completion::{self, CompletionAction, CompletionRequest};
use super::error::CliResult;
use crate::context::CommandContext;
use crate::exitcode;
use crate::registry::{CommandNode, Group, Leaf};

const INSTALL_COMPLETION: &str = "install-completion";
const SHOW_COMPLETION: &str = "show-completion";

/// Terminal state of resolving one argument vector.
pub enum Resolution {
    /// A leaf was found and its arguments bound.
    ResolvedLeaf {
        /// Names walked from the root, e.g. `["node", "add"]`
        path: Vec<String>,
        leaf: Arc<dyn Leaf>,
        args: ArgMatches,
    },
    /// Rendered help text for stdout.
    HelpRequested(String),
    Completion(CompletionRequest),
    /// Unknown command, missing subcommand or bad arguments.
    Error(clap::Error),
}

impl std::fmt::Debug for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ResolvedLeaf { path, .. } => {
                f.debug_struct("ResolvedLeaf").field("path", path).finish()
            }
            Self::HelpRequested(_) => f.write_str("HelpRequested"),
            Self::Completion(request) => f.debug_tuple("Completion").field(request).finish(),
            Self::Error(err) => f.debug_tuple("Error").field(&err.kind()).finish(),
        }
    }
}

enum State<'m> {
    AwaitingFirstToken(&'m ArgMatches),
    InGroup {
        group: Arc<Group>,
        path: Vec<String>,
        matches: &'m ArgMatches,
    },
}

/// Routes an invocation to exactly one leaf.
pub struct Dispatcher {
    program_name: String,
    root: Arc<Group>,
}

impl Dispatcher {
    pub fn new(program_name: impl Into<String>, root: Arc<Group>) -> Self {
        Self {
            program_name: program_name.into(),
            root,
        }
    }

    /// Full parse tree, hidden mounts and options included.
    pub fn command(&self) -> Command {
        group_command(self.program_name.clone(), &self.root, false)
            .arg_required_else_help(true)
            .subcommand_required(false)
            .args_conflicts_with_subcommands(true)
            .arg(completion_arg(
                INSTALL_COMPLETION,
                "Install completion for the current shell.",
            ))
            .arg(
                completion_arg(SHOW_COMPLETION, "Show completion for the current shell.")
                    .conflicts_with(INSTALL_COMPLETION),
            )
    }

    /// The tree as shown to users: hidden mounts and options left out.
    pub fn documented_command(&self) -> Command {
        group_command(self.program_name.clone(), &self.root, true)
    }

    /// Resolve `args` (without the program name) to a terminal state.
    pub fn resolve<I, T>(&self, args: I) -> Resolution
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let argv = std::iter::once(self.program_name.clone())
            .chain(args.into_iter().map(Into::into));
        let matches = match self.command().try_get_matches_from(argv) {
            Ok(matches) => matches,
            Err(err) => return from_clap_error(err),
        };

        let mut state = State::AwaitingFirstToken(&matches);
        loop {
            state = match state {
                State::AwaitingFirstToken(matches) => {
                    if let Some(request) = completion_request(matches) {
                        return Resolution::Completion(request);
                    }
                    match matches.subcommand() {
                        Some((name, sub)) => {
                            match self.step(&self.root, Vec::new(), name, sub) {
                                Ok(next) => next,
                                Err(resolution) => return resolution,
                            }
                        }
                        None => return self.help(),
                    }
                }
                State::InGroup {
                    group,
                    path,
                    matches,
                } => match matches.subcommand() {
                    Some((name, sub)) => match self.step(&group, path, name, sub) {
                        Ok(next) => next,
                        Err(resolution) => return resolution,
                    },
                    None => {
                        return Resolution::Error(self.command().error(
                            ErrorKind::MissingSubcommand,
                            format!("missing command after '{}'", path.join(" ")),
                        ))
                    }
                },
            };
        }
    }

    /// Advance from `group` into its child `name`; leaves end the walk.
    fn step<'m>(
        &self,
        group: &Group,
        mut path: Vec<String>,
        name: &str,
        matches: &'m ArgMatches,
    ) -> Result<State<'m>, Resolution> {
        path.push(name.to_string());
        match group.lookup(name) {
            Some(CommandNode::Group(child)) => Ok(State::InGroup {
                group: child,
                path,
                matches,
            }),
            Some(CommandNode::Leaf(leaf)) => Err(Resolution::ResolvedLeaf {
                path,
                leaf,
                args: matches.clone(),
            }),
            None => Err(Resolution::Error(self.command().error(
                ErrorKind::InvalidSubcommand,
                format!("no such command '{}'", path.join(" ")),
            ))),
        }
    }

    fn help(&self) -> Resolution {
        Resolution::HelpRequested(self.command().render_help().to_string())
    }

    /// Audit the invocation, resolve it and act on the outcome.
    #[instrument(skip_all)]
    pub fn run(&self, ctx: &CommandContext) -> CliResult<i32> {
        ctx.invocation.audit();

        match self.resolve(ctx.invocation.args().iter().cloned()) {
            Resolution::ResolvedLeaf { path, leaf, args } => {
                debug!(command = %path.join(" "), "resolved");
                leaf.invoke(ctx, &args)?;
                Ok(exitcode::OK)
            }
            Resolution::HelpRequested(help) => {
                print!("{help}");
                Ok(exitcode::OK)
            }
            Resolution::Completion(request) => {
                completion::handle(self.documented_command(), &request)?;
                Ok(exitcode::OK)
            }
            Resolution::Error(err) => {
                if let Err(e) = err.print() {
                    warn!(error = %e, "cannot write usage message");
                }
                Ok(exitcode::USAGE)
            }
        }
    }
}

fn group_command(name: String, group: &Group, documented: bool) -> Command {
    let mut cmd = Command::new(name)
        .about(group.help().to_string())
        .subcommand_required(true)
        .disable_help_subcommand(true);
    for mount in group.mounts() {
        if documented && mount.hidden {
            continue;
        }
        let child = match &mount.node {
            CommandNode::Group(child) => group_command(mount.name.clone(), child, documented),
            CommandNode::Leaf(leaf) => leaf_command(mount.name.clone(), leaf.as_ref()),
        };
        cmd = cmd.subcommand(child.hide(mount.hidden));
    }
    cmd
}

fn leaf_command(name: String, leaf: &dyn Leaf) -> Command {
    let cmd = Command::new(name)
        .about(leaf.help().to_string())
        .disable_help_flag(!leaf.help_flag());
    leaf.arguments(cmd)
}

fn completion_arg(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .value_name("SHELL")
        .num_args(0..=1)
        .action(ArgAction::Set)
        .value_parser(value_parser!(Shell))
        .hide(true)
        .help(help)
}

fn completion_request(matches: &ArgMatches) -> Option<CompletionRequest> {
    [
        (INSTALL_COMPLETION, CompletionAction::Install),
        (SHOW_COMPLETION, CompletionAction::Show),
    ]
    .into_iter()
    .find(|(id, _)| matches.contains_id(id))
    .map(|(id, action)| CompletionRequest {
        action,
        shell: matches.get_one::<Shell>(id).copied(),
    })
}

fn from_clap_error(err: clap::Error) -> Resolution {
    match err.kind() {
        ErrorKind::DisplayHelp
        | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
        | ErrorKind::DisplayVersion => Resolution::HelpRequested(err.render().to_string()),
        _ => Resolution::Error(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::FnLeaf;

    fn dispatcher() -> Dispatcher {
        let root = Arc::new(Group::new("root help"));
        let cluster = Arc::new(Group::new("cluster help"));
        cluster
            .register_leaf("start", FnLeaf::new("Start it", |_, _| Ok(())), false)
            .unwrap();
        let node = Arc::new(Group::new("node help"));
        node.register_leaf("add", FnLeaf::new("Add node", |_, _| Ok(())), false)
            .unwrap();
        cluster.register("node", node, false).unwrap();
        root.merge(Arc::clone(&cluster)).unwrap();
        root.register("cluster", cluster, true).unwrap();
        Dispatcher::new("mcs", root)
    }

    #[test]
    fn verify_command_tree() {
        dispatcher().command().debug_assert();
    }

    #[test]
    fn given_nested_path_when_resolving_then_leaf_path_recorded() {
        let resolution = dispatcher().resolve(["node", "add"]);
        let Resolution::ResolvedLeaf { path, leaf, .. } = resolution else {
            panic!("expected a leaf");
        };
        assert_eq!(path, vec!["node", "add"]);
        assert_eq!(leaf.help(), "Add node");
    }

    #[test]
    fn given_group_without_command_when_resolving_then_error() {
        let resolution = dispatcher().resolve(["node"]);
        assert!(matches!(resolution, Resolution::Error(_)), "{resolution:?}");
    }

    #[test]
    fn given_show_completion_without_shell_when_resolving_then_shell_left_open() {
        let resolution = dispatcher().resolve(["--show-completion"]);
        let Resolution::Completion(request) = resolution else {
            panic!("expected a completion request");
        };
        assert_eq!(request.action, CompletionAction::Show);
        assert_eq!(request.shell, None);
    }

    #[test]
    fn given_install_completion_with_shell_when_resolving_then_shell_parsed() {
        let resolution = dispatcher().resolve(["--install-completion", "zsh"]);
        let Resolution::Completion(request) = resolution else {
            panic!("expected a completion request");
        };
        assert_eq!(request.action, CompletionAction::Install);
        assert_eq!(request.shell, Some(Shell::Zsh));
    }

    #[test]
    fn given_documented_view_when_listing_then_hidden_mount_absent() {
        let dispatcher = dispatcher();
        let documented: Vec<_> = dispatcher
            .documented_command()
            .get_subcommands()
            .map(|c| c.get_name().to_string())
            .collect();
        assert_eq!(documented, vec!["start", "node"]);
        assert!(dispatcher.command().find_subcommand("cluster").is_some());
    }
}
