//! Cluster lifecycle commands
//!
//! Mounted twice by the application: merged into the top-level namespace and
//! under the hidden legacy `cluster` name.

use std::sync::Arc;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use serde_json::{json, Value};

use super::api::{ApiCommand, ApiRequest, Method};
use super::{string_values, CommandError, CommandResult};
use crate::registry::{Group, RegistryResult};

const TIMEOUT: &str = "timeout";
const NODE: &str = "node";
const MODE: &str = "mode";
const KEY: &str = "key";
const LEVEL: &str = "level";

/// Build the cluster command group.
pub fn group() -> RegistryResult<Arc<Group>> {
    let cluster = Arc::new(Group::new("MCS cluster management command line tool."));

    cluster.register_leaf(
        "status",
        ApiCommand::new("Get status information.", |_| {
            Ok(vec![ApiRequest::get("cluster/status")])
        }),
        false,
    )?;
    cluster.register_leaf(
        "stop",
        ApiCommand::new("Stop the Columnstore cluster.", |args| {
            Ok(vec![shutdown(args)])
        })
        .with_arguments(timeout_arg),
        false,
    )?;
    cluster.register_leaf(
        "start",
        ApiCommand::new("Start the Columnstore cluster.", |args| Ok(vec![start(args)]))
            .with_arguments(timeout_arg),
        false,
    )?;
    cluster.register_leaf(
        "restart",
        ApiCommand::new("Restart the Columnstore cluster.", |args| {
            Ok(vec![shutdown(args), start(args)])
        })
        .with_arguments(timeout_arg),
        false,
    )?;

    cluster.register("node", node_group()?, false)?;
    cluster.register("set", set_group()?, false)?;

    Ok(cluster)
}

fn node_group() -> RegistryResult<Arc<Group>> {
    let node = Arc::new(Group::new("Cluster nodes management."));
    node.register_leaf(
        "add",
        ApiCommand::new("Add nodes to the Columnstore cluster.", |args| {
            node_requests(args, Method::Put)
        })
        .with_arguments(node_arg),
        false,
    )?;
    node.register_leaf(
        "remove",
        ApiCommand::new("Remove nodes from the Columnstore cluster.", |args| {
            node_requests(args, Method::Delete)
        })
        .with_arguments(node_arg),
        false,
    )?;
    Ok(node)
}

fn set_group() -> RegistryResult<Arc<Group>> {
    let set = Arc::new(Group::new("Set cluster parameters."));
    set.register_leaf(
        "mode",
        ApiCommand::new("Set cluster mode.", |args| {
            let mode = required(args, MODE)?;
            Ok(vec![
                ApiRequest::put("cluster/mode-set").with_body(json!({ "mode": mode }))
            ])
        })
        .with_arguments(|cmd| {
            cmd.arg(
                Arg::new(MODE)
                    .long(MODE)
                    .required(true)
                    .value_parser(["readonly", "readwrite"])
                    .help("Cluster mode to set"),
            )
        }),
        false,
    )?;
    set.register_leaf(
        "api-key",
        ApiCommand::new("Set API key for communication with cluster nodes.", |args| {
            let key = required(args, KEY)?;
            Ok(vec![
                ApiRequest::put("cluster/apikey-set").with_body(json!({ "api_key": key }))
            ])
        })
        .with_arguments(|cmd| {
            cmd.arg(
                Arg::new(KEY)
                    .long(KEY)
                    .required(true)
                    .help("API key to set"),
            )
        }),
        false,
    )?;
    set.register_leaf(
        "log-level",
        ApiCommand::new("Set logging level on all cluster nodes.", |args| {
            let level = required(args, LEVEL)?;
            Ok(vec![
                ApiRequest::put("cluster/log-level").with_body(json!({ "level": level }))
            ])
        })
        .with_arguments(|cmd| {
            cmd.arg(
                Arg::new(LEVEL)
                    .long(LEVEL)
                    .required(true)
                    .value_parser(["CRITICAL", "ERROR", "WARNING", "INFO", "DEBUG", "TRACE"])
                    .ignore_case(true)
                    .help("Logging level to set"),
            )
        }),
        false,
    )?;
    Ok(set)
}

fn timeout_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new(TIMEOUT)
            .short('t')
            .long(TIMEOUT)
            .value_name("SECONDS")
            .value_parser(value_parser!(u64))
            .help("Time to wait for the cluster operation to finish"),
    )
}

fn node_arg(cmd: Command) -> Command {
    cmd.arg(
        Arg::new(NODE)
            .long(NODE)
            .value_name("HOST")
            .required(true)
            .action(ArgAction::Append)
            .help("Node IP address or hostname, may be repeated"),
    )
}

fn timeout_body(args: &ArgMatches) -> Value {
    match args.get_one::<u64>(TIMEOUT) {
        Some(seconds) => json!({ "timeout": seconds }),
        None => json!({}),
    }
}

fn start(args: &ArgMatches) -> ApiRequest {
    ApiRequest::put("cluster/start").with_body(timeout_body(args))
}

fn shutdown(args: &ArgMatches) -> ApiRequest {
    ApiRequest::put("cluster/shutdown").with_body(timeout_body(args))
}

fn node_requests(args: &ArgMatches, method: Method) -> CommandResult<Vec<ApiRequest>> {
    let nodes = string_values(args, NODE);
    if nodes.is_empty() {
        return Err(CommandError::InvalidArgs("at least one --node is required".into()));
    }
    Ok(nodes
        .into_iter()
        .map(|node| {
            ApiRequest::new(method, "cluster/node").with_body(json!({ "node": node }))
        })
        .collect())
}

fn required(args: &ArgMatches, id: &str) -> CommandResult<String> {
    args.get_one::<String>(id)
        .cloned()
        .ok_or_else(|| CommandError::InvalidArgs(format!("--{id} is required")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::context::CommandContext;
    use crate::logging::InvocationRecord;
    use crate::registry::CommandNode;
    use crate::util::testing::{RecordedCall, RecordingRunner};

    const BASE: &str = "https://127.0.0.1:8640/cmapi/0.4.0/";

    /// Invoke the leaf at `path` with `tokens` and return the transport calls.
    fn invoke(path: &[&str], tokens: &[&str]) -> Vec<RecordedCall> {
        let mut group = group().unwrap();
        let (last, groups) = path.split_last().unwrap();
        for name in groups {
            let Some(CommandNode::Group(child)) = group.lookup(name) else {
                panic!("{name} should be a group");
            };
            group = child;
        }
        let Some(CommandNode::Leaf(leaf)) = group.lookup(last) else {
            panic!("{last} should be a leaf");
        };
        let matches = leaf
            .arguments(Command::new(last.to_string()))
            .try_get_matches_from(std::iter::once(*last).chain(tokens.iter().copied()))
            .expect("parse");

        let runner = Arc::new(RecordingRunner::exiting_with(0));
        let ctx = CommandContext::with_deps(
            Settings::default(),
            Arc::clone(&runner) as _,
            InvocationRecord::new("mcs", vec![]),
        );
        leaf.invoke(&ctx, &matches).expect("invoke");
        runner.calls()
    }

    fn value_after<'a>(call: &'a RecordedCall, flag: &str) -> Option<&'a str> {
        call.args
            .iter()
            .position(|a| a == flag)
            .map(|i| call.args[i + 1].as_str())
    }

    fn url(call: &RecordedCall) -> &str {
        call.args.last().map(String::as_str).unwrap_or_default()
    }

    #[test]
    fn test_cluster_group_lists_lifecycle_commands() {
        let cluster = group().unwrap();
        assert_eq!(
            cluster.visible_names(),
            vec!["status", "stop", "start", "restart", "node", "set"]
        );
    }

    #[test]
    fn given_status_when_invoked_then_gets_cluster_status() {
        let calls = invoke(&["status"], &[]);
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, "curl");
        assert_eq!(value_after(&calls[0], "--request"), Some("GET"));
        assert_eq!(url(&calls[0]), format!("{BASE}cluster/status"));
    }

    #[test]
    fn given_restart_when_invoked_then_shutdown_then_start() {
        let calls = invoke(&["restart"], &["--timeout", "30"]);
        let urls: Vec<_> = calls.iter().map(url).collect();
        assert_eq!(
            urls,
            vec![
                format!("{BASE}cluster/shutdown"),
                format!("{BASE}cluster/start")
            ]
        );
        assert_eq!(value_after(&calls[0], "--data"), Some(r#"{"timeout":30}"#));
    }

    #[test]
    fn given_two_nodes_when_adding_then_one_request_per_node() {
        let calls = invoke(&["node", "add"], &["--node", "10.0.0.2", "--node", "10.0.0.3"]);
        assert_eq!(calls.len(), 2);
        assert!(calls
            .iter()
            .all(|c| value_after(c, "--request") == Some("PUT")));
        assert_eq!(value_after(&calls[1], "--data"), Some(r#"{"node":"10.0.0.3"}"#));
    }

    #[test]
    fn given_node_remove_when_invoked_then_delete_request() {
        let calls = invoke(&["node", "remove"], &["--node", "10.0.0.2"]);
        assert_eq!(value_after(&calls[0], "--request"), Some("DELETE"));
        assert_eq!(url(&calls[0]), format!("{BASE}cluster/node"));
    }

    #[test]
    fn given_set_mode_when_invoked_then_mode_in_body() {
        let calls = invoke(&["set", "mode"], &["--mode", "readonly"]);
        assert_eq!(url(&calls[0]), format!("{BASE}cluster/mode-set"));
        assert_eq!(value_after(&calls[0], "--data"), Some(r#"{"mode":"readonly"}"#));
    }
}
