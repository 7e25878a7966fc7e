//! Management API requests
//!
//! A command describes the requests it needs as `ApiRequest` values; the
//! configured transport program performs them. No HTTP happens in-process.

use std::fmt;

use clap::{ArgMatches, Command};
use serde_json::Value;
use tracing::debug;

use super::{run_delegate, run_delegate_with_input, CommandResult};
use crate::config::CmapiSettings;
use crate::context::CommandContext;
use crate::registry::Leaf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(name)
    }
}

/// A transport invocation: argv plus secret material for stdin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportCall {
    pub args: Vec<String>,
    /// curl config lines read via `--config -`
    pub stdin: Option<String>,
}

/// One management API call.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub endpoint: String,
    /// Prefix the endpoint with the API version
    pub versioned: bool,
    pub body: Option<Value>,
}

impl ApiRequest {
    pub fn new(method: Method, endpoint: impl Into<String>) -> Self {
        Self {
            method,
            endpoint: endpoint.into(),
            versioned: true,
            body: None,
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Get, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(Method::Put, endpoint)
    }

    pub fn unversioned(mut self) -> Self {
        self.versioned = false;
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn url(&self, cmapi: &CmapiSettings) -> String {
        if self.versioned {
            format!(
                "{}/{}/{}",
                cmapi.base_url(),
                cmapi.api_version,
                self.endpoint
            )
        } else {
            format!("{}/{}", cmapi.base_url(), self.endpoint)
        }
    }

    /// Invocation of a curl-compatible transport.
    ///
    /// The API key and the body never go on the command line, where any
    /// local user can read them; they are passed as curl config on stdin.
    pub fn transport_call(&self, cmapi: &CmapiSettings) -> CommandResult<TransportCall> {
        let mut args: Vec<String> = vec![
            "--silent".into(),
            "--show-error".into(),
            "--fail".into(),
            // CMAPI listens with a self-signed certificate
            "--insecure".into(),
            "--request".into(),
            self.method.to_string(),
            "--header".into(),
            "Content-Type: application/json".into(),
        ];
        let mut config = String::new();
        if let Some(key) = &cmapi.api_key {
            config.push_str(&config_line("header", &format!("x-api-key: {key}")));
        }
        if let Some(body) = &self.body {
            config.push_str(&config_line("data", &serde_json::to_string(body)?));
        }
        let stdin = if config.is_empty() {
            None
        } else {
            args.push("--config".into());
            args.push("-".into());
            Some(config)
        };
        args.push(self.url(cmapi));
        Ok(TransportCall { args, stdin })
    }
}

/// One `name = "value"` line of a curl config file.
fn config_line(name: &str, value: &str) -> String {
    let mut line = format!("{name} = \"");
    for c in value.chars() {
        match c {
            '\\' => line.push_str("\\\\"),
            '"' => line.push_str("\\\""),
            '\n' => line.push_str("\\n"),
            '\r' => line.push_str("\\r"),
            '\t' => line.push_str("\\t"),
            c => line.push(c),
        }
    }
    line.push_str("\"\n");
    line
}

/// Perform `request` through the configured transport.
pub fn send(ctx: &CommandContext, request: &ApiRequest) -> CommandResult<()> {
    let cmapi = &ctx.settings.cmapi;
    debug!(method = %request.method, endpoint = %request.endpoint, "api request");
    let call = request.transport_call(cmapi)?;
    match &call.stdin {
        Some(input) => run_delegate_with_input(ctx, &cmapi.transport, &call.args, input),
        None => run_delegate(ctx, &cmapi.transport, &call.args),
    }
}

type ArgumentsFn = fn(Command) -> Command;
type RequestsFn = fn(&ArgMatches) -> CommandResult<Vec<ApiRequest>>;

/// Leaf that turns its arguments into API requests and sends them in order,
/// stopping at the first failure.
pub struct ApiCommand {
    help: &'static str,
    arguments: ArgumentsFn,
    requests: RequestsFn,
}

impl ApiCommand {
    pub fn new(help: &'static str, requests: RequestsFn) -> Self {
        Self {
            help,
            arguments: |cmd| cmd,
            requests,
        }
    }

    pub fn with_arguments(mut self, arguments: ArgumentsFn) -> Self {
        self.arguments = arguments;
        self
    }

    pub fn requests(&self, args: &ArgMatches) -> CommandResult<Vec<ApiRequest>> {
        (self.requests)(args)
    }
}

impl Leaf for ApiCommand {
    fn help(&self) -> &str {
        self.help
    }

    fn arguments(&self, cmd: Command) -> Command {
        (self.arguments)(cmd)
    }

    fn invoke(&self, ctx: &CommandContext, args: &ArgMatches) -> CommandResult<()> {
        for request in self.requests(args)? {
            send(ctx, &request)?;
        }
        Ok(())
    }
}
