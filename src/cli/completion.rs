//! Shell completion scripts for the documented command tree

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Command;
use clap_complete::{generate, Shell};
use directories::BaseDirs;
use tracing::{debug, instrument};

use super::error::{CliError, CliResult};
use super::output;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionAction {
    Show,
    Install,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub action: CompletionAction,
    /// Detected from `$SHELL` when absent
    pub shell: Option<Shell>,
}

/// Act on a completion request for `cmd`.
#[instrument(skip(cmd))]
pub fn handle(cmd: Command, request: &CompletionRequest) -> CliResult<()> {
    let shell = request
        .shell
        .or_else(Shell::from_env)
        .ok_or(CliError::UnknownShell)?;
    match request.action {
        CompletionAction::Show => {
            let script = script(cmd, shell);
            print!("{}", String::from_utf8_lossy(&script));
        }
        CompletionAction::Install => {
            let home = BaseDirs::new()
                .map(|dirs| dirs.home_dir().to_path_buf())
                .ok_or_else(|| CliError::Completion {
                    path: PathBuf::from("~"),
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "home directory not found",
                    ),
                })?;
            let path = install(cmd, shell, &home)?;
            output::success(&format!("{shell} completion installed in {}", path.display()));
            output::info("Completion will take effect once you restart the terminal");
        }
    }
    Ok(())
}

/// Render the completion script for `shell`.
pub fn script(mut cmd: Command, shell: Shell) -> Vec<u8> {
    let name = cmd.get_name().to_string();
    let mut buf = Vec::new();
    generate(shell, &mut cmd, name, &mut buf);
    buf
}

/// Write the script into the shell's per-user location below `home` and
/// hook it into the shell's rc file where the shell needs that.
pub fn install(cmd: Command, shell: Shell, home: &Path) -> CliResult<PathBuf> {
    let name = cmd.get_name().to_string();
    let (target, rc) = match shell {
        Shell::Bash => {
            let target = home.join(".bash_completions").join(format!("{name}.sh"));
            let line = format!("source {}", target.display());
            (target, Some((home.join(".bashrc"), vec![line])))
        }
        Shell::Zsh => {
            let target = home.join(".zfunc").join(format!("_{name}"));
            let lines = vec![
                "fpath+=~/.zfunc".to_string(),
                "autoload -Uz compinit".to_string(),
                "compinit".to_string(),
            ];
            (target, Some((home.join(".zshrc"), lines)))
        }
        Shell::Fish => {
            let target = home
                .join(".config/fish/completions")
                .join(format!("{name}.fish"));
            (target, None)
        }
        other => return Err(CliError::UnsupportedShell(other.to_string())),
    };

    let script = script(cmd, shell);
    write_file(&target, &script)?;
    if let Some((rc, lines)) = rc {
        append_missing_lines(&rc, &lines)?;
    }
    debug!(path = %target.display(), "completion installed");
    Ok(target)
}

fn write_file(path: &Path, content: &[u8]) -> CliResult<()> {
    let io_err = |source| CliError::Completion {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    fs::write(path, content).map_err(io_err)
}

/// Append each line not already present in `rc`.
fn append_missing_lines(rc: &Path, lines: &[String]) -> CliResult<()> {
    let io_err = |source| CliError::Completion {
        path: rc.to_path_buf(),
        source,
    };
    let existing = match fs::read_to_string(rc) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(io_err(e)),
    };
    let missing: Vec<&String> = lines
        .iter()
        .filter(|line| !existing.lines().any(|l| l.trim() == line.as_str()))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(rc)
        .map_err(io_err)?;
    let mut block = String::new();
    if !existing.is_empty() && !existing.ends_with('\n') {
        block.push('\n');
    }
    for line in missing {
        block.push_str(line);
        block.push('\n');
    }
    file.write_all(block.as_bytes()).map_err(io_err)
}
