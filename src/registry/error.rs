//! Registry composition errors

use thiserror::Error;

/// Errors raised while composing the command tree.
///
/// These are programming errors in how groups are wired together, caught
/// before any argument is parsed.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("command name already registered: {0}")]
    DuplicateName(String),

    #[error("invalid command name: '{0}'")]
    InvalidName(String),

    #[error("group cannot be mounted inside itself or a descendant: {0}")]
    Cycle(String),
}

pub type RegistryResult<T> = Result<T, RegistryError>;
