//! Composition of the `mcs` command tree

use std::sync::Arc;

use super::dispatcher::Dispatcher;
use crate::commands::{backup, cluster, cmapi, help_all::HelpAll, restore};
use crate::registry::{mount_legacy_aliases, Group, RegistryResult, LEGACY_CLUSTER_ALIASES};

pub const PROGRAM_NAME: &str = "mcs";

pub const ABOUT: &str =
    "The  MCS  Command  Line  Interface is a unified tool to manage your MCS services";

/// Build the root namespace.
///
/// The cluster group is merged into the root, so `mcs start` works, and is
/// also reachable through the hidden legacy aliases.
pub fn registry() -> RegistryResult<Arc<Group>> {
    let root = Arc::new(Group::new(ABOUT));

    let cluster = cluster::group()?;
    root.merge(Arc::clone(&cluster))?;
    mount_legacy_aliases(&root, &cluster, LEGACY_CLUSTER_ALIASES)?;

    root.register("cmapi", cmapi::group()?, false)?;
    root.register_leaf("backup", backup::backup(), false)?;
    root.register_leaf("dbrm_backup", backup::dbrm_backup(), false)?;
    root.register_leaf("restore", restore::restore(), false)?;
    root.register_leaf("dbrm_restore", restore::dbrm_restore(), false)?;
    root.register_leaf("help-all", HelpAll, false)?;

    Ok(root)
}

pub fn dispatcher() -> RegistryResult<Dispatcher> {
    Ok(Dispatcher::new(PROGRAM_NAME, registry()?))
}
