//! Legacy names for renamed command groups
//!
//! Every legacy mount goes through `mount_legacy_aliases`, so dropping an
//! alias means editing the table below and nothing else.

use std::sync::Arc;

use super::{Group, RegistryResult};

// TODO: remove `cluster` once automation calling `mcs cluster <cmd>` has moved
// to the top-level commands.
/// Hidden names under which the cluster group stays reachable.
pub const LEGACY_CLUSTER_ALIASES: &[&str] = &["cluster"];

/// Mount `group` in `parent` under each legacy name, hidden from listings.
pub fn mount_legacy_aliases(
    parent: &Group,
    group: &Arc<Group>,
    aliases: &[&str],
) -> RegistryResult<()> {
    for alias in aliases {
        parent.register(alias, Arc::clone(group), true)?;
    }
    Ok(())
}
