//! Commands about the management API server itself

use std::sync::Arc;

use super::api::{ApiCommand, ApiRequest};
use crate::registry::{Group, RegistryResult};

/// Build the `cmapi` command group.
pub fn group() -> RegistryResult<Arc<Group>> {
    let cmapi = Arc::new(Group::new("CMAPI itself related commands."));
    cmapi.register_leaf(
        "is-ready",
        ApiCommand::new("Check CMAPI is ready to handle requests.", |_| {
            Ok(vec![ApiRequest::get("ready").unversioned()])
        }),
        false,
    )?;
    Ok(cmapi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::CommandNode;

    #[test]
    fn test_is_ready_registered() {
        let cmapi = group().unwrap();
        assert!(matches!(cmapi.lookup("is-ready"), Some(CommandNode::Leaf(_))));
        assert_eq!(cmapi.visible_names(), vec!["is-ready"]);
    }
}
