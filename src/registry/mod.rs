//! Command registry: a tree of named groups and leaves
//!
//! Nodes are shared, never copied. Mounting the same `Arc<Group>` under two
//! names gives two entry points into one command table; a child registered
//! later is visible through both.
//!
//! A merged group remembers the groups it was merged into, so a name
//! registered on it later is checked against every namespace it shows up in.

pub mod alias;
pub mod error;

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, Weak};

use clap::{ArgMatches, Command};

use crate::commands::CommandResult;
use crate::context::CommandContext;

pub use alias::{mount_legacy_aliases, LEGACY_CLUSTER_ALIASES};
pub use error::{RegistryError, RegistryResult};

/// A directly invocable command.
///
/// Implementations declare their own arguments; the dispatcher binds the
/// remaining tokens against them and hands over the matches.
pub trait Leaf: Send + Sync {
    /// One-line help shown in listings.
    fn help(&self) -> &str;

    /// Declare arguments on the leaf's clap command.
    fn arguments(&self, cmd: Command) -> Command {
        cmd
    }

    /// Whether `--help` is injected for this leaf.
    fn help_flag(&self) -> bool {
        true
    }

    fn invoke(&self, ctx: &CommandContext, args: &ArgMatches) -> CommandResult<()>;
}

/// Handler signature for closure-backed leaves.
pub type LeafFn = dyn Fn(&CommandContext, &ArgMatches) -> CommandResult<()> + Send + Sync;

/// Leaf built from a help string and a closure.
pub struct FnLeaf {
    help: String,
    handler: Box<LeafFn>,
}

impl FnLeaf {
    pub fn new<F>(help: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&CommandContext, &ArgMatches) -> CommandResult<()> + Send + Sync + 'static,
    {
        Self {
            help: help.into(),
            handler: Box::new(handler),
        }
    }
}

impl Leaf for FnLeaf {
    fn help(&self) -> &str {
        &self.help
    }

    fn invoke(&self, ctx: &CommandContext, args: &ArgMatches) -> CommandResult<()> {
        (self.handler)(ctx, args)
    }
}

/// Either a namespace or an invocable command.
#[derive(Clone)]
pub enum CommandNode {
    Group(Arc<Group>),
    Leaf(Arc<dyn Leaf>),
}

impl CommandNode {
    pub fn leaf(leaf: impl Leaf + 'static) -> Self {
        Self::Leaf(Arc::new(leaf))
    }

    pub fn help(&self) -> &str {
        match self {
            Self::Group(group) => group.help(),
            Self::Leaf(leaf) => leaf.help(),
        }
    }

    /// Whether both nodes are the same shared value.
    pub fn same_as(&self, other: &CommandNode) -> bool {
        match (self, other) {
            (Self::Group(a), Self::Group(b)) => Arc::ptr_eq(a, b),
            (Self::Leaf(a), Self::Leaf(b)) => {
                std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
            }
            _ => false,
        }
    }
}

impl fmt::Debug for CommandNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(group) => f.debug_tuple("Group").field(&group.help()).finish(),
            Self::Leaf(leaf) => f.debug_tuple("Leaf").field(&leaf.help()).finish(),
        }
    }
}

impl From<Arc<Group>> for CommandNode {
    fn from(group: Arc<Group>) -> Self {
        Self::Group(group)
    }
}

impl From<Arc<dyn Leaf>> for CommandNode {
    fn from(leaf: Arc<dyn Leaf>) -> Self {
        Self::Leaf(leaf)
    }
}

/// A node mounted at a name.
#[derive(Debug, Clone)]
pub struct Mount {
    pub name: String,
    /// Invocable but left out of help and completion output
    pub hidden: bool,
    pub node: CommandNode,
}

#[derive(Debug, Clone)]
enum Entry {
    Named(Mount),
    /// Children of another group, mounted directly in this namespace
    Merged(Arc<Group>),
}

/// A named namespace of commands.
#[derive(Debug)]
pub struct Group {
    help: String,
    entries: RwLock<Vec<Entry>>,
    /// Groups this one was merged into
    merged_into: RwLock<Vec<Weak<Group>>>,
}

impl Group {
    pub fn new(help: impl Into<String>) -> Self {
        Self {
            help: help.into(),
            entries: RwLock::new(Vec::new()),
            merged_into: RwLock::new(Vec::new()),
        }
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    /// Mount `node` at `name` in this namespace.
    pub fn register(
        &self,
        name: &str,
        node: impl Into<CommandNode>,
        hidden: bool,
    ) -> RegistryResult<()> {
        let node = node.into();
        if name.is_empty() || name.starts_with('-') || name.contains(char::is_whitespace) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        if let CommandNode::Group(group) = &node {
            if self.is_within(group) {
                return Err(RegistryError::Cycle(name.to_string()));
            }
        }
        if self.name_taken(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }

        self.write_entries().push(Entry::Named(Mount {
            name: name.to_string(),
            hidden,
            node,
        }));
        Ok(())
    }

    /// Register a leaf value at `name`.
    pub fn register_leaf(
        &self,
        name: &str,
        leaf: impl Leaf + 'static,
        hidden: bool,
    ) -> RegistryResult<()> {
        self.register(name, CommandNode::leaf(leaf), hidden)
    }

    /// Mount the children of `group` directly in this namespace.
    ///
    /// Names registered on `group` afterwards must stay unique here too.
    pub fn merge(self: &Arc<Self>, group: Arc<Group>) -> RegistryResult<()> {
        if self.is_within(&group) {
            return Err(RegistryError::Cycle(group.help.clone()));
        }
        for mount in group.mounts() {
            if self.name_taken(&mount.name) {
                return Err(RegistryError::DuplicateName(mount.name));
            }
        }
        group
            .merged_into
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::downgrade(self));
        self.write_entries().push(Entry::Merged(group));
        Ok(())
    }

    /// Find the node mounted at `name`, hidden or not.
    pub fn lookup(&self, name: &str) -> Option<CommandNode> {
        self.read_entries().iter().find_map(|entry| match entry {
            Entry::Named(mount) if mount.name == name => Some(mount.node.clone()),
            Entry::Named(_) => None,
            Entry::Merged(group) => group.lookup(name),
        })
    }

    /// All mounts of this namespace in registration order, merged groups
    /// flattened in place.
    pub fn mounts(&self) -> Vec<Mount> {
        let mut mounts = Vec::new();
        for entry in self.read_entries().iter() {
            match entry {
                Entry::Named(mount) => mounts.push(mount.clone()),
                Entry::Merged(group) => mounts.extend(group.mounts()),
            }
        }
        mounts
    }

    /// Names that appear in help listings.
    pub fn visible_names(&self) -> Vec<String> {
        self.mounts()
            .into_iter()
            .filter(|mount| !mount.hidden)
            .map(|mount| mount.name)
            .collect()
    }

    /// Whether `name` is already used in this namespace or in any namespace
    /// this group was merged into.
    fn name_taken(&self, name: &str) -> bool {
        if self.lookup(name).is_some() {
            return true;
        }
        let parents: Vec<Arc<Group>> = self
            .merged_into
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        parents.iter().any(|parent| parent.name_taken(name))
    }

    /// Whether this group is `group` itself or one of its descendants.
    fn is_within(&self, group: &Group) -> bool {
        std::ptr::eq(group, self) || group.reaches(self)
    }

    fn reaches(&self, target: &Group) -> bool {
        self.read_entries().iter().any(|entry| {
            let child = match entry {
                Entry::Named(Mount {
                    node: CommandNode::Group(group),
                    ..
                }) => group,
                Entry::Named(_) => return false,
                Entry::Merged(group) => group,
            };
            std::ptr::eq(Arc::as_ptr(child), target) || child.reaches(target)
        })
    }

    fn read_entries(&self) -> std::sync::RwLockReadGuard<'_, Vec<Entry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entries(&self) -> std::sync::RwLockWriteGuard<'_, Vec<Entry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }
}
