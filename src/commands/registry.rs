// src/commands/registry.rs
use std::sync::Arc;

use indexmap::IndexMap;

use super::cd::CdCommand;
use super::find::FindCommand;
use super::ls::LsCommand;
use super::mkdir::MkdirCommand;
use super::rm::RmCommand;
use super::types::Action;
use crate::fs::NodeId;

/// Command names every registry starts with.
pub const DEFAULT_COMMANDS: [&str; 5] = ["mkdir", "rm", "ls", "cd", "find"];

/// Maps command names to the executable file bound to them.
///
/// Entries are handles into the tree; the registry never owns a node.
#[derive(Debug, Clone)]
pub struct CommandRegistry {
    commands: IndexMap<String, Option<NodeId>>,
}

impl CommandRegistry {
    /// Registry with the default vocabulary, all unbound.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for name in DEFAULT_COMMANDS {
            registry.register(name);
        }
        registry
    }

    pub fn empty() -> Self {
        Self {
            commands: IndexMap::new(),
        }
    }

    /// Add `name` without a binding; an existing binding is kept.
    pub fn register(&mut self, name: &str) {
        self.commands.entry(name.to_string()).or_insert(None);
    }

    pub fn bind(&mut self, name: &str, exec: NodeId) {
        log::debug!("bind {} -> {}", name, exec);
        self.commands.insert(name.to_string(), Some(exec));
    }

    pub fn unbind(&mut self, name: &str) {
        if self.commands.shift_remove(name).is_some() {
            log::debug!("unbind {}", name);
        }
    }

    /// Bound executable for `name`; `None` when unknown or unbound.
    pub fn resolve(&self, name: &str) -> Option<NodeId> {
        self.commands.get(name).copied().flatten()
    }

    /// First command name bound to `exec`.
    pub fn binding_of(&self, exec: NodeId) -> Option<&str> {
        self.commands
            .iter()
            .find(|(_, bound)| **bound == Some(exec))
            .map(|(name, _)| name.as_str())
    }

    pub fn names(&self) -> Vec<&str> {
        self.commands.keys().map(|s| s.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// A built-in action and the target flag its executable carries.
pub struct Builtin {
    pub action: Arc<dyn Action>,
    pub applies_broadly: bool,
}

/// The built-in actions behind the default vocabulary.
pub fn builtin_actions() -> Vec<Builtin> {
    vec![
        Builtin { action: Arc::new(MkdirCommand), applies_broadly: false },
        Builtin { action: Arc::new(RmCommand), applies_broadly: true },
        Builtin { action: Arc::new(LsCommand), applies_broadly: false },
        Builtin { action: Arc::new(CdCommand), applies_broadly: false },
        Builtin { action: Arc::new(FindCommand), applies_broadly: false },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(index: usize) -> NodeId {
        NodeId { index, generation: 0 }
    }

    #[test]
    fn test_new_registry_is_unbound() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.names(), vec!["mkdir", "rm", "ls", "cd", "find"]);
        assert_eq!(registry.len(), 5);
        for name in DEFAULT_COMMANDS {
            assert!(registry.contains(name));
            assert_eq!(registry.resolve(name), None);
        }
    }

    #[test]
    fn test_bind_resolve_unbind() {
        let mut registry = CommandRegistry::new();
        registry.bind("ls", handle(3));
        assert_eq!(registry.resolve("ls"), Some(handle(3)));

        registry.bind("ls", handle(4));
        assert_eq!(registry.resolve("ls"), Some(handle(4)));

        registry.unbind("ls");
        assert_eq!(registry.resolve("ls"), None);
        assert!(!registry.contains("ls"));
    }

    #[test]
    fn test_binding_of() {
        let mut registry = CommandRegistry::new();
        registry.bind("rm", handle(2));
        registry.bind("del", handle(2));
        assert_eq!(registry.binding_of(handle(2)), Some("rm"));
        assert_eq!(registry.binding_of(handle(7)), None);

        registry.unbind("rm");
        assert_eq!(registry.binding_of(handle(2)), Some("del"));
    }

    #[test]
    fn test_unbind_absent_is_noop() {
        let mut registry = CommandRegistry::new();
        registry.unbind("frobnicate");
        assert_eq!(registry.len(), 5);
    }

    #[test]
    fn test_unknown_resolves_absent() {
        let registry = CommandRegistry::new();
        assert_eq!(registry.resolve("frobnicate"), None);
        assert!(!registry.contains("frobnicate"));
    }

    #[test]
    fn test_bind_new_name_appends() {
        let mut registry = CommandRegistry::new();
        registry.bind("pwd", handle(1));
        assert_eq!(registry.names().last(), Some(&"pwd"));
        registry.register("pwd");
        assert_eq!(registry.resolve("pwd"), Some(handle(1)));
    }

    #[test]
    fn test_builtins_cover_default_vocabulary() {
        let names: Vec<&str> = builtin_actions().iter().map(|b| b.action.name()).collect();
        assert_eq!(names, DEFAULT_COMMANDS.to_vec());
        let broad: Vec<bool> = builtin_actions().iter().map(|b| b.applies_broadly).collect();
        assert_eq!(broad, vec![false, true, false, false, false]);
    }
}
