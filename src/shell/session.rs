//! Shell Session
//!
//! Owns the directory tree, the command registry and the current directory,
//! and builds the default `home/bin` layout.

use std::sync::Arc;

use crate::commands::{builtin_actions, Action, CommandRegistry};
use crate::fs::{Clock, DirectoryTree, FsError, NodeId, TreeOptions};

pub const DEFAULT_PROMPT: &str = "Enter a command (or 'quit' to exit): ";

/// Options for creating a shell session.
#[derive(Debug, Clone)]
pub struct ShellOptions {
    /// Text printed before every input line
    pub prompt: String,
    /// Name of the root directory
    pub root_name: String,
    /// Permission string stored on every node the session creates
    pub permissions: String,
    /// Reject same-named siblings of the same kind
    pub unique_names: bool,
}

impl Default for ShellOptions {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            root_name: "home".to_string(),
            permissions: "rwx".to_string(),
            unique_names: true,
        }
    }
}

/// The tree, the registry and the current directory.
pub struct Session {
    pub tree: DirectoryTree,
    pub registry: CommandRegistry,
    pub cwd: NodeId,
    pub options: ShellOptions,
}

impl Session {
    /// A session holding only the root directory and an unbound registry.
    pub fn new(options: ShellOptions, clock: Box<dyn Clock>) -> Self {
        let tree = DirectoryTree::with_options(
            &options.root_name,
            "/",
            &options.permissions,
            clock,
            TreeOptions {
                unique_names: options.unique_names,
            },
        );
        let cwd = tree.root();
        Self {
            tree,
            registry: CommandRegistry::new(),
            cwd,
            options,
        }
    }

    /// A session with a `bin` directory holding one executable per built-in
    /// command, each bound in the registry.
    pub fn bootstrap(options: ShellOptions, clock: Box<dyn Clock>) -> Result<Self, FsError> {
        let mut session = Self::new(options, clock);
        let bin = session.create_directory(session.tree.root(), "bin")?;
        for builtin in builtin_actions() {
            session.install(bin, builtin.action, builtin.applies_broadly)?;
        }
        log::debug!(
            "bootstrapped '{}' with {} command(s)",
            session.options.root_name,
            session.registry.len()
        );
        Ok(session)
    }

    /// Create a directory named `name` under `parent`.
    pub fn create_directory(&mut self, parent: NodeId, name: &str) -> Result<NodeId, FsError> {
        let location = self.tree.path_of(parent)?;
        let dir = self.tree.create_directory(name, &location, &self.options.permissions);
        if let Err(e) = self.tree.add_sub_directory(parent, dir) {
            self.tree.release(dir)?;
            return Err(e);
        }
        Ok(dir)
    }

    /// Place an executable for `action` in `dir` and bind it under the
    /// action's name.
    pub fn install(
        &mut self,
        dir: NodeId,
        action: Arc<dyn Action>,
        applies_broadly: bool,
    ) -> Result<NodeId, FsError> {
        let name = action.name();
        let location = self.tree.path_of(dir)?;
        let exec = self.tree.create_exec_file(
            name,
            &location,
            &self.options.permissions,
            applies_broadly,
            action,
        );
        if let Err(e) = self.tree.add_exec_file(dir, exec) {
            self.tree.release(exec)?;
            return Err(e);
        }
        self.registry.bind(name, exec);
        Ok(exec)
    }

    pub fn cwd_path(&self) -> Result<String, FsError> {
        self.tree.path_of(self.cwd)
    }
}
