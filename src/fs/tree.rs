//! In-Memory Directory Tree
//!
//! A generational arena owning every node. Directories refer to their
//! children and parents through `NodeId` handles, so a handle into a released
//! subtree fails with `StaleReference` instead of reaching freed state.

use std::sync::Arc;

use super::clock::Clock;
use super::types::*;
use crate::commands::Action;

/// Options for tree construction.
#[derive(Debug, Clone)]
pub struct TreeOptions {
    /// Reject a child whose name is already used in the same sequence.
    pub unique_names: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self { unique_names: true }
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena-backed directory tree.
pub struct DirectoryTree {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
    live: usize,
    clock: Box<dyn Clock>,
    options: TreeOptions,
}

impl DirectoryTree {
    /// Create a tree holding only a root directory.
    pub fn new(
        root_name: &str,
        location: &str,
        permissions: &str,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self::with_options(root_name, location, permissions, clock, TreeOptions::default())
    }

    pub fn with_options(
        root_name: &str,
        location: &str,
        permissions: &str,
        clock: Box<dyn Clock>,
        options: TreeOptions,
    ) -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId { index: 0, generation: 0 },
            live: 0,
            clock,
            options,
        };
        tree.root = tree.create_directory(root_name, location, permissions);
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes currently owned by the arena, attached or not.
    pub fn live_count(&self) -> usize {
        self.live
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.slots
            .get(id.index)
            .map_or(false, |slot| slot.generation == id.generation && slot.node.is_some())
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, FsError> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or_else(|| stale(id, "lookup"))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, FsError> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or_else(|| stale(id, "lookup"))
    }

    pub fn kind(&self, id: NodeId) -> Result<NodeKind, FsError> {
        Ok(self.node(id)?.kind())
    }

    /// Upward back-reference; `None` for the root and detached nodes.
    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, FsError> {
        Ok(self.node(id)?.parent)
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Create a detached directory.
    pub fn create_directory(&mut self, name: &str, location: &str, permissions: &str) -> NodeId {
        let attrs = FileAttrs::new(name, location, permissions, self.clock.now());
        self.allocate(Node::new(attrs, NodePayload::Directory(DirectoryData::default())))
    }

    /// Create a detached text file.
    pub fn create_text_file(&mut self, name: &str, location: &str, permissions: &str) -> NodeId {
        let attrs = FileAttrs::new(name, location, permissions, self.clock.now());
        self.allocate(Node::new(attrs, NodePayload::TextFile))
    }

    /// Create a detached executable file bound to `action`.
    pub fn create_exec_file(
        &mut self,
        name: &str,
        location: &str,
        permissions: &str,
        applies_broadly: bool,
        action: Arc<dyn Action>,
    ) -> NodeId {
        let attrs = FileAttrs::new(name, location, permissions, self.clock.now());
        let payload = NodePayload::ExecFile(ExecFileData { applies_broadly, action });
        self.allocate(Node::new(attrs, payload))
    }

    fn allocate(&mut self, node: Node) -> NodeId {
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                NodeId { index, generation: slot.generation }
            }
            None => {
                self.slots.push(Slot { generation: 0, node: Some(node) });
                NodeId { index: self.slots.len() - 1, generation: 0 }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Child sequences
    // ------------------------------------------------------------------------

    pub fn add_sub_directory(&mut self, parent: NodeId, child: NodeId) -> Result<(), FsError> {
        self.attach(parent, child, NodeKind::Directory, "add_sub_directory")
    }

    pub fn remove_sub_directory(&mut self, parent: NodeId, child: NodeId) -> Result<(), FsError> {
        self.detach(parent, child, NodeKind::Directory, "remove_sub_directory")
    }

    pub fn add_text_file(&mut self, parent: NodeId, child: NodeId) -> Result<(), FsError> {
        self.attach(parent, child, NodeKind::TextFile, "add_text_file")
    }

    pub fn remove_text_file(&mut self, parent: NodeId, child: NodeId) -> Result<(), FsError> {
        self.detach(parent, child, NodeKind::TextFile, "remove_text_file")
    }

    pub fn add_exec_file(&mut self, parent: NodeId, child: NodeId) -> Result<(), FsError> {
        self.attach(parent, child, NodeKind::ExecFile, "add_exec_file")
    }

    pub fn remove_exec_file(&mut self, parent: NodeId, child: NodeId) -> Result<(), FsError> {
        self.detach(parent, child, NodeKind::ExecFile, "remove_exec_file")
    }

    pub fn children(&self, dir: NodeId) -> Result<&[NodeId], FsError> {
        self.sequence(dir, NodeKind::Directory, "children")
    }

    pub fn text_files(&self, dir: NodeId) -> Result<&[NodeId], FsError> {
        self.sequence(dir, NodeKind::TextFile, "text_files")
    }

    pub fn exec_files(&self, dir: NodeId) -> Result<&[NodeId], FsError> {
        self.sequence(dir, NodeKind::ExecFile, "exec_files")
    }

    /// Every child of `dir`: sub-directories, then text files, then exec files.
    pub fn entries(&self, dir: NodeId) -> Result<Vec<NodeId>, FsError> {
        let data = self.directory(dir, "entries")?;
        Ok(data
            .sub_directories
            .iter()
            .chain(&data.text_files)
            .chain(&data.exec_files)
            .copied()
            .collect())
    }

    /// First child of `dir` named `name`, searching directories first.
    pub fn find_child(&self, dir: NodeId, name: &str) -> Result<Option<NodeId>, FsError> {
        Ok(self.find_children(dir, name)?.into_iter().next())
    }

    /// Every child of `dir` named `name`, one per sequence at most when names
    /// are unique.
    pub fn find_children(&self, dir: NodeId, name: &str) -> Result<Vec<NodeId>, FsError> {
        let mut found = Vec::new();
        for id in self.entries(dir)? {
            if self.node(id)?.name() == name {
                found.push(id);
            }
        }
        Ok(found)
    }

    fn sequence(&self, dir: NodeId, kind: NodeKind, operation: &str) -> Result<&[NodeId], FsError> {
        Ok(self.directory(dir, operation)?.sequence(kind))
    }

    fn directory(&self, dir: NodeId, operation: &str) -> Result<&DirectoryData, FsError> {
        let node = self.node(dir).map_err(|_| stale(dir, operation))?;
        node.as_directory().ok_or_else(|| FsError::KindMismatch {
            name: node.name().to_string(),
            expected: NodeKind::Directory,
            found: node.kind(),
            operation: operation.to_string(),
        })
    }

    fn attach(
        &mut self,
        parent: NodeId,
        child: NodeId,
        kind: NodeKind,
        operation: &str,
    ) -> Result<(), FsError> {
        let child_node = self.node(child).map_err(|_| stale(child, operation))?;
        let child_name = child_node.name().to_string();
        if child_node.kind() != kind {
            return Err(FsError::KindMismatch {
                name: child_name,
                expected: kind,
                found: child_node.kind(),
                operation: operation.to_string(),
            });
        }
        if child_node.parent.is_some() || child == self.root {
            return Err(FsError::AlreadyAttached {
                name: child_name,
                operation: operation.to_string(),
            });
        }

        let siblings = self.sequence(parent, kind, operation)?;
        if self.options.unique_names {
            for &sibling in siblings {
                if self.node(sibling)?.name() == child_name {
                    return Err(FsError::DuplicateName {
                        name: child_name,
                        operation: operation.to_string(),
                    });
                }
            }
        }

        if kind == NodeKind::Directory {
            let mut cursor = Some(parent);
            while let Some(id) = cursor {
                if id == child {
                    return Err(FsError::CycleDetected {
                        name: child_name,
                        operation: operation.to_string(),
                    });
                }
                cursor = self.node(id)?.parent;
            }
        }

        // Both effects below happen together; every check is done above.
        if let Some(data) = self.node_mut(parent)?.as_directory_mut() {
            data.sequence_mut(kind).push(child);
        }
        self.node_mut(child)?.parent = Some(parent);
        log::debug!("{}: attached '{}' ({}) under {}", operation, child_name, kind, parent);
        Ok(())
    }

    fn detach(
        &mut self,
        parent: NodeId,
        child: NodeId,
        kind: NodeKind,
        operation: &str,
    ) -> Result<(), FsError> {
        let child_name = self
            .node(child)
            .map_err(|_| stale(child, operation))?
            .name()
            .to_string();
        let position = self
            .sequence(parent, kind, operation)?
            .iter()
            .position(|&id| id == child)
            .ok_or_else(|| FsError::NotFound {
                name: child_name.clone(),
                operation: operation.to_string(),
            })?;

        if let Some(data) = self.node_mut(parent)?.as_directory_mut() {
            data.sequence_mut(kind).remove(position);
        }
        self.node_mut(child)?.parent = None;
        log::debug!("{}: detached '{}' from {}", operation, child_name, parent);
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Release
    // ------------------------------------------------------------------------

    /// Release `id` and its whole subtree, children first.
    ///
    /// An attached node is detached from its parent first. Returns
    /// the number of nodes released; every handle into the subtree is stale
    /// afterwards.
    pub fn release(&mut self, id: NodeId) -> Result<usize, FsError> {
        let node = self.node(id).map_err(|_| stale(id, "release"))?;
        if id == self.root {
            return Err(FsError::InvalidPath {
                path: "/".to_string(),
                operation: "release".to_string(),
            });
        }
        let parent = node.parent;
        let kind = node.kind();
        let order = self.walk(id)?;
        if let Some(parent) = parent {
            self.detach(parent, id, kind, "release")?;
        }
        let released = self.free_nodes(order);
        log::debug!("release: freed {} node(s) rooted at {}", released, id);
        Ok(released)
    }

    /// Free the nodes of a pre-order walk, children before their parent.
    fn free_nodes(&mut self, order: Vec<(NodeId, usize)>) -> usize {
        let mut released = 0;
        for (current, _) in order.into_iter().rev() {
            if let Some(slot) = self.slots.get_mut(current.index) {
                if slot.generation == current.generation && slot.node.take().is_some() {
                    slot.generation = slot.generation.wrapping_add(1);
                    self.free.push(current.index);
                    self.live -= 1;
                    released += 1;
                }
            }
        }
        released
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Number of nodes in the subtree rooted at `id`, including `id`.
    pub fn subtree_size(&self, id: NodeId) -> Result<usize, FsError> {
        Ok(self.walk(id)?.len())
    }

    /// Number of nodes below `id`.
    pub fn descendant_count(&self, id: NodeId) -> Result<usize, FsError> {
        Ok(self.subtree_size(id)? - 1)
    }

    /// Pre-order walk yielding `(node, depth)`, starting with `id` at depth 0.
    pub fn walk(&self, id: NodeId) -> Result<Vec<(NodeId, usize)>, FsError> {
        let mut out = Vec::new();
        let mut stack = vec![(id, 0)];
        while let Some((current, depth)) = stack.pop() {
            let node = self.node(current)?;
            out.push((current, depth));
            if node.is_directory() {
                let entries = self.entries(current)?;
                stack.extend(entries.into_iter().rev().map(|child| (child, depth + 1)));
            }
        }
        Ok(out)
    }

    /// Absolute path built from names along the back-references.
    pub fn path_of(&self, id: NodeId) -> Result<String, FsError> {
        let mut names = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            let node = self.node(current)?;
            names.push(node.name().to_string());
            cursor = node.parent;
        }
        names.reverse();
        Ok(format!("/{}", names.join("/")))
    }

    /// Resolve `path` against `cwd`.
    ///
    /// Absolute paths start at the root and must name it first (`/home/bin`);
    /// `/` alone is the root. `.` and empty segments are skipped and `..`
    /// stops at the top of the subtree.
    pub fn resolve_path(&self, cwd: NodeId, path: &str) -> Result<NodeId, FsError> {
        if path.is_empty() {
            return Err(invalid_path(path, "resolve"));
        }

        let mut segments = path.split('/').filter(|s| !s.is_empty() && *s != ".");
        let mut current = if path.starts_with('/') {
            let root_name = self.node(self.root)?.name();
            match segments.next() {
                None => return Ok(self.root),
                Some(first) if first == root_name => self.root,
                Some(_) => {
                    return Err(FsError::NotFound {
                        name: path.to_string(),
                        operation: "resolve".to_string(),
                    })
                }
            }
        } else {
            self.node(cwd).map_err(|_| stale(cwd, "resolve"))?;
            cwd
        };

        for segment in segments {
            if segment == ".." {
                current = self.node(current)?.parent.unwrap_or(current);
                continue;
            }
            let node = self.node(current)?;
            if !node.is_directory() {
                return Err(FsError::KindMismatch {
                    name: node.name().to_string(),
                    expected: NodeKind::Directory,
                    found: node.kind(),
                    operation: "resolve".to_string(),
                });
            }
            current = self
                .find_child(current, segment)?
                .ok_or_else(|| FsError::NotFound {
                    name: path.to_string(),
                    operation: "resolve".to_string(),
                })?;
        }
        Ok(current)
    }
}

fn stale(id: NodeId, operation: &str) -> FsError {
    FsError::StaleReference {
        id,
        operation: operation.to_string(),
    }
}

fn invalid_path(path: &str, operation: &str) -> FsError {
    FsError::InvalidPath {
        path: path.to_string(),
        operation: operation.to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
