//! File System Types
//!
//! Core types for the in-memory directory tree: node handles, the closed set
//! of node variants and the errors tree operations report.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::commands::Action;

/// File system errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FsError {
    #[error("ENOENT: no such file or directory, {operation} '{name}'")]
    NotFound { name: String, operation: String },

    #[error("EEXIST: file already exists, {operation} '{name}'")]
    DuplicateName { name: String, operation: String },

    #[error("ESTALE: stale node reference {id}, {operation}")]
    StaleReference { id: NodeId, operation: String },

    #[error("EINVAL: expected {expected}, found {found}, {operation} '{name}'")]
    KindMismatch {
        name: String,
        expected: NodeKind,
        found: NodeKind,
        operation: String,
    },

    #[error("EBUSY: node already attached, {operation} '{name}'")]
    AlreadyAttached { name: String, operation: String },

    #[error("ELOOP: directory cannot contain itself, {operation} '{name}'")]
    CycleDetected { name: String, operation: String },

    #[error("EINVAL: invalid path, {operation} '{path}'")]
    InvalidPath { path: String, operation: String },
}

/// Handle to a node in the tree arena.
///
/// The generation is bumped every time a slot is released, so a handle into a
/// released subtree never aliases a node created later in the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    pub(crate) index: usize,
    pub(crate) generation: u32,
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

/// Node variant discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    TextFile,
    ExecFile,
    Directory,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::TextFile => "text",
            NodeKind::ExecFile => "exec",
            NodeKind::Directory => "dir",
        };
        f.write_str(s)
    }
}

/// Attributes shared by every node kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttrs {
    pub name: String,
    pub location: String,
    pub permissions: String,
    pub created_at: String,
}

impl FileAttrs {
    pub fn new(
        name: impl Into<String>,
        location: impl Into<String>,
        permissions: impl Into<String>,
        created_at: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            permissions: permissions.into(),
            created_at: created_at.into(),
        }
    }
}

/// Child sequences owned by a directory
#[derive(Debug, Clone, Default)]
pub struct DirectoryData {
    pub(crate) sub_directories: Vec<NodeId>,
    pub(crate) text_files: Vec<NodeId>,
    pub(crate) exec_files: Vec<NodeId>,
}

impl DirectoryData {
    pub(crate) fn sequence_mut(&mut self, kind: NodeKind) -> &mut Vec<NodeId> {
        match kind {
            NodeKind::Directory => &mut self.sub_directories,
            NodeKind::TextFile => &mut self.text_files,
            NodeKind::ExecFile => &mut self.exec_files,
        }
    }

    pub(crate) fn sequence(&self, kind: NodeKind) -> &[NodeId] {
        match kind {
            NodeKind::Directory => &self.sub_directories,
            NodeKind::TextFile => &self.text_files,
            NodeKind::ExecFile => &self.exec_files,
        }
    }
}

/// Executable payload: a bound action plus its target flag
#[derive(Clone)]
pub struct ExecFileData {
    /// When false, the action only accepts directories as existing targets.
    pub applies_broadly: bool,
    pub action: Arc<dyn Action>,
}

impl fmt::Debug for ExecFileData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecFileData")
            .field("applies_broadly", &self.applies_broadly)
            .field("action", &self.action.name())
            .finish()
    }
}

/// Variant-specific node payload
#[derive(Debug, Clone)]
pub enum NodePayload {
    Directory(DirectoryData),
    TextFile,
    ExecFile(ExecFileData),
}

/// A node stored in the tree arena
#[derive(Debug, Clone)]
pub struct Node {
    attrs: FileAttrs,
    pub(crate) parent: Option<NodeId>,
    pub(crate) payload: NodePayload,
}

impl Node {
    pub(crate) fn new(attrs: FileAttrs, payload: NodePayload) -> Self {
        Self {
            attrs,
            parent: None,
            payload,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self.payload {
            NodePayload::Directory(_) => NodeKind::Directory,
            NodePayload::TextFile => NodeKind::TextFile,
            NodePayload::ExecFile(_) => NodeKind::ExecFile,
        }
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.payload, NodePayload::Directory(_))
    }

    pub fn name(&self) -> &str {
        &self.attrs.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.attrs.name = name.into();
    }

    pub fn location(&self) -> &str {
        &self.attrs.location
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.attrs.location = location.into();
    }

    pub fn permissions(&self) -> &str {
        &self.attrs.permissions
    }

    pub fn set_permissions(&mut self, permissions: impl Into<String>) {
        self.attrs.permissions = permissions.into();
    }

    pub fn created_at(&self) -> &str {
        &self.attrs.created_at
    }

    pub fn set_created_at(&mut self, created_at: impl Into<String>) {
        self.attrs.created_at = created_at.into();
    }

    pub fn as_directory(&self) -> Option<&DirectoryData> {
        match &self.payload {
            NodePayload::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    pub(crate) fn as_directory_mut(&mut self) -> Option<&mut DirectoryData> {
        match &mut self.payload {
            NodePayload::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    pub fn as_exec(&self) -> Option<&ExecFileData> {
        match &self.payload {
            NodePayload::ExecFile(exec) => Some(exec),
            _ => None,
        }
    }

    pub fn as_exec_mut(&mut self) -> Option<&mut ExecFileData> {
        match &mut self.payload {
            NodePayload::ExecFile(exec) => Some(exec),
            _ => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
