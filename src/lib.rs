//! dirshell - An in-memory directory tree with a command shell
//!
//! This library provides an arena-backed filesystem tree of directories,
//! text files and executable files, plus a command registry and dispatcher
//! that bind command names to executables living in the tree.

pub mod commands;
pub mod fs;
pub mod shell;

pub use commands::{Action, ActionContext, ActionOutput, CommandRegistry, ShellError};
pub use fs::{Clock, DirectoryTree, FsError, Node, NodeId, NodeKind, SystemClock};
pub use shell::{DispatchState, Dispatcher, Session, ShellOptions};
