//! File System Module
//!
//! Provides the in-memory directory tree for the shell.
//! - types: node model, handles and errors
//! - tree: the arena that owns every node
//! - clock: creation timestamp providers

pub mod clock;
pub mod tree;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use tree::{DirectoryTree, TreeOptions};
pub use types::*;
