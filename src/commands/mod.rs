// src/commands/mod.rs
pub mod cd;
pub mod find;
pub mod ls;
pub mod mkdir;
pub mod registry;
pub mod rm;
pub mod types;
pub mod utils;

pub use registry::{builtin_actions, Builtin, CommandRegistry, DEFAULT_COMMANDS};
pub use types::{Action, ActionContext, ActionOutput, ShellError};
