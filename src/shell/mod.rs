//! Shell Module
//!
//! Ties the directory tree and the command registry together: session
//! bootstrap, line input and the dispatcher state machine.

pub mod dispatcher;
pub mod input;
pub mod session;

pub use dispatcher::{DispatchState, Dispatcher};
pub use input::{tokenize, LineSource, ReaderLines, ScriptedLines};
pub use session::{Session, ShellOptions};
