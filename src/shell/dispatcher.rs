//! Command Dispatcher
//!
//! Resolves the first token of a line against the registry and runs the
//! bound action. The dispatcher moves between three states:
//!
//! - `Prompting`: waiting for a line
//! - `Dispatching`: resolving and running one line
//! - `Terminated`: `quit` was seen or input ended; further lines are ignored

use std::io::{self, Write};

use super::input::{tokenize, LineSource};
use super::session::Session;
use crate::commands::{ActionContext, ActionOutput, ShellError};
use crate::fs::{FsError, NodeKind};

/// Token that ends the session.
pub const QUIT: &str = "quit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Prompting,
    Dispatching,
    Terminated,
}

#[derive(Debug)]
pub struct Dispatcher {
    state: DispatchState,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            state: DispatchState::Prompting,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state == DispatchState::Terminated
    }

    /// Tokenize `line` and dispatch it.
    pub fn dispatch_line(
        &mut self,
        session: &mut Session,
        line: &str,
    ) -> Result<ActionOutput, ShellError> {
        self.dispatch(session, &tokenize(line))
    }

    /// Dispatch one tokenized line.
    ///
    /// On error nothing in the session has changed.
    pub fn dispatch(
        &mut self,
        session: &mut Session,
        tokens: &[String],
    ) -> Result<ActionOutput, ShellError> {
        if self.is_terminated() {
            return Ok(ActionOutput::default());
        }
        self.state = DispatchState::Dispatching;
        let result = self.dispatch_tokens(session, tokens);
        if self.state == DispatchState::Dispatching {
            self.state = DispatchState::Prompting;
        }
        result
    }

    fn dispatch_tokens(
        &mut self,
        session: &mut Session,
        tokens: &[String],
    ) -> Result<ActionOutput, ShellError> {
        let Some((name, args)) = tokens.split_first() else {
            return Ok(ActionOutput::default());
        };

        if name == QUIT {
            log::debug!("quit received, terminating");
            self.state = DispatchState::Terminated;
            return Ok(ActionOutput::default());
        }

        let exec_id = session
            .registry
            .resolve(name)
            .ok_or_else(|| ShellError::UnknownCommand { name: name.clone() })?;
        let node = session.tree.node(exec_id).map_err(|_| FsError::StaleReference {
            id: exec_id,
            operation: name.clone(),
        })?;
        let exec = node.as_exec().ok_or_else(|| FsError::KindMismatch {
            name: node.name().to_string(),
            expected: NodeKind::ExecFile,
            found: node.kind(),
            operation: name.clone(),
        })?;
        let action = exec.action.clone();
        let applies_broadly = exec.applies_broadly;

        if args.len() < action.min_args() {
            return Err(ShellError::MalformedInput {
                command: name.clone(),
                expected: action.min_args(),
                got: args.len(),
            });
        }

        if !applies_broadly {
            for target in action.target_args(args) {
                // Missing targets are left for the action to report.
                let Ok(id) = session.tree.resolve_path(session.cwd, target) else {
                    continue;
                };
                let kind = session.tree.kind(id)?;
                if kind != NodeKind::Directory {
                    return Err(ShellError::InvalidTarget {
                        command: name.clone(),
                        target: target.clone(),
                        kind,
                    });
                }
            }
        }

        log::debug!("dispatching {} with {} argument(s)", name, args.len());
        action.execute(ActionContext {
            args,
            cwd: &mut session.cwd,
            tree: &mut session.tree,
            registry: &session.registry,
        })
    }

    /// Prompt, read and dispatch until `quit` or the end of input.
    ///
    /// Action output and one-line diagnostics are written to `out`.
    pub fn run(
        &mut self,
        session: &mut Session,
        input: &mut dyn LineSource,
        out: &mut dyn Write,
    ) -> io::Result<()> {
        while !self.is_terminated() {
            write!(out, "{}", session.options.prompt)?;
            out.flush()?;

            let Some(line) = input.next_line() else {
                log::debug!("end of input, terminating");
                self.state = DispatchState::Terminated;
                break;
            };

            match self.dispatch_line(session, &line) {
                Ok(output) => write!(out, "{}", output.stdout)?,
                Err(e) => {
                    log::debug!("command failed: {:?}", e);
                    writeln!(out, "{}", e)?;
                }
            }
        }
        Ok(())
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{Action, DEFAULT_COMMANDS};
    use crate::fs::{Clock, FixedClock, NodeId};
    use crate::shell::input::{ReaderLines, ScriptedLines};
    use std::io::Cursor;
    use crate::shell::session::{ShellOptions, DEFAULT_PROMPT};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Stub that only counts invocations.
    struct Counting {
        name: &'static str,
        min_args: usize,
        calls: AtomicUsize,
    }

    impl Counting {
        fn new(name: &'static str, min_args: usize) -> Arc<Self> {
            Arc::new(Self {
                name,
                min_args,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl Action for Counting {
        fn name(&self) -> &'static str {
            self.name
        }

        fn min_args(&self) -> usize {
            self.min_args
        }

        fn execute(&self, _ctx: ActionContext<'_>) -> Result<ActionOutput, ShellError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ActionOutput::default())
        }
    }

    fn clock() -> Box<dyn Clock> {
        Box::new(FixedClock::new("2024-01-01 00:00:00"))
    }

    fn tokens(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    /// `home/bin` with five counting stubs bound under the default names.
    fn stub_session() -> (Session, Vec<Arc<Counting>>) {
        let mut session = Session::new(ShellOptions::default(), clock());
        let root = session.tree.root();
        let bin = session.create_directory(root, "bin").unwrap();
        let stubs: Vec<Arc<Counting>> = DEFAULT_COMMANDS
            .iter()
            .map(|&name| Counting::new(name, if name == "mkdir" { 1 } else { 0 }))
            .collect();
        for stub in &stubs {
            session.install(bin, stub.clone(), false).unwrap();
        }
        (session, stubs)
    }

    fn snapshot(session: &Session) -> (usize, Vec<String>, Vec<Option<NodeId>>) {
        let names: Vec<String> = session.registry.names().iter().map(|s| s.to_string()).collect();
        let bindings = names.iter().map(|n| session.registry.resolve(n)).collect();
        (session.tree.live_count(), names, bindings)
    }

    #[test]
    fn test_initial_state() {
        let dispatcher = Dispatcher::new();
        assert_eq!(dispatcher.state(), DispatchState::Prompting);
    }

    #[test]
    fn test_end_to_end_stub_invocations() {
        let (mut session, stubs) = stub_session();
        let before = snapshot(&session);
        let mut dispatcher = Dispatcher::new();

        dispatcher.dispatch(&mut session, &tokens(&["ls"])).unwrap();
        dispatcher.dispatch(&mut session, &tokens(&["mkdir", "x"])).unwrap();

        let calls: Vec<usize> = stubs.iter().map(|s| s.calls()).collect();
        // mkdir, rm, ls, cd, find
        assert_eq!(calls, vec![1, 0, 1, 0, 0]);
        assert_eq!(snapshot(&session), before);
        assert_eq!(dispatcher.state(), DispatchState::Prompting);
    }

    #[test]
    fn test_quit_terminates_without_action() {
        let (mut session, stubs) = stub_session();
        let mut dispatcher = Dispatcher::new();
        dispatcher.dispatch(&mut session, &tokens(&["quit"])).unwrap();
        assert_eq!(dispatcher.state(), DispatchState::Terminated);
        assert!(stubs.iter().all(|s| s.calls() == 0));

        // Lines after termination are ignored.
        dispatcher.dispatch(&mut session, &tokens(&["ls"])).unwrap();
        assert_eq!(stubs[2].calls(), 0);
        assert_eq!(dispatcher.state(), DispatchState::Terminated);
    }

    #[test]
    fn test_quit_with_unbound_registry() {
        let mut session = Session::new(ShellOptions::default(), clock());
        let mut dispatcher = Dispatcher::new();
        dispatcher.dispatch(&mut session, &tokens(&["quit", "now"])).unwrap();
        assert!(dispatcher.is_terminated());
    }

    #[test]
    fn test_unknown_command() {
        let (mut session, stubs) = stub_session();
        let before = snapshot(&session);
        let mut dispatcher = Dispatcher::new();

        let err = dispatcher.dispatch(&mut session, &tokens(&["frobnicate"])).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported command");
        assert!(matches!(err, ShellError::UnknownCommand { .. }));
        assert_eq!(snapshot(&session), before);
        assert!(stubs.iter().all(|s| s.calls() == 0));
        assert_eq!(dispatcher.state(), DispatchState::Prompting);
    }

    #[test]
    fn test_unbound_command_is_unsupported() {
        let mut session = Session::new(ShellOptions::default(), clock());
        let mut dispatcher = Dispatcher::new();
        let err = dispatcher.dispatch(&mut session, &tokens(&["ls"])).unwrap_err();
        assert_eq!(err.to_string(), "Unsupported command");
    }

    #[test]
    fn test_empty_line_is_ignored() {
        let (mut session, stubs) = stub_session();
        let mut dispatcher = Dispatcher::new();
        let output = dispatcher.dispatch_line(&mut session, "   ").unwrap();
        assert_eq!(output, ActionOutput::default());
        assert!(stubs.iter().all(|s| s.calls() == 0));
        assert_eq!(dispatcher.state(), DispatchState::Prompting);
    }

    #[test]
    fn test_malformed_input() {
        let (mut session, stubs) = stub_session();
        let mut dispatcher = Dispatcher::new();
        let err = dispatcher.dispatch(&mut session, &tokens(&["mkdir"])).unwrap_err();
        assert_eq!(
            err,
            ShellError::MalformedInput {
                command: "mkdir".to_string(),
                expected: 1,
                got: 0,
            }
        );
        assert_eq!(stubs[0].calls(), 0);
    }

    #[test]
    fn test_stale_binding() {
        let (mut session, stubs) = stub_session();
        let ls = session.registry.resolve("ls").unwrap();
        session.tree.release(ls).unwrap();

        let mut dispatcher = Dispatcher::new();
        let err = dispatcher.dispatch(&mut session, &tokens(&["ls"])).unwrap_err();
        assert!(matches!(err, ShellError::Fs(FsError::StaleReference { .. })));
        assert_eq!(stubs[2].calls(), 0);
        assert_eq!(dispatcher.state(), DispatchState::Prompting);
    }

    #[test]
    fn test_binding_to_non_exec() {
        let (mut session, _stubs) = stub_session();
        let root = session.tree.root();
        session.registry.bind("ls", root);
        let mut dispatcher = Dispatcher::new();
        let err = dispatcher.dispatch(&mut session, &tokens(&["ls"])).unwrap_err();
        assert!(matches!(err, ShellError::Fs(FsError::KindMismatch { .. })));
    }

    #[test]
    fn test_narrow_action_rejects_file_target() {
        let mut session = Session::bootstrap(ShellOptions::default(), clock()).unwrap();
        let mut dispatcher = Dispatcher::new();

        let err = dispatcher
            .dispatch(&mut session, &tokens(&["ls", "bin/rm"]))
            .unwrap_err();
        assert_eq!(
            err,
            ShellError::InvalidTarget {
                command: "ls".to_string(),
                target: "bin/rm".to_string(),
                kind: NodeKind::ExecFile,
            }
        );

        // find's pattern is not a target, only its start path is.
        let output = dispatcher
            .dispatch(&mut session, &tokens(&["find", "bin"]))
            .unwrap();
        assert_eq!(output.stdout, "/home/bin\n");
    }

    #[test]
    fn test_broad_action_accepts_file_target() {
        let mut session = Session::bootstrap(ShellOptions::default(), clock()).unwrap();
        let mut dispatcher = Dispatcher::new();
        let text = session.tree.create_text_file("notes", "/home", "rw-");
        let root = session.tree.root();
        session.tree.add_text_file(root, text).unwrap();

        dispatcher.dispatch(&mut session, &tokens(&["rm", "notes"])).unwrap();
        assert!(!session.tree.contains(text));
    }

    #[test]
    fn test_mkdir_and_rm_with_shared_name() {
        let mut session = Session::bootstrap(ShellOptions::default(), clock()).unwrap();
        let mut dispatcher = Dispatcher::new();
        let root = session.tree.root();
        let text = session.tree.create_text_file("notes", "/home", "rw-");
        session.tree.add_text_file(root, text).unwrap();

        dispatcher.dispatch_line(&mut session, "mkdir notes").unwrap();
        let listing = dispatcher.dispatch_line(&mut session, "ls").unwrap();
        assert_eq!(listing.stdout, "dir\tbin\ndir\tnotes\ntext\tnotes\n");

        dispatcher.dispatch_line(&mut session, "rm notes").unwrap();
        assert!(!session.tree.contains(text));
        let listing = dispatcher.dispatch_line(&mut session, "ls").unwrap();
        assert_eq!(listing.stdout, "dir\tbin\n");
    }

    #[test]
    fn test_rm_keeps_bound_commands() {
        let mut session = Session::bootstrap(ShellOptions::default(), clock()).unwrap();
        let mut dispatcher = Dispatcher::new();
        let before = snapshot(&session);

        for line in ["rm bin", "rm bin/ls"] {
            let err = dispatcher.dispatch_line(&mut session, line).unwrap_err();
            assert!(matches!(err, ShellError::CommandInUse { .. }), "{line}");
        }
        assert_eq!(snapshot(&session), before);
        let listing = dispatcher.dispatch_line(&mut session, "ls").unwrap();
        assert_eq!(listing.stdout, "dir\tbin\n");
    }

    #[test]
    fn test_builtin_session_commands() {
        let mut session = Session::bootstrap(ShellOptions::default(), clock()).unwrap();
        let mut dispatcher = Dispatcher::new();

        dispatcher.dispatch_line(&mut session, "mkdir docs").unwrap();
        dispatcher.dispatch_line(&mut session, "cd docs").unwrap();
        assert_eq!(session.cwd_path().unwrap(), "/home/docs");
        dispatcher.dispatch_line(&mut session, "mkdir a b").unwrap();

        let listing = dispatcher.dispatch_line(&mut session, "ls").unwrap();
        assert_eq!(listing.stdout, "dir\ta\ndir\tb\n");

        dispatcher.dispatch_line(&mut session, "cd ..").unwrap();
        let found = dispatcher.dispatch_line(&mut session, "find ?").unwrap();
        assert_eq!(found.stdout, "/home/docs/a\n/home/docs/b\n");

        dispatcher.dispatch_line(&mut session, "rm docs").unwrap();
        let listing = dispatcher.dispatch_line(&mut session, "ls").unwrap();
        assert_eq!(listing.stdout, "dir\tbin\n");
    }

    #[test]
    fn test_run_until_quit() {
        let (mut session, stubs) = stub_session();
        let mut dispatcher = Dispatcher::new();
        let mut input = ScriptedLines::new(["ls", "frobnicate", "quit", "ls"]);
        let mut out: Vec<u8> = Vec::new();

        dispatcher.run(&mut session, &mut input, &mut out).unwrap();

        assert!(dispatcher.is_terminated());
        assert_eq!(stubs[2].calls(), 1);
        assert_eq!(input.remaining(), 1);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            format!("{p}{p}Unsupported command\n{p}", p = DEFAULT_PROMPT)
        );
    }

    #[test]
    fn test_run_continues_past_invalid_utf8() {
        let mut session = Session::bootstrap(ShellOptions::default(), clock()).unwrap();
        let mut dispatcher = Dispatcher::new();
        let bytes: &[u8] = b"\xff\xfe\nmkdir x\nquit\nmkdir y\n";
        let mut input = ReaderLines::new(Cursor::new(bytes));
        let mut out: Vec<u8> = Vec::new();

        dispatcher.run(&mut session, &mut input, &mut out).unwrap();

        assert!(dispatcher.is_terminated());
        let root = session.tree.root();
        assert!(session.tree.find_child(root, "x").unwrap().is_some());
        assert!(session.tree.find_child(root, "y").unwrap().is_none());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Unsupported command\n"));
    }

    #[test]
    fn test_run_stops_at_end_of_input() {
        let mut session = Session::bootstrap(ShellOptions::default(), clock()).unwrap();
        let mut dispatcher = Dispatcher::new();
        let mut input = ScriptedLines::new(["mkdir x", "ls", "cd"]);
        let mut out: Vec<u8> = Vec::new();

        dispatcher.run(&mut session, &mut input, &mut out).unwrap();

        assert!(dispatcher.is_terminated());
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("dir\tbin\ndir\tx\n"));
        assert!(text.contains("cd: missing operand (expected at least 1, got 0)\n"));
    }
}
