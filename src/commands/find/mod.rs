// src/commands/find/mod.rs
use glob::Pattern;

use crate::commands::{Action, ActionContext, ActionOutput, ShellError};

/// `find PATTERN [PATH]`: print the path of every node under PATH whose
/// name matches the glob PATTERN.
pub struct FindCommand;

impl Action for FindCommand {
    fn name(&self) -> &'static str {
        "find"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn target_args<'a>(&self, args: &'a [String]) -> &'a [String] {
        args.get(1..).unwrap_or(&[])
    }

    fn execute(&self, ctx: ActionContext<'_>) -> Result<ActionOutput, ShellError> {
        let raw = ctx.args.first().ok_or_else(|| ShellError::MalformedInput {
            command: self.name().to_string(),
            expected: self.min_args(),
            got: 0,
        })?;
        let pattern = Pattern::new(raw).map_err(|e| ShellError::InvalidPattern {
            command: self.name().to_string(),
            pattern: raw.clone(),
            message: e.msg.to_string(),
        })?;

        let start = match ctx.args.get(1) {
            Some(path) => ctx.tree.resolve_path(*ctx.cwd, path)?,
            None => *ctx.cwd,
        };

        let mut stdout = String::new();
        for (id, _depth) in ctx.tree.walk(start)? {
            if pattern.matches(ctx.tree.node(id)?.name()) {
                stdout.push_str(&ctx.tree.path_of(id)?);
                stdout.push('\n');
            }
        }
        Ok(ActionOutput::success(stdout))
    }
}
