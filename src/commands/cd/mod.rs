// src/commands/cd/mod.rs
use crate::commands::{Action, ActionContext, ActionOutput, ShellError};
use crate::fs::{FsError, NodeKind};

pub struct CdCommand;

impl Action for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn execute(&self, ctx: ActionContext<'_>) -> Result<ActionOutput, ShellError> {
        let path = ctx.args.first().ok_or_else(|| ShellError::MalformedInput {
            command: self.name().to_string(),
            expected: self.min_args(),
            got: 0,
        })?;
        let target = ctx.tree.resolve_path(*ctx.cwd, path)?;
        let node = ctx.tree.node(target)?;
        if !node.is_directory() {
            return Err(FsError::KindMismatch {
                name: node.name().to_string(),
                expected: NodeKind::Directory,
                found: node.kind(),
                operation: "cd".to_string(),
            }
            .into());
        }
        *ctx.cwd = target;
        Ok(ActionOutput::default())
    }
}
