// src/commands/mkdir/mod.rs
use crate::commands::utils::split_parent;
use crate::commands::{Action, ActionContext, ActionOutput, ShellError};
use crate::fs::NodeId;

pub struct MkdirCommand;

impl Action for MkdirCommand {
    fn name(&self) -> &'static str {
        "mkdir"
    }

    fn min_args(&self) -> usize {
        1
    }

    /// Operands name directories to create, not existing nodes.
    fn target_args<'a>(&self, _args: &'a [String]) -> &'a [String] {
        &[]
    }

    fn execute(&self, ctx: ActionContext<'_>) -> Result<ActionOutput, ShellError> {
        let mut created: Vec<NodeId> = Vec::new();

        for arg in ctx.args {
            let attempt = split_parent(ctx.tree, *ctx.cwd, arg).and_then(|(parent, leaf)| {
                let location = ctx.tree.path_of(parent)?;
                let permissions = ctx.tree.node(parent)?.permissions().to_string();
                let dir = ctx.tree.create_directory(leaf, &location, &permissions);
                match ctx.tree.add_sub_directory(parent, dir) {
                    Ok(()) => Ok(dir),
                    Err(e) => {
                        ctx.tree.release(dir)?;
                        Err(e)
                    }
                }
            });

            match attempt {
                Ok(dir) => created.push(dir),
                Err(e) => {
                    // Leave the tree as it was before the command.
                    for dir in created.into_iter().rev() {
                        ctx.tree.release(dir)?;
                    }
                    return Err(e.into());
                }
            }
        }

        Ok(ActionOutput::default())
    }
}
