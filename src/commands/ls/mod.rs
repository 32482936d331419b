// src/commands/ls/mod.rs
use crate::commands::{Action, ActionContext, ActionOutput, ShellError};
use crate::fs::{DirectoryTree, FsError, NodeId};

pub struct LsCommand;

fn format_entry(tree: &DirectoryTree, id: NodeId) -> Result<String, FsError> {
    let node = tree.node(id)?;
    Ok(format!("{}\t{}\n", node.kind(), node.name()))
}

impl Action for LsCommand {
    fn name(&self) -> &'static str {
        "ls"
    }

    fn execute(&self, ctx: ActionContext<'_>) -> Result<ActionOutput, ShellError> {
        let mut stdout = String::new();
        let mut targets: Vec<NodeId> = Vec::new();
        for arg in ctx.args {
            targets.push(ctx.tree.resolve_path(*ctx.cwd, arg)?);
        }
        if targets.is_empty() {
            targets.push(*ctx.cwd);
        }

        let show_headers = targets.len() > 1;
        for (i, &target) in targets.iter().enumerate() {
            if !ctx.tree.node(target)?.is_directory() {
                stdout.push_str(&format_entry(ctx.tree, target)?);
                continue;
            }
            if show_headers {
                if i > 0 {
                    stdout.push('\n');
                }
                stdout.push_str(&format!("{}:\n", ctx.tree.path_of(target)?));
            }
            for child in ctx.tree.entries(target)? {
                stdout.push_str(&format_entry(ctx.tree, child)?);
            }
        }

        Ok(ActionOutput::success(stdout))
    }
}
