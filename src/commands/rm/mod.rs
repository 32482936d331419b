// src/commands/rm/mod.rs
use crate::commands::{Action, ActionContext, ActionOutput, ShellError};
use crate::fs::{DirectoryTree, FsError, NodeId};

pub struct RmCommand;

impl Action for RmCommand {
    fn name(&self) -> &'static str {
        "rm"
    }

    fn min_args(&self) -> usize {
        1
    }

    fn execute(&self, ctx: ActionContext<'_>) -> Result<ActionOutput, ShellError> {
        let root = ctx.tree.root();

        // Resolve every operand before releasing anything.
        let mut targets: Vec<NodeId> = Vec::new();
        for arg in ctx.args {
            let id = ctx.tree.resolve_path(*ctx.cwd, arg)?;
            if id == root {
                return Err(FsError::InvalidPath {
                    path: arg.clone(),
                    operation: "rm".to_string(),
                }
                .into());
            }
            // A name shared by a directory and a file removes both.
            for id in same_named(ctx.tree, id)? {
                if !targets.contains(&id) {
                    targets.push(id);
                }
            }
        }

        for &id in &targets {
            for (node, _) in ctx.tree.walk(id)? {
                if let Some(binding) = ctx.registry.binding_of(node) {
                    return Err(ShellError::CommandInUse {
                        command: self.name().to_string(),
                        target: ctx.tree.path_of(node)?,
                        binding: binding.to_string(),
                    });
                }
            }
        }

        for id in targets {
            // Already gone if an earlier operand was one of its ancestors.
            if !ctx.tree.contains(id) {
                continue;
            }
            let parent = ctx.tree.parent(id)?;
            if is_ancestor_or_self(ctx.tree, id, *ctx.cwd)? {
                *ctx.cwd = parent.unwrap_or(root);
            }
            ctx.tree.release(id)?;
        }

        Ok(ActionOutput::default())
    }
}

/// `id` and every sibling of any kind carrying its name.
fn same_named(tree: &DirectoryTree, id: NodeId) -> Result<Vec<NodeId>, FsError> {
    match tree.parent(id)? {
        Some(parent) => tree.find_children(parent, tree.node(id)?.name()),
        None => Ok(vec![id]),
    }
}

fn is_ancestor_or_self(
    tree: &DirectoryTree,
    ancestor: NodeId,
    node: NodeId,
) -> Result<bool, FsError> {
    let mut cursor = Some(node);
    while let Some(id) = cursor {
        if id == ancestor {
            return Ok(true);
        }
        cursor = tree.parent(id)?;
    }
    Ok(false)
}
