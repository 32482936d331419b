// src/commands/utils/mod.rs
use crate::fs::{DirectoryTree, FsError, NodeId};

/// Split `path` into the directory that holds its last segment and the
/// segment itself. The directory must already exist.
pub fn split_parent<'p>(
    tree: &DirectoryTree,
    cwd: NodeId,
    path: &'p str,
) -> Result<(NodeId, &'p str), FsError> {
    let trimmed = path.trim_end_matches('/');
    let invalid = || FsError::InvalidPath {
        path: path.to_string(),
        operation: "create".to_string(),
    };
    let (dir, leaf) = match trimmed.rfind('/') {
        // Only the root itself lives directly under `/`.
        Some(0) => return Err(invalid()),
        Some(pos) => (&trimmed[..pos], &trimmed[pos + 1..]),
        None => (".", trimmed),
    };
    if leaf.is_empty() || leaf == "." || leaf == ".." {
        return Err(invalid());
    }
    Ok((tree.resolve_path(cwd, dir)?, leaf))
}


#[cfg(test)]
mod tests {
    use super::testing::Fixture;
    use super::*;

    #[test]
    fn test_split_parent() {
        let fx = Fixture::new();
        let root = fx.tree.root();
        assert_eq!(split_parent(&fx.tree, root, "x").unwrap(), (root, "x"));
        assert_eq!(split_parent(&fx.tree, root, "bin/x/").unwrap(), (fx.bin, "x"));
        assert_eq!(split_parent(&fx.tree, fx.bin, "/home/x").unwrap(), (root, "x"));
    }

    #[test]
    fn test_split_parent_rejects_bad_leaf() {
        let fx = Fixture::new();
        let root = fx.tree.root();
        for path in ["/x", "..", ".", "bin/..", ""] {
            assert!(
                matches!(split_parent(&fx.tree, root, path), Err(FsError::InvalidPath { .. })),
                "{path}"
            );
        }
        assert!(matches!(
            split_parent(&fx.tree, root, "missing/x"),
            Err(FsError::NotFound { .. })
        ));
    }
}
