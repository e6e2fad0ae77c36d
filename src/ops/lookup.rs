//! tree path lookup and tag peeling

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::read_object;
use crate::repo::Repo;
use crate::types::{Commit, Kind, Object};

/// bound on annotated tag chains (tags tagging tags)
const MAX_TAG_DEPTH: usize = 10;

/// descend from a tree to the entry at a slash-separated path
///
/// returns the target identifier and its object kind. an empty path (or
/// `"/"`) names the tree itself. fails with `PathNotFound` if any segment
/// is absent from its parent tree, if an intermediate segment is not a
/// directory, or if a trailing slash names something that is not a
/// directory.
pub fn lookup(repo: &Repo, tree: &Hash, path: &str) -> Result<(Hash, Kind)> {
    let wants_directory = path.ends_with('/');
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        return Ok((*tree, Kind::Tree));
    }

    let depth = segments.len();
    let mut current = *tree;
    for (i, segment) in segments.into_iter().enumerate() {
        let object = read_object(repo, &current)?;
        let tree = object
            .as_tree()
            .ok_or_else(|| Error::PathNotFound(path.to_string()))?;
        let entry = tree
            .get(segment)
            .ok_or_else(|| Error::PathNotFound(path.to_string()))?;

        if i + 1 == depth {
            if wants_directory && !entry.mode.is_tree() {
                return Err(Error::PathNotFound(path.to_string()));
            }
            let kind = if entry.mode.is_tree() {
                Kind::Tree
            } else {
                Kind::Blob
            };
            return Ok((entry.target, kind));
        }

        if !entry.mode.is_tree() {
            return Err(Error::PathNotFound(path.to_string()));
        }
        current = entry.target;
    }

    Err(Error::PathNotFound(path.to_string()))
}

/// follow annotated tag indirection until a commit is reached
///
/// fails with `UnexpectedKind` if the chain ends at a blob or tree.
pub fn peel_to_commit(repo: &Repo, start: Hash) -> Result<(Hash, Commit)> {
    let mut hash = start;
    for _ in 0..MAX_TAG_DEPTH {
        match read_object(repo, &hash)? {
            Object::Commit(commit) => return Ok((hash, commit)),
            Object::Tag(tag) => hash = tag.target,
            other => {
                return Err(Error::UnexpectedKind {
                    hash,
                    expected: Kind::Commit,
                    found: other.kind(),
                })
            }
        }
    }

    Err(Error::MalformedObject(format!(
        "tag chain too deep starting at {start}"
    )))
}
