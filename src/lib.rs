//! loam - minimal version-control storage engine
//!
//! a content-addressable store for immutable objects (blobs, trees,
//! commits, tags), a ref naming layer on top of it, and the traversal
//! logic to reconstruct history and directory snapshots.
//!
//! # Core concepts
//!
//! - **Blob**: opaque file content
//! - **Tree**: a sorted directory listing pointing at blobs and subtrees
//! - **Commit**: a snapshot of a tree with ancestry and attribution
//! - **Tag**: an annotated pointer at another object
//! - **Ref**: a named, mutable pointer (direct or symbolic, like HEAD)
//!
//! # Identifiers
//!
//! object id = SHA256(`<kind> <content-length>\0<content>`)
//!
//! computed before compression; the store re-verifies it on every read,
//! so tampered or truncated payloads surface as `CorruptObject` instead
//! of bad data.
//!
//! # Example usage
//!
//! ```no_run
//! use loam::{ops, refs, types::Object, write_object, Repo};
//! use std::path::Path;
//!
//! // initialize a repository
//! let repo = Repo::init(Path::new("/path/to/repo")).unwrap();
//!
//! // store a blob and point a branch at work built on it
//! let blob = write_object(&repo, &Object::Blob(b"hello".to_vec())).unwrap();
//!
//! // walk history from HEAD
//! let head = refs::resolve_ref(&repo, "HEAD").unwrap();
//! for entry in ops::History::new(&repo, head).unwrap() {
//!     let entry = entry.unwrap();
//!     println!("{} {}", entry.hash, entry.commit.message);
//! }
//! ```

mod codec;
mod config;
mod error;
mod hash;
mod object;
mod repo;

pub mod ops;
pub mod refs;
pub mod types;

pub use codec::{decode, encode};
pub use config::Config;
pub use error::{Error, Result};
pub use hash::Hash;
pub use object::{object_exists, object_path, read_object, write_object};
pub use refs::{
    delete_ref, list_refs, list_refs_matching, read_ref, ref_exists, resolve_ref, update_ref,
    write_ref, write_symbolic_ref, RefValue,
};
pub use repo::Repo;
pub use types::{Commit, FileMode, Kind, Object, Signature, Tag, Tree, TreeEntry};

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// the whole flow: init, blob, tree, root commit, branch update,
    /// HEAD resolution
    #[test]
    fn test_end_to_end_first_commit() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(&dir.path().join("repo")).unwrap();

        let blob = write_object(&repo, &Object::Blob(b"hello".to_vec())).unwrap();

        let tree = Tree::new(vec![TreeEntry::new(FileMode::Regular, "file.txt", blob)]).unwrap();
        let tree_hash = write_object(&repo, &Object::Tree(tree)).unwrap();

        let author = Signature::new("A. Author", "author@example.com", 1234567890);
        let commit = Commit::new(tree_hash, vec![], author, "first commit");
        let commit_hash = write_object(&repo, &Object::Commit(commit)).unwrap();

        update_ref(&repo, "refs/heads/main", &commit_hash, None).unwrap();

        // HEAD was initialized pointing at refs/heads/main
        assert_eq!(resolve_ref(&repo, "HEAD").unwrap(), commit_hash);

        // and the snapshot is fully reconstructible
        let (found, kind) = ops::lookup(&repo, &tree_hash, "file.txt").unwrap();
        assert_eq!(found, blob);
        assert_eq!(kind, Kind::Blob);
        assert_eq!(
            read_object(&repo, &found).unwrap(),
            Object::Blob(b"hello".to_vec())
        );
    }

    #[test]
    fn test_put_get_roundtrip_all_kinds() {
        let dir = tempdir().unwrap();
        let repo = Repo::init(&dir.path().join("repo")).unwrap();

        let sig = Signature::new("A", "a@x", 7);
        let blob = Object::Blob(b"bytes".to_vec());
        let tree = Object::Tree(Tree::empty());
        let commit = Object::Commit(Commit::new(Hash::ZERO, vec![], sig.clone(), "m"));
        let tag = Object::Tag(Tag::new(Hash::ZERO, Kind::Commit, "v0", sig, "t"));

        for object in [blob, tree, commit, tag] {
            let hash = write_object(&repo, &object).unwrap();
            assert_eq!(read_object(&repo, &hash).unwrap(), object);
        }
    }
}
