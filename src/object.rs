//! content-addressed object store
//!
//! payloads live under `objects/<2-hex>/<62-hex>`, zstd-compressed. the
//! identifier is computed over the canonical uncompressed bytes, and is
//! re-verified on every read.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::codec;
use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;
use crate::repo::Repo;
use crate::types::Object;

/// zstd level 3 - fast, reasonable ratio
const COMPRESSION_LEVEL: i32 = 3;

/// write an object to the store, returning its identifier
///
/// writing the same content twice is a no-op: the second call observes the
/// existing payload and returns the same identifier.
pub fn write_object(repo: &Repo, object: &Object) -> Result<Hash> {
    let bytes = codec::encode(object);
    let hash = Hash::digest(&bytes);

    let (dir, file) = hash.to_path_components();
    let bucket = repo.objects_path().join(&dir);
    let path = bucket.join(&file);

    // deduplication: content-addressed, so an existing payload is this one
    if path.exists() {
        return Ok(hash);
    }

    let compressed = zstd::encode_all(&bytes[..], COMPRESSION_LEVEL).map_err(|e| Error::Io {
        path: path.clone(),
        source: e,
    })?;

    fs::create_dir_all(&bucket).with_path(&bucket)?;

    // atomic write: temp -> fsync -> rename
    let tmp_path = repo.tmp_path().join(uuid::Uuid::new_v4().to_string());
    {
        let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
        tmp_file.write_all(&compressed).with_path(&tmp_path)?;
        tmp_file.sync_all().with_path(&tmp_path)?;
    }
    fs::rename(&tmp_path, &path).with_path(&path)?;
    fsync_dir(&bucket)?;

    debug!(kind = %object.kind(), %hash, "wrote object");

    Ok(hash)
}

/// read an object from the store
///
/// fails with `ObjectNotFound` if no payload exists for the identifier,
/// and with `CorruptObject` if the stored payload no longer hashes to it.
pub fn read_object(repo: &Repo, hash: &Hash) -> Result<Object> {
    let path = object_path(repo, hash);

    let compressed = fs::read(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::ObjectNotFound(*hash)
        } else {
            Error::Io { path, source: e }
        }
    })?;

    // a payload that no longer decompresses is corrupt, not an io problem
    let bytes =
        zstd::decode_all(&compressed[..]).map_err(|_| Error::CorruptObject(*hash))?;

    // integrity check on every read
    let actual = Hash::digest(&bytes);
    if actual != *hash {
        return Err(Error::CorruptObject(*hash));
    }

    codec::decode(&bytes)
}

/// non-failing existence check
pub fn object_exists(repo: &Repo, hash: &Hash) -> bool {
    object_path(repo, hash).exists()
}

/// get the filesystem path for an object payload
pub fn object_path(repo: &Repo, hash: &Hash) -> PathBuf {
    let (dir, file) = hash.to_path_components();
    repo.objects_path().join(dir).join(file)
}

/// fsync a directory
fn fsync_dir(path: &Path) -> Result<()> {
    let dir = File::open(path).with_path(path)?;
    dir.sync_all().with_path(path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Commit, FileMode, Signature, Tree, TreeEntry};
    use tempfile::tempdir;

    fn test_repo() -> (tempfile::TempDir, Repo) {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("repo");
        let repo = Repo::init(&repo_path).unwrap();
        (dir, repo)
    }

    #[test]
    fn test_write_and_read_blob() {
        let (_dir, repo) = test_repo();

        let blob = Object::Blob(b"hello, world!".to_vec());
        let hash = write_object(&repo, &blob).unwrap();

        assert!(object_exists(&repo, &hash));
        assert_eq!(read_object(&repo, &hash).unwrap(), blob);
    }

    #[test]
    fn test_write_idempotent() {
        let (_dir, repo) = test_repo();

        let blob = Object::Blob(b"duplicate content".to_vec());
        let h1 = write_object(&repo, &blob).unwrap();
        let h2 = write_object(&repo, &blob).unwrap();

        assert_eq!(h1, h2);
    }

    #[test]
    fn test_identifier_deterministic_across_repos() {
        let (_d1, r1) = test_repo();
        let (_d2, r2) = test_repo();

        let blob = Object::Blob(b"same bytes".to_vec());
        assert_eq!(
            write_object(&r1, &blob).unwrap(),
            write_object(&r2, &blob).unwrap()
        );
    }

    #[test]
    fn test_write_and_read_tree() {
        let (_dir, repo) = test_repo();

        let blob_hash = write_object(&repo, &Object::Blob(b"content".to_vec())).unwrap();
        let tree = Object::Tree(
            Tree::new(vec![TreeEntry::new(FileMode::Regular, "file.txt", blob_hash)]).unwrap(),
        );

        let hash = write_object(&repo, &tree).unwrap();
        assert_eq!(read_object(&repo, &hash).unwrap(), tree);
    }

    #[test]
    fn test_write_and_read_commit() {
        let (_dir, repo) = test_repo();

        let commit = Object::Commit(Commit::new(
            Hash::ZERO,
            vec![],
            Signature::new("A", "a@example.com", 1234567890),
            "initial",
        ));
        let hash = write_object(&repo, &commit).unwrap();
        assert_eq!(read_object(&repo, &hash).unwrap(), commit);
    }

    #[test]
    fn test_object_path_structure() {
        let (_dir, repo) = test_repo();

        let hash = write_object(&repo, &Object::Blob(b"test".to_vec())).unwrap();
        let path = object_path(&repo, &hash);

        // path should be objects/XX/YYYY...
        let hex = hash.to_hex();
        assert!(path.ends_with(format!("{}/{}", &hex[..2], &hex[2..])));
        assert!(path.is_file());
    }

    #[test]
    fn test_read_nonexistent_object() {
        let (_dir, repo) = test_repo();

        let result = read_object(&repo, &Hash::ZERO);
        assert!(matches!(result, Err(Error::ObjectNotFound(_))));
    }

    #[test]
    fn test_tampered_payload_is_corrupt() {
        let (_dir, repo) = test_repo();

        let hash = write_object(&repo, &Object::Blob(b"pristine".to_vec())).unwrap();
        let path = object_path(&repo, &hash);

        // overwrite with a valid payload for different content
        let other = zstd::encode_all(&codec::encode(&Object::Blob(b"tampered".to_vec()))[..], 3)
            .unwrap();
        fs::write(&path, other).unwrap();

        let result = read_object(&repo, &hash);
        assert!(matches!(result, Err(Error::CorruptObject(_))));
    }

    #[test]
    fn test_truncated_payload_is_corrupt() {
        let (_dir, repo) = test_repo();

        let hash =
            write_object(&repo, &Object::Blob(b"long enough to truncate".to_vec())).unwrap();
        let path = object_path(&repo, &hash);

        let stored = fs::read(&path).unwrap();
        fs::write(&path, &stored[..stored.len() / 2]).unwrap();

        let result = read_object(&repo, &hash);
        assert!(matches!(result, Err(Error::CorruptObject(_))));
    }

    #[test]
    fn test_exists_check_never_fails() {
        let (_dir, repo) = test_repo();
        assert!(!object_exists(&repo, &Hash::ZERO));
    }
}
