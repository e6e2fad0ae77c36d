//! whole-store integrity verification

use std::collections::HashSet;

use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::read_object;
use crate::refs::{list_refs, resolve_ref};
use crate::repo::Repo;
use crate::types::Object;

/// fsck report
#[derive(Debug, Default)]
pub struct FsckReport {
    /// objects on disk that were checked
    pub objects_checked: usize,
    /// objects whose payload no longer matches their identifier or fails
    /// to decode
    pub corrupt_objects: Vec<CorruptEntry>,
    /// objects referenced by refs or other objects but absent from the
    /// store
    pub missing_objects: Vec<MissingEntry>,
    /// objects not reachable from any ref
    pub dangling_objects: Vec<Hash>,
}

impl FsckReport {
    pub fn is_ok(&self) -> bool {
        self.corrupt_objects.is_empty() && self.missing_objects.is_empty()
    }
}

#[derive(Debug)]
pub struct CorruptEntry {
    pub hash: Hash,
    pub message: String,
}

#[derive(Debug)]
pub struct MissingEntry {
    pub hash: Hash,
    pub referenced_by: String,
}

/// verify repository integrity
///
/// re-reads every object (which re-verifies its hash), follows every ref
/// into the DAG, and reports corrupt, missing and dangling objects.
/// dangling objects are informational, not an error.
pub fn fsck(repo: &Repo) -> Result<FsckReport> {
    let mut report = FsckReport::default();
    let mut reachable = HashSet::new();

    for ref_name in list_refs(repo, "refs")? {
        match resolve_ref(repo, &ref_name) {
            Ok(hash) => mark_reachable(repo, hash, &ref_name, &mut reachable, &mut report)?,
            Err(Error::RefNotFound(_)) | Err(Error::RefCycle(_)) => {
                // dangling symbolic refs are a ref-layer problem, not an
                // object-store one; skip
            }
            Err(e) => return Err(e),
        }
    }

    for hash in list_objects(repo) {
        report.objects_checked += 1;
        match read_object(repo, &hash) {
            Ok(_) => {}
            Err(e @ (Error::CorruptObject(_) | Error::MalformedObject(_))) => {
                // reachable corrupt objects were already recorded by the
                // ref walk
                if !report.corrupt_objects.iter().any(|c| c.hash == hash) {
                    report.corrupt_objects.push(CorruptEntry {
                        hash,
                        message: e.to_string(),
                    });
                }
            }
            Err(e) => return Err(e),
        }
        if !reachable.contains(&hash) {
            report.dangling_objects.push(hash);
        }
    }

    debug!(
        checked = report.objects_checked,
        corrupt = report.corrupt_objects.len(),
        missing = report.missing_objects.len(),
        dangling = report.dangling_objects.len(),
        "fsck finished"
    );

    Ok(report)
}

/// walk everything reachable from a starting object
fn mark_reachable(
    repo: &Repo,
    start: Hash,
    root_name: &str,
    reachable: &mut HashSet<Hash>,
    report: &mut FsckReport,
) -> Result<()> {
    let mut worklist = vec![(start, root_name.to_string())];

    while let Some((hash, referenced_by)) = worklist.pop() {
        if !reachable.insert(hash) {
            continue;
        }

        let object = match read_object(repo, &hash) {
            Ok(object) => object,
            Err(Error::ObjectNotFound(_)) => {
                report.missing_objects.push(MissingEntry {
                    hash,
                    referenced_by,
                });
                continue;
            }
            Err(e @ (Error::CorruptObject(_) | Error::MalformedObject(_))) => {
                report.corrupt_objects.push(CorruptEntry {
                    hash,
                    message: e.to_string(),
                });
                continue;
            }
            Err(e) => return Err(e),
        };

        let from = hash.to_hex();
        match object {
            Object::Blob(_) => {}
            Object::Tree(tree) => {
                for entry in tree.entries() {
                    worklist.push((entry.target, from.clone()));
                }
            }
            Object::Commit(commit) => {
                worklist.push((commit.tree, from.clone()));
                for parent in &commit.parents {
                    worklist.push((*parent, from.clone()));
                }
            }
            Object::Tag(tag) => {
                worklist.push((tag.target, from));
            }
        }
    }

    Ok(())
}

/// enumerate object identifiers present on disk
///
/// file names that do not parse as bucketed identifiers are ignored.
fn list_objects(repo: &Repo) -> Vec<Hash> {
    let mut hashes = Vec::new();

    for entry in WalkDir::new(repo.objects_path())
        .min_depth(2)
        .max_depth(2)
        .into_iter()
        .flatten()
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let bucket = entry
            .path()
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string());
        let rest = entry.file_name().to_string_lossy().to_string();

        if let Some(bucket) = bucket {
            if let Ok(hash) = Hash::from_hex(&format!("{bucket}{rest}")) {
                hashes.push(hash);
            }
        }
    }

    hashes
}
