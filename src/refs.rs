//! ref store: named pointers over the object store
//!
//! a ref file holds either a hex identifier (direct) or `ref: <name>`
//! (symbolic, one more hop). refs are mutable; writes go through a temp
//! file and an atomic rename. the compare-and-swap in [`update_ref`]
//! additionally serializes read-compare-rename behind a `<ref>.lock`
//! file, so two racing updates from the same expected value cannot both
//! succeed.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::error::{Error, IoResultExt, Result};
use crate::hash::Hash;
use crate::repo::Repo;

/// upper bound on symbolic indirection; in practice HEAD is one hop
const MAX_SYMREF_DEPTH: usize = 10;

const SYMREF_PREFIX: &str = "ref: ";

/// contents of a ref file
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefValue {
    /// holds an object identifier
    Direct(Hash),
    /// holds the name of another ref
    Symbolic(String),
}

/// read a ref without following indirection
pub fn read_ref(repo: &Repo, name: &str) -> Result<RefValue> {
    validate_ref_name(name)?;
    let path = ref_path(repo, name);

    let content = fs::read_to_string(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::RefNotFound(name.to_string())
        } else {
            Error::Io { path, source: e }
        }
    })?;

    let line = content.trim();
    match line.strip_prefix(SYMREF_PREFIX) {
        Some(target) => Ok(RefValue::Symbolic(target.to_string())),
        None => Ok(RefValue::Direct(Hash::from_hex(line)?)),
    }
}

/// resolve a name to an object identifier
///
/// a 64-hex-char string is parsed as an identifier directly. otherwise the
/// ref is read and symbolic hops are followed until a direct ref is
/// reached; a cycle or an over-long chain fails with `RefCycle`.
pub fn resolve_ref(repo: &Repo, name_or_hex: &str) -> Result<Hash> {
    if name_or_hex.len() == 64 && name_or_hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Hash::from_hex(name_or_hex);
    }

    let mut seen = HashSet::new();
    let mut current = name_or_hex.to_string();

    for _ in 0..MAX_SYMREF_DEPTH {
        if !seen.insert(current.clone()) {
            return Err(Error::RefCycle(name_or_hex.to_string()));
        }
        match read_ref(repo, &current)? {
            RefValue::Direct(hash) => return Ok(hash),
            RefValue::Symbolic(target) => current = target,
        }
    }

    Err(Error::RefCycle(name_or_hex.to_string()))
}

/// unconditionally set a direct ref
pub fn write_ref(repo: &Repo, name: &str, hash: &Hash) -> Result<()> {
    write_ref_raw(repo, name, &hash.to_hex())
}

/// set a symbolic ref, e.g. HEAD -> refs/heads/main
pub fn write_symbolic_ref(repo: &Repo, name: &str, target: &str) -> Result<()> {
    validate_ref_name(target)?;
    write_ref_raw(repo, name, &format!("{SYMREF_PREFIX}{target}"))
}

/// atomically replace the value of a direct ref
///
/// when `expected` is supplied and the current value differs (including a
/// missing ref), fails with `RefUpdateConflict` and leaves the ref
/// untouched. `expected = None` writes unconditionally. the whole
/// read-compare-write runs under a `<ref>.lock` file; a concurrent holder
/// fails with `LockContention`.
pub fn update_ref(repo: &Repo, name: &str, new: &Hash, expected: Option<&Hash>) -> Result<()> {
    validate_ref_name(name)?;
    let _lock = RefLock::acquire(repo, name)?;

    let current = match read_ref(repo, name) {
        Ok(RefValue::Direct(hash)) => Some(hash),
        Ok(RefValue::Symbolic(_)) => {
            return Err(Error::InvalidRef(format!(
                "cannot compare-and-swap symbolic ref: {name}"
            )))
        }
        Err(Error::RefNotFound(_)) => None,
        Err(e) => return Err(e),
    };

    if let Some(expected) = expected {
        if current != Some(*expected) {
            return Err(Error::RefUpdateConflict {
                name: name.to_string(),
                expected: Some(*expected),
                actual: current,
            });
        }
    }

    write_ref_raw(repo, name, &new.to_hex())
}

/// delete a ref
pub fn delete_ref(repo: &Repo, name: &str) -> Result<()> {
    validate_ref_name(name)?;
    let path = ref_path(repo, name);

    fs::remove_file(&path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::RefNotFound(name.to_string())
        } else {
            Error::Io { path, source: e }
        }
    })
}

/// check if a ref exists
pub fn ref_exists(repo: &Repo, name: &str) -> bool {
    validate_ref_name(name).is_ok() && ref_path(repo, name).exists()
}

/// enumerate refs under a namespace prefix, e.g. "refs/heads"
///
/// returns sorted full names; a missing namespace directory is empty, not
/// an error.
pub fn list_refs(repo: &Repo, prefix: &str) -> Result<Vec<String>> {
    validate_ref_name(prefix)?;
    let dir = ref_path(repo, prefix);

    let mut refs = Vec::new();
    if dir.is_dir() {
        collect_refs(&dir, prefix, &mut refs)?;
    } else if dir.is_file() {
        refs.push(prefix.to_string());
    }

    refs.sort();
    Ok(refs)
}

/// list refs matching a glob pattern, e.g. "refs/tags/v1.*"
pub fn list_refs_matching(repo: &Repo, pattern: &str) -> Result<Vec<String>> {
    let glob = glob::Pattern::new(pattern).map_err(|e| Error::InvalidRef(e.to_string()))?;
    let all = list_refs(repo, "refs")?;
    Ok(all.into_iter().filter(|r| glob.matches(r)).collect())
}

/// filesystem path for a validated ref name
fn ref_path(repo: &Repo, name: &str) -> PathBuf {
    repo.path().join(name)
}

/// exclusive per-ref lock: a `<ref>.lock` file created with `create_new`,
/// removed on drop
struct RefLock {
    path: PathBuf,
}

impl RefLock {
    fn acquire(repo: &Repo, name: &str) -> Result<Self> {
        let mut os_path = ref_path(repo, name).into_os_string();
        os_path.push(".lock");
        let path = PathBuf::from(os_path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_path(parent)?;
        }

        match File::options().write(true).create_new(true).open(&path) {
            Ok(_) => Ok(Self { path }),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(Error::LockContention(name.to_string()))
            }
            Err(e) => Err(Error::Io { path, source: e }),
        }
    }
}

impl Drop for RefLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

/// atomic write: temp -> fsync -> rename -> fsync parent
fn write_ref_raw(repo: &Repo, name: &str, content: &str) -> Result<()> {
    validate_ref_name(name)?;
    let path = ref_path(repo, name);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_path(parent)?;
    }

    let tmp_path = repo.tmp_path().join(uuid::Uuid::new_v4().to_string());
    {
        let mut tmp_file = File::create(&tmp_path).with_path(&tmp_path)?;
        writeln!(tmp_file, "{content}").with_path(&tmp_path)?;
        tmp_file.sync_all().with_path(&tmp_path)?;
    }

    fs::rename(&tmp_path, &path).with_path(&path)?;

    if let Some(parent) = path.parent() {
        let dir = File::open(parent).with_path(parent)?;
        dir.sync_all().with_path(parent)?;
    }

    debug!(name, content, "wrote ref");

    Ok(())
}

/// recursively collect ref names relative to the repo root
fn collect_refs(dir: &PathBuf, prefix: &str, refs: &mut Vec<String>) -> Result<()> {
    for entry in fs::read_dir(dir).with_path(dir)? {
        let entry = entry.with_path(dir)?;
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();
        let full = format!("{prefix}/{name}");

        if path.is_dir() {
            collect_refs(&path, &full, refs)?;
        } else if path.is_file() {
            refs.push(full);
        }
    }
    Ok(())
}

/// validate a ref name
///
/// a name is `HEAD` or a slash-separated path under `refs/`; components
/// are non-empty and never `.`/`..`, guarding against path traversal out
/// of the repository root.
fn validate_ref_name(name: &str) -> Result<()> {
    if name == "HEAD" {
        return Ok(());
    }

    if name != "refs" && !name.starts_with("refs/") {
        return Err(Error::InvalidRef(format!(
            "ref name must be HEAD or start with 'refs/': {name}"
        )));
    }

    if name.ends_with('/') {
        return Err(Error::InvalidRef(format!(
            "ref name cannot end with '/': {name}"
        )));
    }

    if name.contains('\0') {
        return Err(Error::InvalidRef(format!(
            "ref name cannot contain null byte: {name}"
        )));
    }

    for component in name.split('/') {
        if component.is_empty() || component == "." || component == ".." {
            return Err(Error::InvalidRef(format!(
                "ref name has invalid component: {name}"
            )));
        }
    }

    Ok(())
}
