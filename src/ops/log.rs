//! commit history traversal
//!
//! lazy walk over the commit DAG in reverse-chronological topological
//! order: a commit is never produced before any of its already-discovered
//! children, and shared ancestors (diamond merges) are emitted once.
//!
//! timestamps only choose among commits whose discovered children have
//! all been emitted, so a skewed clock cannot reorder a parent ahead of
//! a child sitting in the frontier.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap, HashSet};

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::object::read_object;
use crate::ops::lookup::peel_to_commit;
use crate::refs::resolve_ref;
use crate::repo::Repo;
use crate::types::{Commit, Kind, Object};

/// commit with its hash, as yielded by the walk
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub hash: Hash,
    pub commit: Commit,
}

/// ready slot: newest committer timestamp wins, discovery order breaks
/// ties toward the child side
struct Pending {
    timestamp: i64,
    seq: u64,
    hash: Hash,
    commit: Commit,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.timestamp == other.timestamp && self.seq == other.seq
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        self.timestamp
            .cmp(&other.timestamp)
            .then(other.seq.cmp(&self.seq))
    }
}

/// lazy iterator over commit ancestry
///
/// yields `Err` once and then stops if the store turns out to be missing
/// or corrupt mid-walk.
pub struct History<'a> {
    repo: &'a Repo,
    /// commits whose discovered children are all emitted
    ready: BinaryHeap<Pending>,
    /// loaded commits still blocked by an unemitted child
    waiting: HashMap<Hash, Pending>,
    /// per commit, how many loaded-but-unemitted commits list it as a
    /// parent
    blocked: HashMap<Hash, usize>,
    discovered: HashSet<Hash>,
    seq: u64,
}

impl<'a> History<'a> {
    /// start a walk from a commit identifier; annotated tags are peeled
    pub fn new(repo: &'a Repo, start: Hash) -> Result<Self> {
        let (hash, commit) = peel_to_commit(repo, start)?;

        let mut walk = Self {
            repo,
            ready: BinaryHeap::new(),
            waiting: HashMap::new(),
            blocked: HashMap::new(),
            discovered: HashSet::new(),
            seq: 0,
        };
        walk.discovered.insert(hash);
        walk.load(hash, commit);
        Ok(walk)
    }

    /// register a loaded commit: block its parents, then park it as
    /// ready or waiting depending on its own child count
    fn load(&mut self, hash: Hash, commit: Commit) {
        for parent in &commit.parents {
            *self.blocked.entry(*parent).or_insert(0) += 1;
        }

        let pending = Pending {
            timestamp: commit.committer.timestamp,
            seq: self.seq,
            hash,
            commit,
        };
        self.seq += 1;

        if self.blocked.get(&hash).copied().unwrap_or(0) == 0 {
            self.ready.push(pending);
        } else {
            self.waiting.insert(hash, pending);
        }
    }

    /// read and register a parent unless already discovered
    fn discover_parent(&mut self, hash: Hash) -> Result<()> {
        if !self.discovered.insert(hash) {
            return Ok(());
        }
        let commit = match read_object(self.repo, &hash)? {
            Object::Commit(commit) => commit,
            other => {
                return Err(Error::UnexpectedKind {
                    hash,
                    expected: Kind::Commit,
                    found: other.kind(),
                })
            }
        };
        self.load(hash, commit);
        Ok(())
    }

    fn poison(&mut self) {
        self.ready.clear();
        self.waiting.clear();
        self.blocked.clear();
    }
}

impl Iterator for History<'_> {
    type Item = Result<HistoryEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let pending = self.ready.pop()?;
        let parents = pending.commit.parents.clone();

        // parents enter the frontier in listed order
        for &parent in &parents {
            if let Err(e) = self.discover_parent(parent) {
                self.poison();
                return Some(Err(e));
            }
        }

        // emitting this commit unblocks its parents
        for parent in parents {
            if let Some(count) = self.blocked.get_mut(&parent) {
                *count -= 1;
                if *count == 0 {
                    self.blocked.remove(&parent);
                    if let Some(p) = self.waiting.remove(&parent) {
                        self.ready.push(p);
                    }
                }
            }
        }

        Some(Ok(HistoryEntry {
            hash: pending.hash,
            commit: pending.commit,
        }))
    }
}

/// collect history for a ref or hex identifier, newest first
pub fn log(repo: &Repo, name_or_hex: &str, max_count: Option<usize>) -> Result<Vec<HistoryEntry>> {
    let start = resolve_ref(repo, name_or_hex)?;

    let mut entries = Vec::new();
    for item in History::new(repo, start)? {
        entries.push(item?);
        if let Some(max) = max_count {
            if entries.len() >= max {
                break;
            }
        }
    }
    Ok(entries)
}
