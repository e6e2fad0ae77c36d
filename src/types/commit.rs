use std::fmt;

use crate::error::{Error, Result};
use crate::hash::Hash;

/// author or committer identity with a timestamp
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub email: String,
    /// unix timestamp (seconds since epoch)
    pub timestamp: i64,
}

impl Signature {
    pub fn new(name: impl Into<String>, email: impl Into<String>, timestamp: i64) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            timestamp,
        }
    }

    /// parse the header-line form `name <email> timestamp`
    pub fn parse(s: &str) -> Result<Self> {
        let open = s
            .find('<')
            .ok_or_else(|| Error::MalformedObject(format!("signature missing '<': {s}")))?;
        let close = s
            .find('>')
            .ok_or_else(|| Error::MalformedObject(format!("signature missing '>': {s}")))?;
        if close < open {
            return Err(Error::MalformedObject(format!("bad signature: {s}")));
        }

        let name = s[..open].trim().to_string();
        let email = s[open + 1..close].to_string();
        let timestamp = s[close + 1..]
            .trim()
            .parse::<i64>()
            .map_err(|_| Error::MalformedObject(format!("bad signature timestamp: {s}")))?;

        Ok(Self {
            name,
            email,
            timestamp,
        })
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}> {}", self.name, self.email, self.timestamp)
    }
}

/// a commit object pointing to a tree with ancestry and attribution
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Commit {
    /// root tree hash
    pub tree: Hash,
    /// parent commit hashes (empty for root, 1 for linear, 2+ for merge)
    pub parents: Vec<Hash>,
    /// who wrote the snapshot
    pub author: Signature,
    /// who recorded it
    pub committer: Signature,
    /// commit message
    pub message: String,
}

impl Commit {
    /// create a new commit; committer defaults to the author
    pub fn new(
        tree: Hash,
        parents: Vec<Hash>,
        author: Signature,
        message: impl Into<String>,
    ) -> Self {
        Self {
            tree,
            parents,
            committer: author.clone(),
            author,
            message: message.into(),
        }
    }

    /// override the committer identity
    pub fn with_committer(mut self, committer: Signature) -> Self {
        self.committer = committer;
        self
    }

    /// is this a root commit (no parents)
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// is this a merge commit (multiple parents)
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}
