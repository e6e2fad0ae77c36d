//! canonical object serialization
//!
//! wire form: `<kind> <content-length>\0<content>`. the object identifier
//! is the SHA-256 of exactly these bytes, so the content encodings below
//! are canonical: same object, same bytes, same hash.

use crate::error::{Error, Result};
use crate::hash::Hash;
use crate::types::{Commit, FileMode, Kind, Object, Signature, Tag, Tree, TreeEntry};

/// serialize an object to its canonical byte form
pub fn encode(object: &Object) -> Vec<u8> {
    let content = encode_content(object);
    let mut out = Vec::with_capacity(content.len() + 16);
    out.extend_from_slice(object.kind().as_str().as_bytes());
    out.push(b' ');
    out.extend_from_slice(content.len().to_string().as_bytes());
    out.push(0);
    out.extend_from_slice(&content);
    out
}

/// deserialize an object from its canonical byte form
///
/// any structural violation is a `MalformedObject` error, never a panic.
pub fn decode(bytes: &[u8]) -> Result<Object> {
    let space = bytes
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| Error::MalformedObject("header missing space".to_string()))?;
    let kind_str = std::str::from_utf8(&bytes[..space])
        .map_err(|_| Error::MalformedObject("type tag is not valid utf-8".to_string()))?;
    let kind = kind_str.parse::<Kind>()?;

    let nul = bytes[space + 1..]
        .iter()
        .position(|&b| b == 0)
        .map(|i| i + space + 1)
        .ok_or_else(|| Error::MalformedObject("header missing NUL terminator".to_string()))?;
    let declared: usize = std::str::from_utf8(&bytes[space + 1..nul])
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| Error::MalformedObject("bad content length in header".to_string()))?;

    let content = &bytes[nul + 1..];
    if content.len() != declared {
        return Err(Error::MalformedObject(format!(
            "declared length {declared} does not match payload length {}",
            content.len()
        )));
    }

    match kind {
        Kind::Blob => Ok(Object::Blob(content.to_vec())),
        Kind::Tree => decode_tree(content).map(Object::Tree),
        Kind::Commit => decode_commit(content).map(Object::Commit),
        Kind::Tag => decode_tag(content).map(Object::Tag),
    }
}

fn encode_content(object: &Object) -> Vec<u8> {
    match object {
        Object::Blob(data) => data.clone(),
        Object::Tree(tree) => encode_tree(tree),
        Object::Commit(commit) => encode_commit(commit),
        Object::Tag(tag) => encode_tag(tag),
    }
}

/// tree content: per entry `<octal mode> <name>\0` followed by the raw
/// 32-byte target hash, in the tree's sorted order
fn encode_tree(tree: &Tree) -> Vec<u8> {
    let mut out = Vec::new();
    for entry in tree.entries() {
        out.extend_from_slice(entry.mode.to_string().as_bytes());
        out.push(b' ');
        out.extend_from_slice(entry.name.as_bytes());
        out.push(0);
        out.extend_from_slice(entry.target.as_bytes());
    }
    out
}

fn decode_tree(content: &[u8]) -> Result<Tree> {
    let mut entries = Vec::new();
    let mut pos = 0;

    while pos < content.len() {
        let space = content[pos..]
            .iter()
            .position(|&b| b == b' ')
            .map(|i| i + pos)
            .ok_or_else(|| Error::MalformedObject("tree entry missing mode".to_string()))?;
        let mode_str = std::str::from_utf8(&content[pos..space])
            .map_err(|_| Error::MalformedObject("tree entry mode is not ascii".to_string()))?;
        let mode_val = u32::from_str_radix(mode_str, 8)
            .map_err(|_| Error::MalformedObject(format!("bad tree entry mode: {mode_str}")))?;
        let mode = FileMode::from_mode(mode_val).ok_or_else(|| {
            Error::MalformedObject(format!("unrecognized tree entry mode: {mode_str}"))
        })?;

        let nul = content[space + 1..]
            .iter()
            .position(|&b| b == 0)
            .map(|i| i + space + 1)
            .ok_or_else(|| Error::MalformedObject("tree entry missing name".to_string()))?;
        let name = std::str::from_utf8(&content[space + 1..nul])
            .map_err(|_| Error::MalformedObject("tree entry name is not valid utf-8".to_string()))?
            .to_string();

        let hash_end = nul + 1 + 32;
        if hash_end > content.len() {
            return Err(Error::MalformedObject(
                "tree entry truncated before target hash".to_string(),
            ));
        }
        let mut raw = [0u8; 32];
        raw.copy_from_slice(&content[nul + 1..hash_end]);

        entries.push(TreeEntry::new(mode, name, Hash::from_bytes(raw)));
        pos = hash_end;
    }

    // Tree::new re-validates names and rejects duplicates
    Tree::new(entries)
}

/// commit content: `tree`, `parent`* (listed order), `author`, `committer`
/// header lines, a blank line, then the message
fn encode_commit(commit: &Commit) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(&format!("tree {}\n", commit.tree.to_hex()));
    for parent in &commit.parents {
        out.push_str(&format!("parent {}\n", parent.to_hex()));
    }
    out.push_str(&format!("author {}\n", commit.author));
    out.push_str(&format!("committer {}\n", commit.committer));
    out.push('\n');
    out.push_str(&commit.message);
    out.into_bytes()
}

fn decode_commit(content: &[u8]) -> Result<Commit> {
    let text = std::str::from_utf8(content)
        .map_err(|_| Error::MalformedObject("commit is not valid utf-8".to_string()))?;
    let (headers, message) = split_headers(text, "commit")?;

    let mut tree = None;
    let mut parents = Vec::new();
    let mut author = None;
    let mut committer = None;

    for line in headers.lines() {
        let (key, value) = line.split_once(' ').ok_or_else(|| {
            Error::MalformedObject(format!("bad commit header line: {line}"))
        })?;
        match key {
            "tree" => {
                if tree.is_some() {
                    return Err(Error::MalformedObject("duplicate tree header".to_string()));
                }
                tree = Some(parse_header_hash(key, value)?);
            }
            "parent" => parents.push(parse_header_hash(key, value)?),
            "author" => {
                if author.is_some() {
                    return Err(Error::MalformedObject("duplicate author header".to_string()));
                }
                author = Some(Signature::parse(value)?);
            }
            "committer" => {
                if committer.is_some() {
                    return Err(Error::MalformedObject(
                        "duplicate committer header".to_string(),
                    ));
                }
                committer = Some(Signature::parse(value)?);
            }
            other => {
                return Err(Error::MalformedObject(format!(
                    "unknown commit header: {other}"
                )))
            }
        }
    }

    let tree =
        tree.ok_or_else(|| Error::MalformedObject("commit missing tree header".to_string()))?;
    let author =
        author.ok_or_else(|| Error::MalformedObject("commit missing author header".to_string()))?;
    let committer = committer.ok_or_else(|| {
        Error::MalformedObject("commit missing committer header".to_string())
    })?;

    Ok(Commit::new(tree, parents, author, message).with_committer(committer))
}

/// tag content: `object`, `type`, `tag`, `tagger` header lines, a blank
/// line, then the message
fn encode_tag(tag: &Tag) -> Vec<u8> {
    let mut out = String::new();
    out.push_str(&format!("object {}\n", tag.target.to_hex()));
    out.push_str(&format!("type {}\n", tag.kind));
    out.push_str(&format!("tag {}\n", tag.name));
    out.push_str(&format!("tagger {}\n", tag.tagger));
    out.push('\n');
    out.push_str(&tag.message);
    out.into_bytes()
}

fn decode_tag(content: &[u8]) -> Result<Tag> {
    let text = std::str::from_utf8(content)
        .map_err(|_| Error::MalformedObject("tag is not valid utf-8".to_string()))?;
    let (headers, message) = split_headers(text, "tag")?;

    let mut target = None;
    let mut kind = None;
    let mut name = None;
    let mut tagger = None;

    for line in headers.lines() {
        let (key, value) = line
            .split_once(' ')
            .ok_or_else(|| Error::MalformedObject(format!("bad tag header line: {line}")))?;
        match key {
            "object" => target = Some(parse_header_hash(key, value)?),
            "type" => kind = Some(value.parse::<Kind>()?),
            "tag" => name = Some(value.to_string()),
            "tagger" => tagger = Some(Signature::parse(value)?),
            other => {
                return Err(Error::MalformedObject(format!(
                    "unknown tag header: {other}"
                )))
            }
        }
    }

    let target =
        target.ok_or_else(|| Error::MalformedObject("tag missing object header".to_string()))?;
    let kind = kind.ok_or_else(|| Error::MalformedObject("tag missing type header".to_string()))?;
    let name = name.ok_or_else(|| Error::MalformedObject("tag missing tag header".to_string()))?;
    let tagger =
        tagger.ok_or_else(|| Error::MalformedObject("tag missing tagger header".to_string()))?;

    Ok(Tag::new(target, kind, name, tagger, message))
}

fn split_headers<'a>(text: &'a str, what: &str) -> Result<(&'a str, &'a str)> {
    text.split_once("\n\n")
        .ok_or_else(|| Error::MalformedObject(format!("{what} missing blank line before message")))
}

fn parse_header_hash(key: &str, value: &str) -> Result<Hash> {
    Hash::from_hex(value)
        .map_err(|_| Error::MalformedObject(format!("bad hash in {key} header: {value}")))
}
