use std::path::PathBuf;

use crate::types::Kind;
use crate::Hash;

/// error type for loam operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not a repository (or any ancestor): {0}")]
    NotARepository(PathBuf),

    #[error("repository already initialized at {0}")]
    AlreadyInitialized(PathBuf),

    #[error("malformed object: {0}")]
    MalformedObject(String),

    #[error("object not found: {0}")]
    ObjectNotFound(Hash),

    #[error("corrupt object: payload does not hash to {0}")]
    CorruptObject(Hash),

    #[error("ref not found: {0}")]
    RefNotFound(String),

    #[error("symbolic ref cycle starting at {0}")]
    RefCycle(String),

    #[error("ref update conflict on {name}: expected {expected:?}, found {actual:?}")]
    RefUpdateConflict {
        name: String,
        expected: Option<Hash>,
        actual: Option<Hash>,
    },

    #[error("ref is locked by another updater: {0}")]
    LockContention(String),

    #[error("invalid ref name: {0}")]
    InvalidRef(String),

    #[error("path not found in tree: {0}")]
    PathNotFound(String),

    #[error("object {hash} is a {found}, expected {expected}")]
    UnexpectedKind {
        hash: Hash,
        expected: Kind,
        found: Kind,
    },

    #[error("invalid hash hex: {0}")]
    InvalidHashHex(String),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("config serialization error: {0}")]
    ConfigSerialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// helper to wrap io errors with path context
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::io::Result<T> {
    fn with_path(self, path: impl Into<PathBuf>) -> Result<T> {
        self.map_err(|source| Error::Io {
            path: path.into(),
            source,
        })
    }
}
