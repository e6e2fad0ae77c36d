use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::error::{Error, IoResultExt, Result};
use crate::refs;

/// a loam repository: binds the object store and ref store to a root
///
/// all storage lives directly under the root: `objects/`, `refs/`, `HEAD`,
/// `config.toml`, `tmp/`. the repository performs no object-model logic
/// itself.
pub struct Repo {
    path: PathBuf,
    config: Config,
}

impl Repo {
    /// initialize a new repository at the given path
    ///
    /// fails with `AlreadyInitialized` if a repository marker exists there.
    pub fn init(path: &Path) -> Result<Self> {
        let config_path = path.join("config.toml");
        if config_path.exists() {
            return Err(Error::AlreadyInitialized(path.to_path_buf()));
        }

        std::fs::create_dir_all(path.join("objects")).with_path(path)?;
        std::fs::create_dir_all(path.join("refs/heads")).with_path(path)?;
        std::fs::create_dir_all(path.join("refs/tags")).with_path(path)?;
        std::fs::create_dir_all(path.join("tmp")).with_path(path)?;

        let config = Config::default();
        config.save(&config_path)?;

        let repo = Self {
            path: path.to_path_buf(),
            config,
        };

        // HEAD points at the default branch, which does not exist yet;
        // it springs into being on the first update
        let head_target = format!("refs/heads/{}", repo.config.default_branch);
        refs::write_symbolic_ref(&repo, "HEAD", &head_target)?;

        debug!(path = %repo.path.display(), "initialized repository");

        Ok(repo)
    }

    /// open an existing repository
    pub fn open(path: &Path) -> Result<Self> {
        let config_path = path.join("config.toml");
        if !is_repo(path) {
            return Err(Error::NotARepository(path.to_path_buf()));
        }

        let config = Config::load(&config_path)?;

        Ok(Self {
            path: path.to_path_buf(),
            config,
        })
    }

    /// discover a repository by searching upward from a start path
    ///
    /// fails with `NotARepository` if no ancestor holds a repository
    /// before the filesystem root.
    pub fn discover(start: &Path) -> Result<Self> {
        let start = start.canonicalize().with_path(start)?;

        let mut current = start.as_path();
        loop {
            if is_repo(current) {
                debug!(path = %current.display(), "discovered repository");
                return Self::open(current);
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return Err(Error::NotARepository(start)),
            }
        }
    }

    /// repository root path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// repository configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// path to config.toml
    pub fn config_path(&self) -> PathBuf {
        self.path.join("config.toml")
    }

    /// path to the bucketed object store
    pub fn objects_path(&self) -> PathBuf {
        self.path.join("objects")
    }

    /// path to the refs namespace
    pub fn refs_path(&self) -> PathBuf {
        self.path.join("refs")
    }

    /// path to branch refs
    pub fn heads_path(&self) -> PathBuf {
        self.path.join("refs/heads")
    }

    /// path to tag refs
    pub fn tags_path(&self) -> PathBuf {
        self.path.join("refs/tags")
    }

    /// path to tmp directory (for atomic writes)
    pub fn tmp_path(&self) -> PathBuf {
        self.path.join("tmp")
    }
}

/// marker check shared by open and discover
fn is_repo(path: &Path) -> bool {
    path.join("config.toml").is_file() && path.join("objects").is_dir()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::refs::RefValue;
    use tempfile::tempdir;

    #[test]
    fn test_repo_init() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("test-repo");

        let repo = Repo::init(&repo_path).unwrap();

        assert!(repo_path.join("objects").is_dir());
        assert!(repo_path.join("refs/heads").is_dir());
        assert!(repo_path.join("refs/tags").is_dir());
        assert!(repo_path.join("tmp").is_dir());
        assert!(repo_path.join("config.toml").is_file());
        assert!(repo_path.join("HEAD").is_file());

        assert_eq!(
            refs::read_ref(&repo, "HEAD").unwrap(),
            RefValue::Symbolic("refs/heads/main".to_string())
        );
    }

    #[test]
    fn test_repo_init_already_exists() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("test-repo");

        Repo::init(&repo_path).unwrap();
        let result = Repo::init(&repo_path);

        assert!(matches!(result, Err(Error::AlreadyInitialized(_))));
    }

    #[test]
    fn test_repo_open() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("test-repo");

        Repo::init(&repo_path).unwrap();
        let repo = Repo::open(&repo_path).unwrap();

        assert_eq!(repo.path(), repo_path);
        assert_eq!(repo.config().default_branch, "main");
    }

    #[test]
    fn test_repo_open_not_found() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("nonexistent");

        let result = Repo::open(&repo_path);
        assert!(matches!(result, Err(Error::NotARepository(_))));
    }

    #[test]
    fn test_repo_discover_from_nested_dir() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("test-repo");
        Repo::init(&repo_path).unwrap();

        let nested = repo_path.join("some/deep/worktree");
        std::fs::create_dir_all(&nested).unwrap();

        let repo = Repo::discover(&nested).unwrap();
        assert_eq!(repo.path(), repo_path.canonicalize().unwrap());
    }

    #[test]
    fn test_repo_discover_at_root() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("test-repo");
        Repo::init(&repo_path).unwrap();

        let repo = Repo::discover(&repo_path).unwrap();
        assert_eq!(repo.path(), repo_path.canonicalize().unwrap());
    }

    #[test]
    fn test_repo_discover_not_found() {
        let dir = tempdir().unwrap();
        let plain = dir.path().join("no-repo-here");
        std::fs::create_dir_all(&plain).unwrap();

        let result = Repo::discover(&plain);
        assert!(matches!(result, Err(Error::NotARepository(_))));
    }

    #[test]
    fn test_repo_paths() {
        let dir = tempdir().unwrap();
        let repo_path = dir.path().join("test-repo");
        let repo = Repo::init(&repo_path).unwrap();

        assert_eq!(repo.objects_path(), repo_path.join("objects"));
        assert_eq!(repo.heads_path(), repo_path.join("refs/heads"));
        assert_eq!(repo.tags_path(), repo_path.join("refs/tags"));
        assert_eq!(repo.tmp_path(), repo_path.join("tmp"));
    }
}
