//! Application cache root under which extensions are materialized.

use std::io;
use std::path::{Path, PathBuf};

const STAMPS_DIR: &str = ".stamps";

/// Writable base directory scoped to the running application.
///
/// Each extension gets `<root>/<id>` as its working directory. Source digests
/// of materialized archives are kept in `<root>/.stamps/<id>`; extension ids
/// never start with a dot, so the two namespaces cannot collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheRoot {
    root: PathBuf,
}

impl CacheRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Working directory of the extension with the given id.
    pub fn working_dir(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    pub(crate) fn stamp_path(&self, id: &str) -> PathBuf {
        self.root.join(STAMPS_DIR).join(id)
    }

    pub(crate) fn read_stamp(&self, id: &str) -> Option<String> {
        std::fs::read_to_string(self.stamp_path(id))
            .ok()
            .map(|s| s.trim().to_string())
    }

    pub(crate) fn write_stamp(&self, id: &str, digest: &str) -> io::Result<()> {
        let path = self.stamp_path(id);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, digest)
    }

    pub(crate) fn remove_stamp(&self, id: &str) -> io::Result<()> {
        match std::fs::remove_file(self.stamp_path(id)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

impl From<PathBuf> for CacheRoot {
    fn from(root: PathBuf) -> Self {
        Self::new(root)
    }
}

impl From<&Path> for CacheRoot {
    fn from(root: &Path) -> Self {
        Self::new(root)
    }
}
