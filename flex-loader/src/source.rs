//! Locators for the archive backing an extension.

use std::convert::Infallible;
use std::fmt;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::ExtractionError;

/// Where an extension's original flex archive lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceRef {
    /// A file on disk.
    Path(PathBuf),
    /// An archive already held in memory (bundled assets, downloads).
    Bytes(Arc<[u8]>),
}

impl SourceRef {
    pub fn path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Opens the archive for reading.
    pub fn open(&self) -> Result<SourceReader, ExtractionError> {
        match self {
            Self::Path(path) => match File::open(path) {
                Ok(file) => Ok(SourceReader::File(file)),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    Err(ExtractionError::SourceNotFound(path.clone()))
                }
                Err(e) => Err(e.into()),
            },
            Self::Bytes(bytes) => Ok(SourceReader::Memory(Cursor::new(Arc::clone(bytes)))),
        }
    }

    /// Hex-encoded SHA-256 over the raw archive bytes.
    pub fn digest(&self) -> Result<String, ExtractionError> {
        let mut hasher = Sha256::new();
        let mut reader = self.open()?;
        io::copy(&mut reader, &mut hasher)?;
        Ok(hex::encode(hasher.finalize()))
    }
}

impl From<PathBuf> for SourceRef {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&Path> for SourceRef {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for SourceRef {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes.into())
    }
}

/// Accepts plain paths and `file://` URIs.
impl FromStr for SourceRef {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = s.strip_prefix("file://").unwrap_or(s);
        Ok(Self::Path(PathBuf::from(path)))
    }
}

impl fmt::Display for SourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Bytes(bytes) => write!(f, "<memory: {} bytes>", bytes.len()),
        }
    }
}

/// Reader over a resolved [`SourceRef`].
pub enum SourceReader {
    File(File),
    Memory(Cursor<Arc<[u8]>>),
}

impl Read for SourceReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::File(file) => file.read(buf),
            Self::Memory(cursor) => cursor.read(buf),
        }
    }
}

impl Seek for SourceReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match self {
            Self::File(file) => file.seek(pos),
            Self::Memory(cursor) => cursor.seek(pos),
        }
    }
}
