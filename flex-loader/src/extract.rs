//! Archive extraction capability and the zip implementation.

use std::fs::{self, File};
use std::io::{self, Read, Seek};
use std::path::Path;

use tracing::debug;
use zip::ZipArchive;

use crate::config::LoaderConfig;
use crate::error::ExtractionError;
use crate::source::SourceRef;

/// Counters reported by a successful extraction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExtractStats {
    pub files: usize,
    pub directories: usize,
    pub bytes: u64,
}

/// Unpacks an archive into a directory.
///
/// The destination already exists when this is called. Implementations must
/// not write outside of it.
pub trait ArchiveExtractor: Send + Sync {
    fn extract(&self, source: &SourceRef, dest: &Path) -> Result<ExtractStats, ExtractionError>;
}

/// Extracts zip containers (`.flex` files) with entry-count and size limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipExtractor {
    max_entries: usize,
    max_unpacked_bytes: u64,
}

impl Default for ZipExtractor {
    fn default() -> Self {
        Self::from_config(&LoaderConfig::default())
    }
}

impl ZipExtractor {
    pub fn new(max_entries: usize, max_unpacked_bytes: u64) -> Self {
        Self {
            max_entries,
            max_unpacked_bytes,
        }
    }

    pub fn from_config(config: &LoaderConfig) -> Self {
        Self::new(config.max_entries, config.max_unpacked_bytes)
    }

    /// Extracts from any seekable reader.
    pub fn extract_from<R: Read + Seek>(
        &self,
        reader: R,
        dest: &Path,
    ) -> Result<ExtractStats, ExtractionError> {
        let mut archive = ZipArchive::new(reader)?;
        if archive.len() > self.max_entries {
            return Err(ExtractionError::TooManyEntries {
                limit: self.max_entries,
            });
        }

        let mut stats = ExtractStats::default();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let relative = entry
                .enclosed_name()
                .ok_or_else(|| ExtractionError::UnsafeEntry(entry.name().to_string()))?;
            let target = dest.join(relative);

            if entry.is_dir() {
                fs::create_dir_all(&target)?;
                stats.directories += 1;
                continue;
            }

            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out = File::create(&target)?;
            let budget = self.max_unpacked_bytes - stats.bytes;
            let written = io::copy(&mut (&mut entry).take(budget.saturating_add(1)), &mut out)?;
            stats.bytes += written;
            if stats.bytes > self.max_unpacked_bytes {
                return Err(ExtractionError::TooLarge {
                    limit: self.max_unpacked_bytes,
                });
            }
            stats.files += 1;
        }

        debug!(
            files = stats.files,
            directories = stats.directories,
            bytes = stats.bytes,
            "Archive extracted to {:?}",
            dest
        );
        Ok(stats)
    }
}

impl ArchiveExtractor for ZipExtractor {
    fn extract(&self, source: &SourceRef, dest: &Path) -> Result<ExtractStats, ExtractionError> {
        self.extract_from(source.open()?, dest)
    }
}
