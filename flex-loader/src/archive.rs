//! Reading and writing `.flex` archives without materializing them.

use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read, Seek, Write};
use std::path::Path;

use flex_meta::{ExtensionMeta, MANIFEST_FILE_NAME};
use serde::Serialize;
use serde::de::DeserializeOwned;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::config::LoaderConfig;
use crate::docs::{DocKind, ExtensionDocs};
use crate::error::{ArchiveError, ExtractionError};

/// An opened flex archive. Only the manifest and the root documentation
/// files are read into memory; other entries are listed by name.
#[derive(Debug, Clone)]
pub struct FlexArchive {
    manifest: Vec<u8>,
    names: BTreeSet<String>,
    docs: ExtensionDocs,
    doc_files: BTreeMap<String, Vec<u8>>,
}

impl FlexArchive {
    /// Opens an archive with the default [`LoaderConfig`] limits.
    /// Fails if `extension.json` is not present at the root.
    pub fn open<R: Read + Seek>(reader: R) -> Result<Self, ArchiveError> {
        Self::open_with_config(reader, &LoaderConfig::default())
    }

    /// Opens an archive, enforcing `max_entries` and `max_unpacked_bytes`.
    ///
    /// The size limit applies both to the sizes declared in the archive
    /// directory and to the bytes actually inflated while reading.
    pub fn open_with_config<R: Read + Seek>(
        reader: R,
        config: &LoaderConfig,
    ) -> Result<Self, ArchiveError> {
        let mut archive = ZipArchive::new(reader)?;
        if archive.len() > config.max_entries {
            return Err(ExtractionError::TooManyEntries {
                limit: config.max_entries,
            }
            .into());
        }

        let mut names = BTreeSet::new();
        let mut declared = 0u64;
        for i in 0..archive.len() {
            let entry = archive.by_index_raw(i)?;
            declared = declared.saturating_add(entry.size());
            if !entry.is_dir() {
                names.insert(entry.name().to_string());
            }
        }
        if declared > config.max_unpacked_bytes {
            return Err(too_large(config));
        }
        if !names.contains(MANIFEST_FILE_NAME) {
            return Err(ArchiveError::MissingEntry(MANIFEST_FILE_NAME.into()));
        }

        let docs = ExtensionDocs::from_names(&names);
        let mut budget = config.max_unpacked_bytes;
        let manifest = read_bounded(&mut archive, MANIFEST_FILE_NAME, &mut budget, config)?;
        let mut doc_files = BTreeMap::new();
        for name in [&docs.readme, &docs.changelog, &docs.license].into_iter().flatten() {
            let data = read_bounded(&mut archive, name, &mut budget, config)?;
            doc_files.insert(name.clone(), data);
        }

        Ok(Self {
            manifest,
            names,
            docs,
            doc_files,
        })
    }

    /// Opens an archive file on disk with the default limits.
    pub fn open_path(path: &Path) -> Result<Self, ArchiveError> {
        Self::open(std::fs::File::open(path)?)
    }

    /// Parses the manifest for the expected config kind.
    pub fn meta<C: DeserializeOwned>(&self) -> Result<ExtensionMeta<C>, ArchiveError> {
        Ok(ExtensionMeta::parse_slice(&self.manifest)?)
    }

    pub fn manifest_bytes(&self) -> &[u8] {
        &self.manifest
    }

    pub fn docs(&self) -> &ExtensionDocs {
        &self.docs
    }

    /// Text of a documentation file, if present and valid UTF-8.
    pub fn doc_text(&self, kind: DocKind) -> Option<&str> {
        let name = self.docs.get(kind)?;
        let data = self.doc_files.get(name)?;
        std::str::from_utf8(data).ok()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Names of all file entries, in lexicographic order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

fn too_large(config: &LoaderConfig) -> ArchiveError {
    ExtractionError::TooLarge {
        limit: config.max_unpacked_bytes,
    }
    .into()
}

/// Reads one entry, charging its inflated size against `budget`.
fn read_bounded<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    budget: &mut u64,
    config: &LoaderConfig,
) -> Result<Vec<u8>, ArchiveError> {
    let entry = archive.by_name(name)?;
    let mut data = Vec::new();
    let read = entry.take(budget.saturating_add(1)).read_to_end(&mut data)? as u64;
    if read > *budget {
        return Err(too_large(config));
    }
    *budget -= read;
    Ok(data)
}

/// Fluent builder for creating flex archives.
pub struct PackageBuilder {
    manifest: String,
    files: BTreeMap<String, Vec<u8>>,
}

impl PackageBuilder {
    pub fn new<C: Serialize>(meta: &ExtensionMeta<C>) -> Result<Self, ArchiveError> {
        Ok(Self::from_manifest_text(meta.to_json_pretty()?))
    }

    /// Starts from a manifest document that is written as-is, without validation.
    pub fn from_manifest_text(manifest: impl Into<String>) -> Self {
        Self {
            manifest: manifest.into(),
            files: BTreeMap::new(),
        }
    }

    pub fn readme(self, data: Vec<u8>) -> Self {
        self.add_file("README.md", data)
    }

    pub fn license(self, data: Vec<u8>) -> Self {
        self.add_file("LICENSE", data)
    }

    pub fn changelog(self, data: Vec<u8>) -> Self {
        self.add_file("CHANGELOG.md", data)
    }

    /// Adds a file at `name` (relative, `/`-separated). A file named
    /// `extension.json` replaces the manifest.
    pub fn add_file(mut self, name: &str, data: Vec<u8>) -> Self {
        if name == MANIFEST_FILE_NAME {
            self.manifest = String::from_utf8_lossy(&data).into_owned();
        } else {
            self.files.insert(name.to_string(), data);
        }
        self
    }

    /// Builds the zip archive and returns the raw bytes.
    /// The manifest is written first, the other files in name order.
    pub fn build(self) -> Result<Vec<u8>, ArchiveError> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file(MANIFEST_FILE_NAME, options)?;
        zip.write_all(self.manifest.as_bytes())?;

        for (name, data) in &self.files {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(data)?;
        }

        Ok(zip.finish()?.into_inner())
    }

    /// Builds the archive and writes it to `path`.
    pub fn write_to(self, path: &Path) -> Result<(), ArchiveError> {
        let bytes = self.build()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}
