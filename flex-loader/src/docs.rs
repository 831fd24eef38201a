//! Conventional documentation files shipped at the root of a package.
//!
//! Matching is case-insensitive on the file stem and ignores the extension:
//! - `README`
//! - `CHANGES` / `CHANGELOG` / `HISTORY`
//! - `LICENSE` / `LICENSES`
//!
//! When several files match the same kind, the first in lexicographic order wins.

use std::io;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocKind {
    Readme,
    Changelog,
    License,
}

impl DocKind {
    /// Classifies a root-level file name.
    pub fn classify(file_name: &str) -> Option<Self> {
        let stem = file_name.split('.').next().unwrap_or(file_name);
        match stem.to_ascii_uppercase().as_str() {
            "README" => Some(Self::Readme),
            "CHANGES" | "CHANGELOG" | "HISTORY" => Some(Self::Changelog),
            "LICENSE" | "LICENSES" => Some(Self::License),
            _ => None,
        }
    }
}

/// Names of the documentation files found in a package, relative to its root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionDocs {
    pub readme: Option<String>,
    pub changelog: Option<String>,
    pub license: Option<String>,
}

impl ExtensionDocs {
    /// Picks documentation files from a listing of package entry names.
    /// Entries below the root are ignored.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut root_files: Vec<String> = names
            .into_iter()
            .map(|n| n.as_ref().to_string())
            .filter(|n| !n.is_empty() && !n.contains('/'))
            .collect();
        root_files.sort();

        let mut docs = Self::default();
        for name in root_files {
            let slot = match DocKind::classify(&name) {
                Some(DocKind::Readme) => &mut docs.readme,
                Some(DocKind::Changelog) => &mut docs.changelog,
                Some(DocKind::License) => &mut docs.license,
                None => continue,
            };
            if slot.is_none() {
                *slot = Some(name);
            }
        }
        docs
    }

    /// Scans the root of a materialized working directory.
    pub fn discover(dir: &Path) -> io::Result<Self> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(Self::from_names(names))
    }

    pub fn get(&self, kind: DocKind) -> Option<&str> {
        match kind {
            DocKind::Readme => self.readme.as_deref(),
            DocKind::Changelog => self.changelog.as_deref(),
            DocKind::License => self.license.as_deref(),
        }
    }
}
