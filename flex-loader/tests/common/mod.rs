//! Shared test helpers for loader tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use flex_loader::flex_meta::{ExtensionMeta, KeyboardLayoutConfig, MutableExtension};
use flex_loader::{LifecycleHooks, PackageBuilder};

pub const LAYOUT_ID: &str = "org.example.layout.qwerty";

/// Metadata of a minimal keyboard layout package.
pub fn layout_meta(id: &str) -> ExtensionMeta<KeyboardLayoutConfig> {
    MutableExtension {
        id: id.into(),
        version: "1.0.0".into(),
        title: "QWERTY".into(),
        authors: vec!["Jane Doe <jane@example.com> (example.com)".into()],
        license: "Apache-2.0".into(),
        config: Some(KeyboardLayoutConfig::default()),
        ..MutableExtension::new()
    }
    .freeze()
    .expect("test manifest is valid")
}

/// A flex archive with a manifest, a README and two layout files.
pub fn layout_archive(id: &str) -> Vec<u8> {
    layout_archive_with(id, b"[\"q\",\"w\",\"e\"]")
}

pub fn layout_archive_with(id: &str, qwerty: &[u8]) -> Vec<u8> {
    PackageBuilder::new(&layout_meta(id))
        .expect("manifest serializes")
        .readme(b"# QWERTY".to_vec())
        .add_file("layouts/qwerty.json", qwerty.to_vec())
        .add_file("layouts/extra/azerty.json", b"[\"a\",\"z\"]".to_vec())
        .build()
        .expect("archive builds")
}

/// Relative paths of all files below `dir`, `/`-separated and sorted.
pub fn list_files(dir: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in std::fs::read_dir(dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let relative = path.strip_prefix(root).unwrap();
                let parts: Vec<_> = relative
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                out.push(parts.join("/"));
            }
        }
    }

    let mut out = Vec::new();
    walk(dir, dir, &mut out);
    out.sort();
    out
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookCall {
    BeforeLoad { dir_exists: bool },
    AfterLoad { files: Vec<String> },
    BeforeUnload { dir_exists: bool },
    AfterUnload { dir_exists: bool },
}

/// Hooks that record every call together with what they saw on disk.
#[derive(Debug, Default)]
pub struct RecordingHooks {
    calls: Mutex<Vec<(HookCall, PathBuf)>>,
}

impl RecordingHooks {
    pub fn calls(&self) -> Vec<HookCall> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    pub fn dirs(&self) -> Vec<PathBuf> {
        self.calls.lock().unwrap().iter().map(|(_, d)| d.clone()).collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: HookCall, dir: &Path) {
        self.calls.lock().unwrap().push((call, dir.to_path_buf()));
    }
}

impl LifecycleHooks for RecordingHooks {
    fn on_before_load(&self, cache_dir: &Path) {
        self.record(
            HookCall::BeforeLoad {
                dir_exists: cache_dir.exists(),
            },
            cache_dir,
        );
    }

    fn on_after_load(&self, cache_dir: &Path) {
        self.record(
            HookCall::AfterLoad {
                files: list_files(cache_dir),
            },
            cache_dir,
        );
    }

    fn on_before_unload(&self, cache_dir: &Path) {
        self.record(
            HookCall::BeforeUnload {
                dir_exists: cache_dir.exists(),
            },
            cache_dir,
        );
    }

    fn on_after_unload(&self, cache_dir: &Path) {
        self.record(
            HookCall::AfterUnload {
                dir_exists: cache_dir.exists(),
            },
            cache_dir,
        );
    }
}
