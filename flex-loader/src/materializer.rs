//! Materializes extension archives into their working directories.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::cache::CacheRoot;
use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::extract::{ArchiveExtractor, ExtractStats, ZipExtractor};
use crate::hooks::LifecycleHooks;
use crate::source::SourceRef;

/// What a successful load did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The archive was extracted into a fresh working directory.
    Extracted(ExtractStats),
    /// An existing working directory was kept as-is.
    Reused,
    /// The extension has no backing archive; nothing was extracted.
    NoSource,
}

/// Shared materialization machinery: the extraction capability, the loader
/// configuration and one lock per extension id.
///
/// Every load and unload of a given id runs under that id's lock, so all
/// `Extension` values sharing a materializer are serialized per id. Loads
/// through different materializers on the same cache root are not.
pub struct Materializer<X = ZipExtractor> {
    extractor: X,
    config: LoaderConfig,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl Materializer<ZipExtractor> {
    pub fn new(config: LoaderConfig) -> Self {
        Self::with_extractor(ZipExtractor::from_config(&config), config)
    }
}

impl Default for Materializer<ZipExtractor> {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl<X: ArchiveExtractor> Materializer<X> {
    pub fn with_extractor(extractor: X, config: LoaderConfig) -> Self {
        Self {
            extractor,
            config,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn extractor(&self) -> &X {
        &self.extractor
    }

    /// Runs `f` while holding the lock of `id`.
    ///
    /// The lock guards no data, so a lock poisoned by a panicking hook is
    /// taken over as-is. The table entry for `id` is dropped again once no
    /// other caller holds or waits for it.
    pub(crate) fn with_id_lock<T>(&self, id: &str, f: impl FnOnce() -> T) -> T {
        let lock = self.id_lock(id);
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };
        self.release_id_lock(id, lock);
        result
    }

    fn id_lock(&self, id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id.to_string()).or_default())
    }

    fn release_id_lock(&self, id: &str, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        drop(lock);
        if locks.get(id).is_some_and(|l| Arc::strong_count(l) == 1) {
            locks.remove(id);
        }
    }

    /// Number of ids with a live lock entry.
    pub fn tracked_ids(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Extracts `source` into `<cache_root>/<id>`. Caller holds the id lock.
    pub(crate) fn materialize<H: LifecycleHooks + ?Sized>(
        &self,
        id: &str,
        source: Option<&SourceRef>,
        hooks: &H,
        cache_root: &CacheRoot,
        force: bool,
    ) -> Result<LoadOutcome, LoadError> {
        let cache_dir = cache_root.working_dir(id);

        if cache_dir.exists() {
            if !force && self.can_reuse(id, source, cache_root) {
                debug!(extension_id = %id, "Keeping existing working directory {:?}", cache_dir);
                return Ok(LoadOutcome::Reused);
            }
            remove_working_dir(cache_root, id, &cache_dir)?;
        }

        let Some(source) = source else {
            debug!(extension_id = %id, "No source archive, nothing to extract");
            return Ok(LoadOutcome::NoSource);
        };

        hooks.on_before_load(&cache_dir);
        std::fs::create_dir_all(&cache_dir).map_err(|e| LoadError::io(&cache_dir, e))?;

        let stats = match self.extractor.extract(source, &cache_dir) {
            Ok(stats) => stats,
            Err(e) => {
                warn!(extension_id = %id, "Extraction of {} failed: {}", source, e);
                if self.config.cleanup_on_failure {
                    if let Err(cleanup) = std::fs::remove_dir_all(&cache_dir) {
                        warn!(
                            extension_id = %id,
                            "Failed to clean up partial extraction {:?}: {}", cache_dir, cleanup
                        );
                    }
                }
                return Err(LoadError::ExtractionFailed(e));
            }
        };

        if self.config.reuse_verified {
            write_stamp(cache_root, id, source);
        }

        hooks.on_after_load(&cache_dir);
        info!(
            extension_id = %id,
            files = stats.files,
            bytes = stats.bytes,
            "Extension materialized from {}", source
        );
        Ok(LoadOutcome::Extracted(stats))
    }

    /// Removes `<cache_root>/<id>`. Returns false if there was nothing to remove.
    /// Caller holds the id lock.
    pub(crate) fn dematerialize<H: LifecycleHooks + ?Sized>(
        &self,
        id: &str,
        hooks: &H,
        cache_root: &CacheRoot,
    ) -> Result<bool, LoadError> {
        let cache_dir = cache_root.working_dir(id);
        if !cache_dir.exists() {
            debug!(extension_id = %id, "No working directory, nothing to unload");
            return Ok(false);
        }

        hooks.on_before_unload(&cache_dir);
        remove_working_dir(cache_root, id, &cache_dir)?;
        hooks.on_after_unload(&cache_dir);
        info!(extension_id = %id, "Extension unloaded");
        Ok(true)
    }

    /// Whether an existing working directory may be kept. The source is
    /// only digested when a stamp exists to compare against.
    fn can_reuse(&self, id: &str, source: Option<&SourceRef>, cache_root: &CacheRoot) -> bool {
        if !self.config.reuse_verified {
            return false;
        }
        let Some(source) = source else {
            return true;
        };
        let Some(stamp) = cache_root.read_stamp(id) else {
            return false;
        };
        match source.digest() {
            Ok(digest) => digest == stamp,
            Err(e) => {
                debug!(extension_id = %id, "Cannot digest source {}: {}", source, e);
                false
            }
        }
    }
}

fn write_stamp(cache_root: &CacheRoot, id: &str, source: &SourceRef) {
    let written = source
        .digest()
        .map_err(|e| e.to_string())
        .and_then(|digest| cache_root.write_stamp(id, &digest).map_err(|e| e.to_string()));
    if let Err(e) = written {
        warn!(extension_id = %id, "Failed to write source stamp: {}", e);
    }
}

fn remove_working_dir(cache_root: &CacheRoot, id: &str, cache_dir: &Path) -> Result<(), LoadError> {
    std::fs::remove_dir_all(cache_dir).map_err(|e| LoadError::io(cache_dir, e))?;
    cache_root
        .remove_stamp(id)
        .map_err(|e| LoadError::io(cache_root.stamp_path(id), e))
}
