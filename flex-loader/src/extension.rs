//! Runtime representation of an extension and its load/unload lifecycle.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

use flex_meta::ExtensionMeta;
use serde::de::DeserializeOwned;

use crate::archive::FlexArchive;
use crate::cache::CacheRoot;
use crate::config::LoaderConfig;
use crate::error::{ArchiveError, LoadError};
use crate::extract::ArchiveExtractor;
use crate::hooks::{LifecycleHooks, NoHooks};
use crate::materializer::{LoadOutcome, Materializer};
use crate::source::SourceRef;

/// Lifecycle position of an [`Extension`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    #[default]
    Unloaded,
    Loading,
    Loaded,
    Unloading,
}

/// An extension: parsed metadata, an optional backing archive and the hooks
/// of its kind.
///
/// The working directory is never stored. It is derived from the id and the
/// cache root passed to each call.
pub struct Extension<C, H = NoHooks> {
    meta: ExtensionMeta<C>,
    source: Option<SourceRef>,
    hooks: H,
    state: Mutex<LifecycleState>,
}

impl<C> Extension<C, NoHooks> {
    pub fn new(meta: ExtensionMeta<C>, source: Option<SourceRef>) -> Self {
        Self::with_hooks(meta, source, NoHooks)
    }
}

impl<C: DeserializeOwned, H: LifecycleHooks> Extension<C, H> {
    /// Reads the manifest out of the archive at `source` and keeps `source`
    /// as the backing archive. Uses the default archive limits.
    pub fn from_archive(source: SourceRef, hooks: H) -> Result<Self, ArchiveError> {
        Self::from_archive_with_config(source, hooks, &LoaderConfig::default())
    }

    /// Like [`Extension::from_archive`], with the entry and size limits of `config`.
    pub fn from_archive_with_config(
        source: SourceRef,
        hooks: H,
        config: &LoaderConfig,
    ) -> Result<Self, ArchiveError> {
        let archive = FlexArchive::open_with_config(source.open()?, config)?;
        let meta = archive.meta()?;
        Ok(Self::with_hooks(meta, Some(source), hooks))
    }
}

impl<C, H: LifecycleHooks> Extension<C, H> {
    pub fn with_hooks(meta: ExtensionMeta<C>, source: Option<SourceRef>, hooks: H) -> Self {
        Self {
            meta,
            source,
            hooks,
            state: Mutex::new(LifecycleState::Unloaded),
        }
    }

    pub fn meta(&self) -> &ExtensionMeta<C> {
        &self.meta
    }

    pub fn id(&self) -> &str {
        self.meta.id()
    }

    pub fn dependencies(&self) -> &[String] {
        self.meta.dependencies()
    }

    pub fn source(&self) -> Option<&SourceRef> {
        self.source.as_ref()
    }

    pub fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn working_dir(&self, cache_root: &CacheRoot) -> PathBuf {
        cache_root.working_dir(self.id())
    }

    /// Materializes the backing archive into `<cache_root>/<id>`.
    ///
    /// Without `force`, an existing working directory is kept when the
    /// extension has no source or its stamp matches the source digest (see
    /// [`crate::LoaderConfig::reuse_verified`]). Otherwise the directory is
    /// removed and the archive extracted again between the before/after load
    /// hooks. On extraction failure the after-load hook is skipped.
    pub fn load<X: ArchiveExtractor>(
        &self,
        materializer: &Materializer<X>,
        cache_root: &CacheRoot,
        force: bool,
    ) -> Result<LoadOutcome, LoadError> {
        materializer.with_id_lock(self.id(), || {
            let _reset = StateReset::new(&self.state, LifecycleState::Unloaded);
            self.set_state(LifecycleState::Loading);
            let result = materializer.materialize(
                self.id(),
                self.source.as_ref(),
                &self.hooks,
                cache_root,
                force,
            );
            self.set_state(match &result {
                Ok(_) => LifecycleState::Loaded,
                Err(_) => LifecycleState::Unloaded,
            });
            result
        })
    }

    /// Removes `<cache_root>/<id>` between the before/after unload hooks.
    /// Does nothing, hooks included, if the directory does not exist.
    pub fn unload<X: ArchiveExtractor>(
        &self,
        materializer: &Materializer<X>,
        cache_root: &CacheRoot,
    ) -> Result<(), LoadError> {
        materializer.with_id_lock(self.id(), || {
            let previous = self.state();
            let _reset = StateReset::new(&self.state, previous);
            self.set_state(LifecycleState::Unloading);
            match materializer.dematerialize(self.id(), &self.hooks, cache_root) {
                Ok(_) => {
                    self.set_state(LifecycleState::Unloaded);
                    Ok(())
                }
                Err(e) => {
                    self.set_state(previous);
                    Err(e)
                }
            }
        })
    }

    fn set_state(&self, state: LifecycleState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = state;
    }
}

/// Puts the lifecycle state back to `on_unwind` if a hook panics mid-operation.
struct StateReset<'a> {
    state: &'a Mutex<LifecycleState>,
    on_unwind: LifecycleState,
}

impl<'a> StateReset<'a> {
    fn new(state: &'a Mutex<LifecycleState>, on_unwind: LifecycleState) -> Self {
        Self { state, on_unwind }
    }
}

impl Drop for StateReset<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            *self.state.lock().unwrap_or_else(PoisonError::into_inner) = self.on_unwind;
        }
    }
}

impl<C, H> Extension<C, H>
where
    C: Send + Sync + 'static,
    H: LifecycleHooks + 'static,
{
    /// Runs [`Extension::load`] on the blocking thread pool.
    pub async fn load_detached<X: ArchiveExtractor + 'static>(
        self: Arc<Self>,
        materializer: Arc<Materializer<X>>,
        cache_root: CacheRoot,
        force: bool,
    ) -> Result<LoadOutcome, LoadError> {
        tokio::task::spawn_blocking(move || self.load(&materializer, &cache_root, force))
            .await
            .map_err(|e| LoadError::TaskFailed(e.to_string()))?
    }

    /// Runs [`Extension::unload`] on the blocking thread pool.
    pub async fn unload_detached<X: ArchiveExtractor + 'static>(
        self: Arc<Self>,
        materializer: Arc<Materializer<X>>,
        cache_root: CacheRoot,
    ) -> Result<(), LoadError> {
        tokio::task::spawn_blocking(move || self.unload(&materializer, &cache_root))
            .await
            .map_err(|e| LoadError::TaskFailed(e.to_string()))?
    }
}

impl<C: std::fmt::Debug, H> std::fmt::Debug for Extension<C, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extension")
            .field("meta", &self.meta)
            .field("source", &self.source)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
