use std::path::Path;

/// Per-kind behaviour around materialization of an extension.
///
/// Implement this for kinds that need to act on the working directory, e.g.
/// to index extracted files or register resources. All methods default to
/// doing nothing. The `cache_dir` passed to the before-load hook does not
/// exist yet.
pub trait LifecycleHooks: Send + Sync {
    fn on_before_load(&self, cache_dir: &Path) {
        let _ = cache_dir;
    }

    fn on_after_load(&self, cache_dir: &Path) {
        let _ = cache_dir;
    }

    fn on_before_unload(&self, cache_dir: &Path) {
        let _ = cache_dir;
    }

    fn on_after_unload(&self, cache_dir: &Path) {
        let _ = cache_dir;
    }
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NoHooks;

impl LifecycleHooks for NoHooks {}
