//! Flex extension package loader.
//!
//! A `.flex` file is a zip archive containing:
//! - `extension.json`  — package metadata (see [`flex_meta::ExtensionMeta`])
//! - `README*`         — optional documentation
//! - `CHANGES*` / `CHANGELOG*` / `HISTORY*` — optional change history
//! - `LICENSE*` / `LICENSES*` — optional license text
//! - any kind-specific content (layouts, themes, dictionaries)
//!
//! Loading an [`Extension`] extracts its archive into `<cache root>/<id>`,
//! running the kind's [`LifecycleHooks`] around the extraction. Unloading
//! removes that directory again. All lifecycle operations are synchronous;
//! the `*_detached` variants move them onto tokio's blocking pool.
//!
//! The cache root is passed explicitly to every call. Loads and unloads of
//! one extension id are serialized by the [`Materializer`] they go through.

mod archive;
mod cache;
mod config;
mod docs;
mod error;
mod extension;
mod extract;
mod hooks;
mod materializer;
mod source;

pub use archive::{FlexArchive, PackageBuilder};
pub use cache::CacheRoot;
pub use config::LoaderConfig;
pub use docs::{DocKind, ExtensionDocs};
pub use error::{ArchiveError, ConfigError, ExtractionError, LoadError};
pub use extension::{Extension, LifecycleState};
pub use extract::{ArchiveExtractor, ExtractStats, ZipExtractor};
pub use hooks::{LifecycleHooks, NoHooks};
pub use materializer::{LoadOutcome, Materializer};
pub use source::{SourceReader, SourceRef};

pub use flex_meta;
