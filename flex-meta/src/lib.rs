//! Manifest schema for flex extension packages.
//!
//! A `.flex` file is a zip archive whose root carries an `extension.json`
//! manifest. The manifest describes the package identity, versioning,
//! authorship, declared dependencies and a kind-specific `config` payload:
//!
//! ```json
//! {
//!   "id": "org.example.layout.qwerty",
//!   "version": "1.0.0",
//!   "title": "QWERTY",
//!   "authors": ["Jane Doe <jane@example.com> (example.com)"],
//!   "license": "Apache-2.0",
//!   "dependsOn": ["org.example.layout.base"],
//!   "config": { "layouts": [] }
//! }
//! ```
//!
//! Parsed manifests are immutable [`ExtensionMeta`] values. Authoring flows
//! stage edits in a [`MutableExtension`] and freeze it when done.

mod author;
mod builder;
mod config;
mod error;
mod manifest;

pub use author::Author;
pub use builder::MutableExtension;
pub use config::{
    ComponentEntry, DictionaryConfig, ExtensionConfig, ExtensionKind, KeyboardLayoutConfig,
    ThemeConfig,
};
pub use error::SchemaError;
pub use manifest::{ExtensionMeta, MANIFEST_FILE_NAME, is_valid_extension_id};
