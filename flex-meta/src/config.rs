//! Kind-specific `config` payloads carried by a manifest.
//!
//! The manifest schema itself is generic over the payload; callers pick the
//! concrete type for the kind of extension they expect.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::Author;

/// Discriminant for the kinds of extension the loader understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtensionKind {
    KeyboardLayout,
    Theme,
    Dictionary,
    /// Payload is kept as raw JSON.
    Generic,
}

/// A `config` payload type.
pub trait ExtensionConfig: Serialize + DeserializeOwned {
    const KIND: ExtensionKind;
}

/// One component shipped inside a package (a layout, a theme, a dictionary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentEntry {
    pub id: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authors: Vec<Author>,
    /// Path of the component file relative to the package root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyboardLayoutConfig {
    #[serde(default)]
    pub layouts: Vec<ComponentEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(default)]
    pub themes: Vec<ComponentEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryConfig {
    #[serde(default)]
    pub dictionaries: Vec<ComponentEntry>,
}

impl ExtensionConfig for KeyboardLayoutConfig {
    const KIND: ExtensionKind = ExtensionKind::KeyboardLayout;
}

impl ExtensionConfig for ThemeConfig {
    const KIND: ExtensionKind = ExtensionKind::Theme;
}

impl ExtensionConfig for DictionaryConfig {
    const KIND: ExtensionKind = ExtensionKind::Dictionary;
}

impl ExtensionConfig for serde_json::Value {
    const KIND: ExtensionKind = ExtensionKind::Generic;
}
