//! Extension manifest (extension.json) within a flex package.

use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{ExtensionConfig, ExtensionKind};
use crate::{Author, SchemaError};

/// Name of the manifest entry at the root of every flex archive. Case sensitive.
pub const MANIFEST_FILE_NAME: &str = "extension.json";

static EXTENSION_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*$")
        .expect("extension id pattern is valid")
});

/// Returns true if `id` is a package-name-like token (e.g. `org.example.layout.qwerty`).
pub fn is_valid_extension_id(id: &str) -> bool {
    EXTENSION_ID_PATTERN.is_match(id)
}

/// Immutable metadata of an extension package.
///
/// Constructed only through [`ExtensionMeta::parse`], deserialization or
/// [`crate::MutableExtension::freeze`], all of which run the same mandatory
/// field checks. There is no way to mutate a value after construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    try_from = "RawManifest",
    bound(serialize = "C: Serialize", deserialize = "C: DeserializeOwned")
)]
pub struct ExtensionMeta<C> {
    pub(crate) id: String,
    pub(crate) version: String,
    /// Recommended limit: 50 characters. Not enforced.
    pub(crate) title: String,
    /// Recommended limit: 80 characters. Not enforced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) homepage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) issue_tracker: Option<String>,
    pub(crate) authors: Vec<Author>,
    /// SPDX license expression, stored verbatim.
    pub(crate) license: String,
    #[serde(rename = "dependsOn", skip_serializing_if = "Vec::is_empty")]
    pub(crate) dependencies: Vec<String>,
    pub(crate) config: C,
}

/// Manifest as it appears on the wire, before mandatory-field checks.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
#[doc(hidden)]
pub struct RawManifest {
    id: Option<String>,
    version: Option<String>,
    title: Option<String>,
    description: Option<String>,
    keywords: Option<Vec<String>>,
    homepage: Option<String>,
    issue_tracker: Option<String>,
    authors: Option<Vec<String>>,
    license: Option<String>,
    #[serde(rename = "dependsOn", alias = "dependencies")]
    dependencies: Option<Vec<String>>,
    config: Option<serde_json::Value>,
}

impl<C: DeserializeOwned> ExtensionMeta<C> {
    /// Parses and validates a manifest document.
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        let raw: RawManifest = serde_json::from_str(text)?;
        Self::try_from(raw)
    }

    /// Parses a manifest from raw bytes (as read from an archive entry).
    pub fn parse_slice(bytes: &[u8]) -> Result<Self, SchemaError> {
        let raw: RawManifest = serde_json::from_slice(bytes)?;
        Self::try_from(raw)
    }
}

impl<C: Serialize> ExtensionMeta<C> {
    /// Serializes back to the manifest document format.
    pub fn to_json_pretty(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<C> ExtensionMeta<C> {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn keywords(&self) -> Option<&[String]> {
        self.keywords.as_deref()
    }

    pub fn homepage(&self) -> Option<&str> {
        self.homepage.as_deref()
    }

    pub fn issue_tracker(&self) -> Option<&str> {
        self.issue_tracker.as_deref()
    }

    pub fn authors(&self) -> &[Author] {
        &self.authors
    }

    pub fn license(&self) -> &str {
        &self.license
    }

    /// Ids of the extensions this package requires. Empty when the manifest omits them.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    pub fn depends_on(&self, id: &str) -> bool {
        self.dependencies.iter().any(|dep| dep == id)
    }

    pub fn config(&self) -> &C {
        &self.config
    }

    pub fn into_config(self) -> C {
        self.config
    }
}

impl<C: ExtensionConfig> ExtensionMeta<C> {
    pub fn kind(&self) -> ExtensionKind {
        C::KIND
    }
}

impl<C: DeserializeOwned> TryFrom<RawManifest> for ExtensionMeta<C> {
    type Error = SchemaError;

    fn try_from(raw: RawManifest) -> Result<Self, Self::Error> {
        let id = raw.id.ok_or(SchemaError::MissingField("id"))?;
        let version = raw.version.ok_or(SchemaError::MissingField("version"))?;
        let title = raw.title.ok_or(SchemaError::MissingField("title"))?;
        let license = raw.license.ok_or(SchemaError::MissingField("license"))?;
        let authors = raw
            .authors
            .filter(|a| !a.is_empty())
            .ok_or(SchemaError::MissingField("authors"))?;
        let config = raw
            .config
            .filter(|c| !c.is_null())
            .ok_or(SchemaError::MissingField("config"))?;

        validate_id(&id)?;
        let authors = parse_authors(&authors)?;
        let config = serde_json::from_value(config).map_err(SchemaError::InvalidConfig)?;

        Ok(Self {
            id,
            version,
            title,
            description: raw.description,
            keywords: raw.keywords,
            homepage: raw.homepage,
            issue_tracker: raw.issue_tracker,
            authors,
            license,
            dependencies: raw.dependencies.unwrap_or_default(),
            config,
        })
    }
}

pub(crate) fn validate_id(id: &str) -> Result<(), SchemaError> {
    if is_valid_extension_id(id) {
        Ok(())
    } else {
        Err(SchemaError::InvalidId(id.to_string()))
    }
}

pub(crate) fn parse_authors(entries: &[String]) -> Result<Vec<Author>, SchemaError> {
    entries.iter().map(|entry| Author::parse(entry)).collect()
}
