//! Mutable staging form of a manifest, used by authoring flows.

use crate::manifest::{parse_authors, validate_id};
use crate::{ExtensionMeta, SchemaError};

/// Editable mirror of [`ExtensionMeta`].
///
/// Every field starts out empty. Nothing is validated until [`freeze`](Self::freeze),
/// where empty mandatory strings count as missing and optional strings that
/// are empty become absent.
#[derive(Debug, Clone, PartialEq)]
pub struct MutableExtension<C> {
    pub id: String,
    pub version: String,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub homepage: String,
    pub issue_tracker: String,
    pub authors: Vec<String>,
    pub license: String,
    pub dependencies: Vec<String>,
    pub config: Option<C>,
}

impl<C> Default for MutableExtension<C> {
    fn default() -> Self {
        Self {
            id: String::new(),
            version: String::new(),
            title: String::new(),
            description: String::new(),
            keywords: Vec::new(),
            homepage: String::new(),
            issue_tracker: String::new(),
            authors: Vec::new(),
            license: String::new(),
            dependencies: Vec::new(),
            config: None,
        }
    }
}

impl<C> MutableExtension<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produces the immutable metadata, running the same checks as manifest parsing.
    pub fn freeze(self) -> Result<ExtensionMeta<C>, SchemaError> {
        let id = required(self.id, "id")?;
        let version = required(self.version, "version")?;
        let title = required(self.title, "title")?;
        let license = required(self.license, "license")?;
        if self.authors.is_empty() {
            return Err(SchemaError::MissingField("authors"));
        }
        let config = self.config.ok_or(SchemaError::MissingField("config"))?;

        validate_id(&id)?;
        let authors = parse_authors(&self.authors)?;

        Ok(ExtensionMeta {
            id,
            version,
            title,
            description: optional(self.description),
            keywords: (!self.keywords.is_empty()).then_some(self.keywords),
            homepage: optional(self.homepage),
            issue_tracker: optional(self.issue_tracker),
            authors,
            license,
            dependencies: self.dependencies,
            config,
        })
    }
}

impl<C: Clone> From<&ExtensionMeta<C>> for MutableExtension<C> {
    fn from(meta: &ExtensionMeta<C>) -> Self {
        Self {
            id: meta.id.clone(),
            version: meta.version.clone(),
            title: meta.title.clone(),
            description: meta.description.clone().unwrap_or_default(),
            keywords: meta.keywords.clone().unwrap_or_default(),
            homepage: meta.homepage.clone().unwrap_or_default(),
            issue_tracker: meta.issue_tracker.clone().unwrap_or_default(),
            authors: meta.authors.iter().map(ToString::to_string).collect(),
            license: meta.license.clone(),
            dependencies: meta.dependencies.clone(),
            config: Some(meta.config.clone()),
        }
    }
}

fn required(value: String, field: &'static str) -> Result<String, SchemaError> {
    if value.trim().is_empty() {
        Err(SchemaError::MissingField(field))
    } else {
        Ok(value)
    }
}

fn optional(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
