//! Author entries in the `Name <email> (url)` format.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::SchemaError;

static AUTHOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\s*(?P<name>[^<>()]*?)",
        r"\s*(?:<(?P<email>[^<>()]*)>)?",
        r"\s*(?:\((?P<url>[^<>()]*)\))?\s*$",
    ))
    .expect("author pattern is valid")
});

/// A single author of an extension or one of its components.
///
/// The name is required. Email and url are optional, but when both are
/// present the email must come first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Author {
    name: String,
    email: Option<String>,
    url: Option<String>,
}

impl Author {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            url: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Parses an author entry, rejecting anything that does not follow
    /// `Name [<email>] [(url)]`.
    pub fn parse(entry: &str) -> Result<Self, SchemaError> {
        let malformed = || SchemaError::MalformedAuthor(entry.to_string());
        let caps = AUTHOR_PATTERN.captures(entry).ok_or_else(malformed)?;

        let name = caps.name("name").map_or("", |m| m.as_str());
        if name.is_empty() {
            return Err(malformed());
        }

        // `<>` and `()` are treated as malformed rather than silently dropped.
        let optional = |group: &str| -> Result<Option<String>, SchemaError> {
            match caps.name(group) {
                None => Ok(None),
                Some(m) => {
                    let value = m.as_str().trim();
                    if value.is_empty() {
                        Err(malformed())
                    } else {
                        Ok(Some(value.to_string()))
                    }
                }
            }
        };

        Ok(Self {
            name: name.to_string(),
            email: optional("email")?,
            url: optional("url")?,
        })
    }
}

impl fmt::Display for Author {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(email) = &self.email {
            write!(f, " <{email}>")?;
        }
        if let Some(url) = &self.url {
            write!(f, " ({url})")?;
        }
        Ok(())
    }
}

impl FromStr for Author {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Author {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Author> for String {
    fn from(author: Author) -> Self {
        author.to_string()
    }
}
