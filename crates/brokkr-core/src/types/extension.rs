//! Extension identity and record types
//!
//! An extension moves through three representations during its lifecycle:
//! a plain [`Extension`] descriptor, a [`LocalExtension`] once it has been
//! fetched into local storage, and an [`InstalledExtension`] once it is
//! registered in the installed-extension registry. The records are created
//! and destroyed by the repository collaborators; the planner and executor
//! only read them.

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Globally unique identity of an extension release (name + version)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExtensionId {
    /// Extension name (lowercase, hyphens allowed)
    pub name: String,

    /// Semantic version of the release
    pub version: Version,
}

impl ExtensionId {
    /// Create an identity from a name and an already-parsed version
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }

    /// Parse an identity from a name and a version string
    pub fn parse(name: impl Into<String>, version: &str) -> Result<Self> {
        let version =
            Version::parse(version).map_err(|_| Error::invalid_version(version.to_string()))?;
        Ok(Self::new(name, version))
    }
}

impl fmt::Display for ExtensionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.version)
    }
}

/// An installable unit of functionality
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extension {
    /// Release identity
    pub id: ExtensionId,

    /// Declared type tag, used to select the handler responsible for the
    /// physical install/uninstall effect
    pub type_tag: String,

    /// Names of extensions this one declares a dependency on
    #[serde(default)]
    pub dependencies: Vec<String>,
}

impl Extension {
    /// Create an extension descriptor with no dependencies
    pub fn new(id: ExtensionId, type_tag: impl Into<String>) -> Self {
        Self {
            id,
            type_tag: type_tag.into(),
            dependencies: Vec::new(),
        }
    }

    /// Declare a dependency on another extension
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }
}

/// An extension resolved into local storage, ready to be installed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalExtension {
    /// The resolved extension descriptor
    pub extension: Extension,

    /// Where the resolved artifact lives, when the repository is file backed
    #[serde(default)]
    pub location: Option<PathBuf>,
}

impl LocalExtension {
    /// Wrap a descriptor without a storage location
    pub fn new(extension: Extension) -> Self {
        Self {
            extension,
            location: None,
        }
    }

    /// Release identity of the resolved extension
    pub fn id(&self) -> &ExtensionId {
        &self.extension.id
    }
}

/// An extension currently registered as installed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstalledExtension {
    /// The installed extension descriptor
    pub extension: Extension,

    /// Concrete namespaces the extension is installed into, or `None` when
    /// it is installed on all namespaces
    #[serde(default)]
    pub namespaces: Option<BTreeSet<String>>,

    /// Whether it was installed as a dependency of another extension
    #[serde(default)]
    pub dependency: bool,

    /// When the extension was registered
    pub installed_at: DateTime<Utc>,
}

impl InstalledExtension {
    /// Create a record installed on all namespaces
    pub fn on_all_namespaces(extension: Extension, dependency: bool) -> Self {
        Self {
            extension,
            namespaces: None,
            dependency,
            installed_at: Utc::now(),
        }
    }

    /// Create a record installed on the given concrete namespaces
    pub fn on_namespaces(
        extension: Extension,
        namespaces: impl IntoIterator<Item = String>,
        dependency: bool,
    ) -> Self {
        Self {
            extension,
            namespaces: Some(namespaces.into_iter().collect()),
            dependency,
            installed_at: Utc::now(),
        }
    }

    /// Release identity of the installed extension
    pub fn id(&self) -> &ExtensionId {
        &self.extension.id
    }

    /// Whether the record explicitly lists the given concrete namespace.
    ///
    /// A record installed on all namespaces lists no concrete namespace, so
    /// it cannot be uninstalled from a single one.
    pub fn lists_namespace(&self, namespace: &str) -> bool {
        self.namespaces
            .as_ref()
            .is_some_and(|set| set.contains(namespace))
    }
}
