//! Error types for brokkr-core

use thiserror::Error;

use crate::types::ExtensionId;

/// Result type alias using brokkr-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause kept on wrapping error variants.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core error taxonomy for extension lifecycle operations
#[derive(Error, Debug)]
pub enum Error {
    /// The extension could not be fetched into local storage
    #[error("Failed to resolve extension [{id}]")]
    ResolveFailed {
        id: ExtensionId,
        #[source]
        source: Option<BoxedError>,
    },

    /// No handler is registered for the extension's declared type
    #[error("Unsupported extension type [{type_tag}]")]
    UnsupportedType { type_tag: String },

    /// An uninstall was requested for an extension with no installed record
    #[error("Extension [{id}] is not installed")]
    NotInstalled { id: ExtensionId },

    /// The extension is installed, but not in the requested namespace
    #[error("Extension [{id}] is not installed on namespace [{namespace}]")]
    NotInstalledInNamespace { id: ExtensionId, namespace: String },

    /// A handler vetoed the uninstall
    #[error("Uninstalling extension [{id}] is not allowed: {reason}")]
    PermissionDenied { id: ExtensionId, reason: String },

    /// The handler or registry call failed during install or upgrade
    #[error("Failed to install extension [{id}]")]
    InstallFailed {
        id: ExtensionId,
        #[source]
        source: BoxedError,
    },

    /// The handler or registry call failed during uninstall
    #[error("Failed to uninstall extension [{id}]")]
    UninstallFailed {
        id: ExtensionId,
        #[source]
        source: Option<BoxedError>,
    },

    /// Resolving backward dependencies during cascade planning failed
    #[error("Failed to resolve backward dependencies of extension [{id}]")]
    DependencyResolutionFailed {
        id: ExtensionId,
        #[source]
        source: BoxedError,
    },

    /// Invalid semver version
    #[error("Invalid version format: {version}")]
    InvalidVersion { version: String },
}

impl Error {
    /// Create a resolve failure with a chained cause
    pub fn resolve_failed(id: ExtensionId, source: impl Into<BoxedError>) -> Self {
        Self::ResolveFailed {
            id,
            source: Some(source.into()),
        }
    }

    /// Create an unsupported type error
    pub fn unsupported_type(type_tag: impl Into<String>) -> Self {
        Self::UnsupportedType {
            type_tag: type_tag.into(),
        }
    }

    /// Create a not installed error
    pub fn not_installed(id: ExtensionId) -> Self {
        Self::NotInstalled { id }
    }

    /// Create a not installed in namespace error
    pub fn not_installed_in_namespace(id: ExtensionId, namespace: impl Into<String>) -> Self {
        Self::NotInstalledInNamespace {
            id,
            namespace: namespace.into(),
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(id: ExtensionId, reason: impl Into<String>) -> Self {
        Self::PermissionDenied {
            id,
            reason: reason.into(),
        }
    }

    /// Create an install failure with a chained cause
    pub fn install_failed(id: ExtensionId, source: impl Into<BoxedError>) -> Self {
        Self::InstallFailed {
            id,
            source: source.into(),
        }
    }

    /// Create an uninstall failure with a chained cause
    pub fn uninstall_failed(id: ExtensionId, source: impl Into<BoxedError>) -> Self {
        Self::UninstallFailed {
            id,
            source: Some(source.into()),
        }
    }

    /// Create an uninstall failure without a cause
    pub fn uninstall_failed_bare(id: ExtensionId) -> Self {
        Self::UninstallFailed { id, source: None }
    }

    /// Create a dependency resolution failure with a chained cause
    pub fn dependency_resolution_failed(id: ExtensionId, source: impl Into<BoxedError>) -> Self {
        Self::DependencyResolutionFailed {
            id,
            source: source.into(),
        }
    }

    /// Create an invalid version error
    pub fn invalid_version(version: impl Into<String>) -> Self {
        Self::InvalidVersion {
            version: version.into(),
        }
    }
}
