//! Per-type extension handlers
//!
//! A handler performs the physical effect of an install, upgrade or
//! uninstall for one extension type (copying files, loading code,
//! registering components). Concrete handlers live outside this crate;
//! callers register them in a [`HandlerRegistry`] keyed by the type tag an
//! extension declares.

use brokkr_core::error::{Error, Result};
use brokkr_core::types::{InstalledExtension, LocalExtension, Namespace};
use std::collections::HashMap;
use std::sync::Arc;

use crate::request::ExtensionRequest;

/// Physical install/upgrade/uninstall operations for one extension type
pub trait ExtensionHandler: Send + Sync {
    /// Perform the physical install of a resolved extension
    fn install(
        &self,
        extension: &LocalExtension,
        namespace: &Namespace,
        request: &ExtensionRequest,
    ) -> Result<()>;

    /// Perform the physical upgrade, replacing all previous versions at
    /// once
    fn upgrade(
        &self,
        previous: &[InstalledExtension],
        extension: &LocalExtension,
        namespace: &Namespace,
        request: &ExtensionRequest,
    ) -> Result<()>;

    /// Perform the physical removal of an installed extension
    fn uninstall(
        &self,
        extension: &InstalledExtension,
        namespace: &Namespace,
        request: &ExtensionRequest,
    ) -> Result<()>;

    /// Policy check: may this extension be uninstalled in this namespace
    /// for this request? Denial fails without performing any effect.
    fn check_uninstall(
        &self,
        _extension: &InstalledExtension,
        _namespace: &Namespace,
        _request: &ExtensionRequest,
    ) -> Result<()> {
        Ok(())
    }
}

impl std::fmt::Debug for dyn ExtensionHandler + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("dyn ExtensionHandler")
    }
}

/// Registry mapping an extension's declared type tag to its handler
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Arc<dyn ExtensionHandler>>,
}

impl HandlerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the handler for a type tag, replacing any previous one
    pub fn register(&mut self, type_tag: impl Into<String>, handler: Arc<dyn ExtensionHandler>) {
        self.handlers.insert(type_tag.into(), handler);
    }

    /// Look up the handler for a type tag
    pub fn get(&self, type_tag: &str) -> Result<&dyn ExtensionHandler> {
        self.handlers
            .get(type_tag)
            .map(|handler| handler.as_ref())
            .ok_or_else(|| Error::unsupported_type(type_tag))
    }

    /// Whether a handler is registered for the type tag
    pub fn supports(&self, type_tag: &str) -> bool {
        self.handlers.contains_key(type_tag)
    }
}
