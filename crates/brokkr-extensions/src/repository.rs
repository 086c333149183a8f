//! Repository collaborator contracts
//!
//! Concrete storage of local and installed extension metadata (file system,
//! database, in-memory) lives outside this crate. The planner and executor
//! only call these operations and react to their declared outcomes; any
//! blocking I/O and any concurrency arbitration happens inside the
//! implementation.

use brokkr_core::error::Result;
use brokkr_core::types::{ExtensionId, InstalledExtension, LocalExtension, Namespace};
use std::collections::BTreeMap;

/// Store of extensions fetched into local storage
pub trait LocalExtensionRepository: Send + Sync {
    /// Fetch the extension into local storage, returning its local record.
    /// Fails with [`brokkr_core::Error::ResolveFailed`].
    fn resolve(&self, id: &ExtensionId) -> Result<LocalExtension>;
}

/// Registry of currently installed extensions
pub trait InstalledExtensionRepository: Send + Sync {
    /// Register a resolved extension as installed in the given namespace,
    /// recording whether it was installed as a dependency. Fails with
    /// [`brokkr_core::Error::InstallFailed`].
    fn install_extension(
        &self,
        extension: &LocalExtension,
        namespace: &Namespace,
        dependency: bool,
    ) -> Result<InstalledExtension>;

    /// Deregister an installed extension from the given namespace. Fails
    /// with [`brokkr_core::Error::UninstallFailed`].
    fn uninstall_extension(
        &self,
        extension: &InstalledExtension,
        namespace: &Namespace,
    ) -> Result<()>;

    /// The installed record for (id, namespace), or `None` when the
    /// extension is not installed there
    fn installed_extension(
        &self,
        id: &ExtensionId,
        namespace: &Namespace,
    ) -> Option<InstalledExtension>;

    /// The installed extensions declaring a dependency on `id` within one
    /// concrete namespace
    fn backward_dependencies(
        &self,
        id: &ExtensionId,
        namespace: &str,
    ) -> Result<Vec<InstalledExtension>>;

    /// The installed extensions declaring a dependency on `id`, grouped by
    /// namespace, across all namespaces
    fn backward_dependencies_all(
        &self,
        id: &ExtensionId,
    ) -> Result<BTreeMap<String, Vec<InstalledExtension>>>;
}
