//! Plan execution
//!
//! Applies an ordered sequence of plan actions against the live
//! installed-extension registry, one action at a time. Execution is
//! fail-fast: the first failing action aborts the remaining sequence, and
//! already-applied actions are not rolled back. The one deliberate
//! exception is the per-previous-version cleanup loop during an upgrade,
//! where individual deregistration failures are logged and swallowed so
//! the new version still gets registered.

use brokkr_core::error::{Error, Result};
use brokkr_core::types::{InstalledExtension, LocalExtension, Namespace};
use tracing::{debug, error, info};

use crate::events::{EventEnvelope, EventNotifier, ExtensionEvent};
use crate::handler::HandlerRegistry;
use crate::plan::{ActionKind, PlanAction};
use crate::progress::ProgressTracker;
use crate::repository::{InstalledExtensionRepository, LocalExtensionRepository};
use crate::request::ExtensionRequest;

/// Applies computed plan actions against the registry
pub struct PlanExecutor<'a> {
    local: &'a dyn LocalExtensionRepository,
    installed: &'a dyn InstalledExtensionRepository,
    handlers: &'a HandlerRegistry,
    notifier: &'a dyn EventNotifier,
    progress: &'a ProgressTracker,
    request: &'a ExtensionRequest,
}

impl<'a> PlanExecutor<'a> {
    /// Create an executor over the given collaborators
    pub fn new(
        local: &'a dyn LocalExtensionRepository,
        installed: &'a dyn InstalledExtensionRepository,
        handlers: &'a HandlerRegistry,
        notifier: &'a dyn EventNotifier,
        progress: &'a ProgressTracker,
        request: &'a ExtensionRequest,
    ) -> Self {
        Self {
            local,
            installed,
            handlers,
            notifier,
            progress,
            request,
        }
    }

    /// Apply each action in input order. `None` actions are skipped but
    /// still counted for progress. The first failure propagates
    /// immediately; earlier actions stay applied.
    pub fn apply_actions<'b>(
        &self,
        actions: impl IntoIterator<Item = &'b PlanAction>,
    ) -> Result<()> {
        let actions: Vec<&PlanAction> = actions.into_iter().collect();
        let scope = self.progress.push_level(actions.len());

        for action in actions {
            if action.kind() != ActionKind::None {
                self.apply_action(action)?;
            }
            scope.step();
        }

        Ok(())
    }

    /// Apply one action, with begin/success/failure logging around it
    pub fn apply_action(&self, action: &PlanAction) -> Result<()> {
        let kind = action.kind();
        let id = action.id().clone();

        match action.namespace() {
            Namespace::Scoped(name) => info!(
                action = %kind,
                extension = %id,
                namespace = %name,
                "applying extension action"
            ),
            Namespace::All => info!(
                action = %kind,
                extension = %id,
                "applying extension action on all namespaces"
            ),
        }

        let scope = self.progress.push_level(2);
        let result = self.perform(action, &scope);
        drop(scope);

        match &result {
            Ok(()) => match action.namespace() {
                Namespace::Scoped(name) => info!(
                    action = %kind,
                    extension = %id,
                    namespace = %name,
                    "successfully applied extension action"
                ),
                Namespace::All => info!(
                    action = %kind,
                    extension = %id,
                    "successfully applied extension action on all namespaces"
                ),
            },
            Err(e) => match action.namespace() {
                Namespace::Scoped(name) => error!(
                    action = %kind,
                    extension = %id,
                    namespace = %name,
                    error = %e,
                    "failed to apply extension action"
                ),
                Namespace::All => error!(
                    action = %kind,
                    extension = %id,
                    error = %e,
                    "failed to apply extension action on all namespaces"
                ),
            },
        }

        result
    }

    fn perform(&self, action: &PlanAction, scope: &crate::progress::ProgressScope) -> Result<()> {
        match action {
            PlanAction::None { .. } => Ok(()),
            PlanAction::Uninstall {
                installed,
                namespace,
            } => {
                // Placeholder step for parity with the install branch's
                // resolve step.
                scope.step();
                self.uninstall_extension(installed, namespace)
            }
            PlanAction::Install {
                extension,
                namespace,
                dependency,
            } => {
                let local = self.local.resolve(&extension.id)?;
                scope.step();
                self.install_extension(&local, &[], namespace, *dependency)
            }
            PlanAction::Upgrade {
                extension,
                previous,
                namespace,
                dependency,
            } => {
                let local = self.local.resolve(&extension.id)?;
                scope.step();
                self.install_extension(&local, previous, namespace, *dependency)
            }
        }
    }

    /// Remove one installed extension from one namespace. The cascade to
    /// dependents is already baked into the plan; this is the leaf.
    fn uninstall_extension(
        &self,
        installed: &InstalledExtension,
        namespace: &Namespace,
    ) -> Result<()> {
        // The same extension can be planned in more than one cascade
        // branch. If an earlier action already removed it, this one is a
        // benign no-op.
        if self
            .installed
            .installed_extension(installed.id(), namespace)
            .is_none()
        {
            debug!(
                extension = %installed.id(),
                namespace = %namespace,
                "extension already uninstalled, skipping"
            );
            return Ok(());
        }

        let handler = self.handlers.get(&installed.extension.type_tag)?;

        // Unload the extension.
        handler
            .uninstall(installed, namespace, self.request)
            .map_err(|e| Error::uninstall_failed(installed.id().clone(), e))?;

        // Deregister it.
        self.installed.uninstall_extension(installed, namespace)?;

        self.emit(ExtensionEvent::Uninstalled {
            id: installed.id().clone(),
            namespace: namespace.clone(),
            removed: installed.clone(),
        });

        Ok(())
    }

    /// Install or upgrade a resolved extension. An empty `previous` set
    /// means a fresh install; otherwise the previous versions are replaced
    /// in place.
    fn install_extension(
        &self,
        extension: &LocalExtension,
        previous: &[InstalledExtension],
        namespace: &Namespace,
        dependency: bool,
    ) -> Result<()> {
        if previous.is_empty() {
            let handler = self.handlers.get(&extension.extension.type_tag)?;
            handler
                .install(extension, namespace, self.request)
                .map_err(|e| Error::install_failed(extension.id().clone(), e))?;

            let installed = self
                .installed
                .install_extension(extension, namespace, dependency)?;

            self.emit(ExtensionEvent::Installed {
                installed,
                namespace: namespace.clone(),
            });
        } else {
            let handler = self.handlers.get(&extension.extension.type_tag)?;
            handler
                .upgrade(previous, extension, namespace, self.request)
                .map_err(|e| Error::install_failed(extension.id().clone(), e))?;

            // Cleanup of the replaced versions must not abort the upgrade:
            // a record that fails to deregister is logged, reported on the
            // event, and left behind.
            let mut orphaned = Vec::new();
            for previous_extension in previous {
                if let Err(e) = self
                    .installed
                    .uninstall_extension(previous_extension, namespace)
                {
                    error!(
                        extension = %previous_extension.id(),
                        error = %e,
                        "failed to deregister previous version during upgrade"
                    );
                    orphaned.push(previous_extension.id().clone());
                }
            }

            let installed = self
                .installed
                .install_extension(extension, namespace, dependency)?;

            self.emit(ExtensionEvent::Upgraded {
                installed,
                previous: previous.to_vec(),
                orphaned,
                namespace: namespace.clone(),
            });
        }

        Ok(())
    }

    fn emit(&self, event: ExtensionEvent) {
        self.notifier.notify(&EventEnvelope::new(event));
    }
}
