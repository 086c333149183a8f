//! Uninstall plan computation
//!
//! Builds a tree of uninstall actions for an extension, cascading to every
//! installed extension that depends on it (its backward dependencies),
//! across one namespace or all of them. Dependents are always placed as
//! children of the node for the extension they depend on, so the
//! depth-first flattening in [`crate::plan::Plan::actions`] removes them
//! before their dependency.
//!
//! The same extension can appear in more than one cascade branch; no
//! deduplication is attempted here. The executor treats a second uninstall
//! of an already-removed extension as a benign no-op.

use brokkr_core::error::{Error, Result};
use brokkr_core::types::{ExtensionId, InstalledExtension, Namespace};
use tracing::info;

use crate::handler::HandlerRegistry;
use crate::plan::{Plan, PlanAction, PlanNode};
use crate::progress::ProgressTracker;
use crate::repository::InstalledExtensionRepository;
use crate::request::ExtensionRequest;

/// Recursive builder of uninstall plan trees
pub struct UninstallPlanBuilder<'a> {
    installed: &'a dyn InstalledExtensionRepository,
    handlers: &'a HandlerRegistry,
    progress: &'a ProgressTracker,
    request: &'a ExtensionRequest,
}

impl<'a> UninstallPlanBuilder<'a> {
    /// Create a builder over the given collaborators
    pub fn new(
        installed: &'a dyn InstalledExtensionRepository,
        handlers: &'a HandlerRegistry,
        progress: &'a ProgressTracker,
        request: &'a ExtensionRequest,
    ) -> Self {
        Self {
            installed,
            handlers,
            progress,
            request,
        }
    }

    /// Compute the full plan for the builder's request: one cascade per
    /// requested extension, over the request's target namespaces
    pub fn plan(&self) -> Result<Plan> {
        let namespaces = self.request.target_namespaces();
        let mut tree = Vec::new();

        let scope = self.progress.push_level(self.request.extensions.len());
        for id in &self.request.extensions {
            self.uninstall(id, &namespaces, &mut tree)?;
            scope.step();
        }
        drop(scope);

        Ok(Plan::new(self.request.clone(), tree))
    }

    /// Plan the uninstall of an extension identity from each of the given
    /// namespaces, appending one node per namespace to `parent_branch`
    pub fn uninstall(
        &self,
        id: &ExtensionId,
        namespaces: &[Namespace],
        parent_branch: &mut Vec<PlanNode>,
    ) -> Result<()> {
        let scope = self.progress.push_level(namespaces.len());
        for namespace in namespaces {
            self.uninstall_id_in(id, namespace, parent_branch)?;
            scope.step();
        }
        Ok(())
    }

    /// Plan the uninstall of an already-resolved installed extension from
    /// each of the given namespaces
    pub fn uninstall_installed(
        &self,
        installed: &InstalledExtension,
        namespaces: &[Namespace],
        parent_branch: &mut Vec<PlanNode>,
    ) -> Result<()> {
        let scope = self.progress.push_level(namespaces.len());
        for namespace in namespaces {
            self.uninstall_one(installed, namespace, parent_branch)?;
            scope.step();
        }
        Ok(())
    }

    /// Plan the uninstall of a whole cohort of installed extensions from a
    /// single namespace; used for backward dependents
    pub fn uninstall_each(
        &self,
        extensions: &[InstalledExtension],
        namespace: &Namespace,
        parent_branch: &mut Vec<PlanNode>,
    ) -> Result<()> {
        let scope = self.progress.push_level(extensions.len());
        for extension in extensions {
            self.uninstall_one(extension, namespace, parent_branch)?;
            scope.step();
        }
        Ok(())
    }

    fn uninstall_id_in(
        &self,
        id: &ExtensionId,
        namespace: &Namespace,
        parent_branch: &mut Vec<PlanNode>,
    ) -> Result<()> {
        let installed = self
            .installed
            .installed_extension(id, namespace)
            .ok_or_else(|| Error::not_installed(id.clone()))?;

        self.uninstall_one(&installed, namespace, parent_branch)
    }

    /// Plan the uninstall of one installed extension from one namespace:
    /// verify the namespace, check the handler's policy, recurse into
    /// backward dependents, then append the node
    pub fn uninstall_one(
        &self,
        installed: &InstalledExtension,
        namespace: &Namespace,
        parent_branch: &mut Vec<PlanNode>,
    ) -> Result<()> {
        if let Namespace::Scoped(name) = namespace {
            if !installed.lists_namespace(name) {
                return Err(Error::not_installed_in_namespace(
                    installed.id().clone(),
                    name.clone(),
                ));
            }
        }

        // Is the type supported?
        let handler = self.handlers.get(&installed.extension.type_tag)?;

        // Is uninstalling this extension allowed? A denial propagates
        // unchanged.
        handler.check_uninstall(installed, namespace, self.request)?;

        if self.request.verbose {
            match namespace {
                Namespace::Scoped(name) => info!(
                    extension = %installed.id(),
                    namespace = %name,
                    "resolving extension from namespace"
                ),
                Namespace::All => info!(extension = %installed.id(), "resolving extension"),
            }
        }

        let scope = self.progress.push_level(2);

        // Plan the uninstall of backward dependents first; they become the
        // children of this extension's node.
        let mut children = Vec::new();
        match namespace {
            Namespace::Scoped(name) => {
                let dependents = self
                    .installed
                    .backward_dependencies(installed.id(), name)
                    .map_err(|e| {
                        Error::dependency_resolution_failed(installed.id().clone(), e)
                    })?;
                if !dependents.is_empty() {
                    self.uninstall_each(&dependents, namespace, &mut children)?;
                }
            }
            Namespace::All => {
                self.uninstall_backward_dependencies(installed, &mut children)?;
            }
        }

        scope.step();

        let action = PlanAction::uninstall(installed.clone(), namespace.clone());
        parent_branch.push(PlanNode::new(action, children));

        Ok(())
    }

    /// Plan the uninstall of every backward dependent of an extension
    /// across all namespaces, one cohort per namespace group
    fn uninstall_backward_dependencies(
        &self,
        installed: &InstalledExtension,
        parent_branch: &mut Vec<PlanNode>,
    ) -> Result<()> {
        let by_namespace = self
            .installed
            .backward_dependencies_all(installed.id())
            .map_err(|e| Error::dependency_resolution_failed(installed.id().clone(), e))?;

        let scope = self.progress.push_level(by_namespace.len());
        for (namespace, dependents) in &by_namespace {
            self.uninstall_each(dependents, &Namespace::scoped(namespace), parent_branch)?;
            scope.step();
        }

        Ok(())
    }
}
