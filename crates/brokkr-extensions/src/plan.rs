//! Plan data model
//!
//! A plan is an ordered forest of [`PlanNode`]s computed before any effect
//! is applied. Nodes are appended while a plan is being built and never
//! removed or reordered; once the owning job completes the plan is handed
//! off as a read-only artifact.

use brokkr_core::types::{Extension, ExtensionId, InstalledExtension, Namespace};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::request::ExtensionRequest;

/// The kind of effect a plan action applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Nothing to do; skipped by the executor but still counted for progress
    None,
    /// Fresh install of an extension not previously present
    Install,
    /// In-place replacement of one or more previous versions
    Upgrade,
    /// Removal of an installed extension
    Uninstall,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::None => "none",
            Self::Install => "install",
            Self::Upgrade => "upgrade",
            Self::Uninstall => "uninstall",
        };
        f.write_str(label)
    }
}

/// One planned effect against the installed-extension registry.
///
/// An uninstall action structurally carries the installed record it removes,
/// so the executor never has to guess what kind of extension it holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlanAction {
    None {
        extension: Extension,
        namespace: Namespace,
    },
    Install {
        extension: Extension,
        namespace: Namespace,
        dependency: bool,
    },
    Upgrade {
        extension: Extension,
        previous: Vec<InstalledExtension>,
        namespace: Namespace,
        dependency: bool,
    },
    Uninstall {
        installed: InstalledExtension,
        namespace: Namespace,
    },
}

impl PlanAction {
    /// Plan a fresh install
    pub fn install(extension: Extension, namespace: Namespace, dependency: bool) -> Self {
        Self::Install {
            extension,
            namespace,
            dependency,
        }
    }

    /// Plan an upgrade replacing the given previous versions
    pub fn upgrade(
        extension: Extension,
        previous: Vec<InstalledExtension>,
        namespace: Namespace,
        dependency: bool,
    ) -> Self {
        Self::Upgrade {
            extension,
            previous,
            namespace,
            dependency,
        }
    }

    /// Plan the removal of an installed extension
    pub fn uninstall(installed: InstalledExtension, namespace: Namespace) -> Self {
        Self::Uninstall {
            installed,
            namespace,
        }
    }

    /// Plan a no-op placeholder for an extension
    pub fn none(extension: Extension, namespace: Namespace) -> Self {
        Self::None {
            extension,
            namespace,
        }
    }

    /// The kind of effect this action applies
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::None { .. } => ActionKind::None,
            Self::Install { .. } => ActionKind::Install,
            Self::Upgrade { .. } => ActionKind::Upgrade,
            Self::Uninstall { .. } => ActionKind::Uninstall,
        }
    }

    /// The target extension descriptor
    pub fn extension(&self) -> &Extension {
        match self {
            Self::None { extension, .. }
            | Self::Install { extension, .. }
            | Self::Upgrade { extension, .. } => extension,
            Self::Uninstall { installed, .. } => &installed.extension,
        }
    }

    /// Release identity of the target extension
    pub fn id(&self) -> &ExtensionId {
        &self.extension().id
    }

    /// The namespace the action applies to
    pub fn namespace(&self) -> &Namespace {
        match self {
            Self::None { namespace, .. }
            | Self::Install { namespace, .. }
            | Self::Upgrade { namespace, .. }
            | Self::Uninstall { namespace, .. } => namespace,
        }
    }

    /// The versions this action replaces: empty for a fresh install, the
    /// replaced versions for an upgrade, the removed record itself for an
    /// uninstall
    pub fn previous_extensions(&self) -> &[InstalledExtension] {
        match self {
            Self::None { .. } | Self::Install { .. } => &[],
            Self::Upgrade { previous, .. } => previous,
            Self::Uninstall { installed, .. } => std::slice::from_ref(installed),
        }
    }

    /// Whether the action was introduced because something else depends on
    /// its target, rather than requested directly
    pub fn is_dependency(&self) -> bool {
        match self {
            Self::Install { dependency, .. } | Self::Upgrade { dependency, .. } => *dependency,
            Self::None { .. } | Self::Uninstall { .. } => false,
        }
    }
}

/// A tree node wrapping one action plus the actions that must be considered
/// together with it (for an uninstall: the backward dependents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanNode {
    action: PlanAction,
    children: Vec<PlanNode>,
}

impl PlanNode {
    /// Create a node with the given children
    pub fn new(action: PlanAction, children: Vec<PlanNode>) -> Self {
        Self { action, children }
    }

    /// Create a leaf node
    pub fn leaf(action: PlanAction) -> Self {
        Self::new(action, Vec::new())
    }

    /// The node's own action
    pub fn action(&self) -> &PlanAction {
        &self.action
    }

    /// The dependents/dependencies processed as part of this node
    pub fn children(&self) -> &[PlanNode] {
        &self.children
    }
}

/// The result of a planning job: an ordered forest of top-level nodes plus
/// the originating request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    request: ExtensionRequest,
    tree: Vec<PlanNode>,
}

impl Plan {
    /// Finalize a computed tree into an immutable plan
    pub fn new(request: ExtensionRequest, tree: Vec<PlanNode>) -> Self {
        Self { request, tree }
    }

    /// The request that produced this plan
    pub fn request(&self) -> &ExtensionRequest {
        &self.request
    }

    /// The top-level nodes
    pub fn tree(&self) -> &[PlanNode] {
        &self.tree
    }

    /// Flatten the tree depth first, children before their parent, so that
    /// dependents come out before the dependency they rely on. This is the
    /// ordering the executor expects its input in.
    pub fn actions(&self) -> Vec<&PlanAction> {
        fn visit<'a>(node: &'a PlanNode, out: &mut Vec<&'a PlanAction>) {
            for child in node.children() {
                visit(child, out);
            }
            out.push(node.action());
        }

        let mut out = Vec::new();
        for node in &self.tree {
            visit(node, &mut out);
        }
        out
    }
}
