//! Per-job request configuration
//!
//! A request names the extensions a job targets, the namespaces it applies
//! to, and tuning flags. It is assembled by the caller, passed by reference
//! into the planner and executor, and handed to every handler call so
//! handlers can consult job-level settings.

use brokkr_core::types::{ExtensionId, Namespace};
use serde::{Deserialize, Serialize};

/// Configuration for one planning or execution job
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionRequest {
    /// Extensions the job was asked to act on
    #[serde(default)]
    pub extensions: Vec<ExtensionId>,

    /// Namespaces the job applies to; empty means all namespaces
    #[serde(default)]
    pub namespaces: Vec<Namespace>,

    /// Emit per-extension resolution logs during planning
    #[serde(default)]
    pub verbose: bool,
}

impl ExtensionRequest {
    /// Create an empty request
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a target extension
    pub fn with_extension(mut self, id: ExtensionId) -> Self {
        self.extensions.push(id);
        self
    }

    /// Add a target namespace
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespaces.push(namespace);
        self
    }

    /// Enable or disable verbose planning logs
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Namespaces to iterate, falling back to the all-namespaces sentinel
    /// when the request names none
    pub fn target_namespaces(&self) -> Vec<Namespace> {
        if self.namespaces.is_empty() {
            vec![Namespace::All]
        } else {
            self.namespaces.clone()
        }
    }
}
