//! Extension lifecycle events
//!
//! The executor emits one event per completed registry mutation. Emission
//! is fire and forget: a notifier must never fail or block plan progress.

use brokkr_core::types::{ExtensionId, InstalledExtension, Namespace};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain events emitted after a registry mutation completes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtensionEvent {
    /// A fresh install was registered
    Installed {
        installed: InstalledExtension,
        namespace: Namespace,
    },

    /// An upgrade was registered.
    ///
    /// `orphaned` names the previous versions whose deregistration failed
    /// during cleanup; empty on a clean upgrade.
    Upgraded {
        installed: InstalledExtension,
        previous: Vec<InstalledExtension>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        orphaned: Vec<ExtensionId>,
        namespace: Namespace,
    },

    /// An installed extension was deregistered
    Uninstalled {
        id: ExtensionId,
        namespace: Namespace,
        removed: InstalledExtension,
    },
}

impl ExtensionEvent {
    /// Release identity of the extension the event concerns
    pub fn extension_id(&self) -> &ExtensionId {
        match self {
            Self::Installed { installed, .. } | Self::Upgraded { installed, .. } => installed.id(),
            Self::Uninstalled { id, .. } => id,
        }
    }

    /// The namespace the event applies to
    pub fn namespace(&self) -> &Namespace {
        match self {
            Self::Installed { namespace, .. }
            | Self::Upgraded { namespace, .. }
            | Self::Uninstalled { namespace, .. } => namespace,
        }
    }
}

/// Event metadata envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID (UUID v4)
    pub event_id: String,

    /// Event timestamp (UTC)
    pub timestamp: DateTime<Utc>,

    /// The actual event payload
    pub event: ExtensionEvent,
}

impl EventEnvelope {
    /// Wrap an event with a fresh id and timestamp
    pub fn new(event: ExtensionEvent) -> Self {
        Self {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Fire-and-forget emission of lifecycle events to external subscribers
pub trait EventNotifier: Send + Sync {
    /// Deliver one event. Subscriber failures must stay inside the
    /// implementation; emission never reports an error to the executor.
    fn notify(&self, event: &EventEnvelope);
}

/// Notifier that drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl EventNotifier for NullNotifier {
    fn notify(&self, _event: &EventEnvelope) {}
}
