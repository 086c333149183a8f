//! Extension lifecycle planning and execution for Brokkr
//!
//! This crate handles:
//! - Uninstall plan computation with cascading backward-dependency removal
//! - Transactional-ish application of computed plans (install, upgrade,
//!   uninstall) against the installed-extension registry
//! - Hierarchical progress reporting
//! - Lifecycle event emission
//!
//! Storage, per-type handlers and the surrounding job runtime are external
//! collaborators; this crate only defines their contracts.

pub mod events;
pub mod executor;
pub mod handler;
pub mod plan;
pub mod planner;
pub mod progress;
pub mod repository;
pub mod request;

pub use events::{EventEnvelope, EventNotifier, ExtensionEvent, NullNotifier};
pub use executor::PlanExecutor;
pub use handler::{ExtensionHandler, HandlerRegistry};
pub use plan::{ActionKind, Plan, PlanAction, PlanNode};
pub use planner::UninstallPlanBuilder;
pub use progress::{ProgressListener, ProgressScope, ProgressTracker};
pub use repository::{InstalledExtensionRepository, LocalExtensionRepository};
pub use request::ExtensionRequest;
