//! # brokkr-core
//!
//! Core library for the Brokkr extension manager providing:
//! - Extension identity and record types
//! - Namespace scoping
//! - The error taxonomy shared by the planner and executor

pub mod error;
pub mod types;

pub use error::{BoxedError, Error, Result};
pub use types::{Extension, ExtensionId, InstalledExtension, LocalExtension, Namespace};
