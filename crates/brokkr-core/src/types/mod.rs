//! Type definitions for extensions and namespaces

mod extension;
mod namespace;

pub use extension::{Extension, ExtensionId, InstalledExtension, LocalExtension};
pub use namespace::Namespace;
