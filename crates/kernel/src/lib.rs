//! Settings, module contract and lifecycle registry shared by every Bookshelf crate.

pub mod module;
pub mod registry;
pub mod settings;

pub use module::{Access, InitCtx, Migration, Module};
pub use registry::ModuleRegistry;
