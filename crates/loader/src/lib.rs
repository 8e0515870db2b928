//! Loading compiled modules into the process and keeping track of them.
//!
//! * [`library`]: platform-neutral shared-object loading with optional global
//!   symbol visibility.
//! * [`module`]: a registered unit of code, compiled or in-process, that can be
//!   searched for entry points and factories.
//! * [`registry`]: the ordered, lock-protected list of every module loaded
//!   during the life of the process.

pub mod library;
pub mod module;
pub mod registry;

pub use library::{DynamicLibrary, LoadError, Visibility, library_extension};
pub use module::{BuiltinModule, Module};
pub use registry::{ModuleId, ModuleRegistry};
