//! Interface shared between the jitcc host and the modules it compiles.
//!
//! Compiled modules are plain C (or `extern "C"` C++) shared objects. They see
//! the host through [`HostApi`], receive per-call framing through
//! [`InvocationContext`], and hand back objects laid out as [`RawInvokable`].
//! On the Rust side every object, native or in-process, is driven through the
//! [`Invokable`] trait.
//!
//! The matching C declarations live in [`C_HEADER`].

mod context;
mod foreign;
mod host;
mod invokable;
mod status;

pub use context::InvocationContext;
pub use foreign::{EntryPointFn, FactoryFn, ForeignInvokable, RawInvokable, RawInvokableVTable};
pub use host::{HostApi, LEVEL_WARNINGS, MessageFn, MessageLevel};
pub use invokable::{BuiltinFactory, CreateError, Factory, Invokable};
pub use status::Status;

/// ABI revision written into [`HostApi::abi_version`].
pub const ABI_VERSION: u32 = 1;

/// Upper bound on output slots for a single invocation.
pub const MAX_OUTPUTS: usize = 40;

/// C declarations for module authors.
pub const C_HEADER: &str = include_str!("../include/jitcc.h");
