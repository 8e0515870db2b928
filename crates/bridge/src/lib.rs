//! Run-time compilation bridge.
//!
//! A host hands jitcc a fragment of C or C++ source plus a compiler command.
//! jitcc writes the source to a temporary file, runs the external compiler,
//! loads the resulting shared object into the process, registers it, and calls
//! its entry point once. Later, objects exported by any registered module are
//! looked up by factory name and driven through an init, update, finalize
//! lifecycle by the host's own scheduling.
//!
//! # Architecture
//!
//! * [`Bridge`]: process-wide context owning the module registry, the
//!   diagnostics flag, the toolchain and the instance construction lock.
//! * [`pipeline`]: [`SourceUnit`] and [`Bridge::compile_and_run`].
//! * [`invoke`]: factory resolution, [`ThreadMode`] gating and the
//!   [`Invocation`] lifecycle driver.
//! * [`config`]: [`BridgeConfig`] loaded from TOML and the environment.
//! * [`signal`], [`platform`]: operator utilities.
//!
//! Compilation blocks the calling thread until the compiler exits. Call it
//! from initialisation paths only, never from an update tick.

mod bridge;
pub mod config;
mod diagnostics;
mod error;
pub mod invoke;
pub mod pipeline;
pub mod platform;
pub mod signal;

pub use bridge::Bridge;
pub use config::{BridgeConfig, ConfigError};
pub use diagnostics::Diagnostics;
pub use error::{BridgeError, InvokeError, Result};
pub use invoke::{Invocation, Lifecycle, Phase, ThreadMode};
pub use jitcc_abi::{
	C_HEADER, CreateError, HostApi, Invokable, InvocationContext, MAX_OUTPUTS, Status,
};
pub use jitcc_loader::{BuiltinModule, ModuleId, ModuleRegistry, Visibility};
pub use pipeline::SourceUnit;
