//! Shared instance cell and its state machine.

use std::fmt;

use jitcc_abi::{HostApi, Invokable, InvocationContext};
use parking_lot::Mutex;

use super::Phase;
use crate::error::InvokeError;

/// Observable lifecycle state of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
	Uninitialized,
	Initialized,
	Finalized,
}

enum Slot {
	Uninitialized(Box<dyn Invokable>),
	Initialized(Box<dyn Invokable>),
	Finalized,
}

impl Slot {
	fn state(&self) -> Lifecycle {
		match self {
			Self::Uninitialized(_) => Lifecycle::Uninitialized,
			Self::Initialized(_) => Lifecycle::Initialized,
			Self::Finalized => Lifecycle::Finalized,
		}
	}
}

/// One constructed instance, shared by every call site that drives it.
pub(crate) struct InstanceCell {
	factory: String,
	slot: Mutex<Slot>,
}

impl InstanceCell {
	pub(crate) fn new(factory: String, instance: Box<dyn Invokable>) -> Self {
		Self {
			factory,
			slot: Mutex::new(Slot::Uninitialized(instance)),
		}
	}

	pub(crate) fn factory(&self) -> &str {
		&self.factory
	}

	pub(crate) fn state(&self) -> Lifecycle {
		self.slot.lock().state()
	}

	/// Runs `init` once. A failing `init` destroys the instance.
	pub(crate) fn init(&self, host: &HostApi, ctx: &InvocationContext, outputs: &mut [f64], inputs: &[f64]) -> Result<(), InvokeError> {
		let mut slot = self.slot.lock();
		let instance = match std::mem::replace(&mut *slot, Slot::Finalized) {
			Slot::Uninitialized(mut instance) => {
				let status = instance.init(host, ctx, outputs, inputs);
				if !status.is_ok() {
					drop(instance);
					return Err(InvokeError::Failed { phase: Phase::Init, status });
				}
				instance
			}
			initialized @ Slot::Initialized(_) => {
				*slot = initialized;
				return Err(InvokeError::AlreadyInitialized);
			}
			Slot::Finalized => return Err(InvokeError::Finalized),
		};
		*slot = Slot::Initialized(instance);
		Ok(())
	}

	pub(crate) fn kontrol(&self, host: &HostApi, outputs: &mut [f64], inputs: &[f64]) -> Result<(), InvokeError> {
		let mut slot = self.slot.lock();
		let status = match &mut *slot {
			Slot::Initialized(instance) => instance.kontrol(host, outputs, inputs),
			Slot::Uninitialized(_) => return Err(InvokeError::NotInitialized),
			Slot::Finalized => return Err(InvokeError::Finalized),
		};
		if status.is_ok() { Ok(()) } else { Err(InvokeError::Failed { phase: Phase::Kontrol, status }) }
	}

	/// Finalizes and destroys the instance. Later calls are no-ops.
	///
	/// An instance that never completed `init` is destroyed without `noteoff`.
	pub(crate) fn finalize(&self, host: &HostApi) -> Result<(), InvokeError> {
		let previous = std::mem::replace(&mut *self.slot.lock(), Slot::Finalized);
		match previous {
			Slot::Initialized(mut instance) => {
				let status = instance.noteoff(host);
				drop(instance);
				if status.is_ok() { Ok(()) } else { Err(InvokeError::Failed { phase: Phase::Noteoff, status }) }
			}
			Slot::Uninitialized(instance) => {
				drop(instance);
				Ok(())
			}
			Slot::Finalized => Ok(()),
		}
	}
}

impl Drop for InstanceCell {
	fn drop(&mut self) {
		if let Slot::Initialized(instance) = self.slot.get_mut() {
			let status = instance.noteoff(HostApi::fallback());
			tracing::debug!(factory = %self.factory, %status, "finalized instance on release");
		}
	}
}

impl fmt::Debug for InstanceCell {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("InstanceCell")
			.field("factory", &self.factory)
			.field("state", &self.state())
			.finish()
	}
}
