//! Factory resolution and the instance lifecycle.
//!
//! [`Bridge::invoke`] resolves a factory by name across every registered
//! module, constructs one instance and runs `init` when the call site's
//! [`ThreadMode`] includes [`ThreadMode::INIT`]. The returned [`Invocation`]
//! then drives `kontrol` ticks and a final `noteoff`.
//!
//! A host that splits roles across two call sites creates the instance at the
//! owning site and hands the other site a non-owning [`Invocation::attach`]
//! handle. Both sites drive the same instance; it is finalized once, when the
//! owner finalizes or drops.

mod instance;
mod mode;

use std::fmt;
use std::sync::{Arc, Weak};

use jitcc_abi::{HostApi, InvocationContext, MAX_OUTPUTS};

use self::instance::InstanceCell;
pub use self::instance::Lifecycle;
pub use self::mode::ThreadMode;
use crate::bridge::Bridge;
use crate::error::InvokeError;

/// Lifecycle phase of an invokable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
	Init,
	Kontrol,
	Noteoff,
}

impl fmt::Display for Phase {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(match self {
			Self::Init => "init",
			Self::Kontrol => "kontrol",
			Self::Noteoff => "noteoff",
		})
	}
}

#[derive(Debug)]
enum Site {
	Owner(Arc<InstanceCell>),
	Attached(Weak<InstanceCell>),
}

/// One call site's handle on a constructed instance.
#[derive(Debug)]
pub struct Invocation {
	mode: ThreadMode,
	site: Site,
}

impl Invocation {
	/// Constructs an instance without running `init`.
	pub fn create(bridge: &Bridge, factory: &str, mode: ThreadMode, host: &HostApi) -> Result<Self, InvokeError> {
		let cell = bridge.create_instance(factory, host)?;
		Ok(Self {
			mode,
			site: Site::Owner(Arc::new(cell)),
		})
	}

	/// A non-owning handle on the same instance, driven with `mode`.
	pub fn attach(&self, mode: ThreadMode) -> Invocation {
		let weak = match &self.site {
			Site::Owner(cell) => Arc::downgrade(cell),
			Site::Attached(weak) => weak.clone(),
		};
		Invocation {
			mode,
			site: Site::Attached(weak),
		}
	}

	pub fn mode(&self) -> ThreadMode {
		self.mode
	}

	pub fn is_owner(&self) -> bool {
		matches!(self.site, Site::Owner(_))
	}

	/// Current state; an attached handle whose owner is gone reports `Finalized`.
	pub fn state(&self) -> Lifecycle {
		self.cell().map_or(Lifecycle::Finalized, |cell| cell.state())
	}

	/// Runs `init`. Skipped when the mode lacks [`ThreadMode::INIT`].
	pub fn init(&self, host: &HostApi, ctx: &InvocationContext, outputs: &mut [f64], inputs: &[f64]) -> Result<(), InvokeError> {
		if !self.mode.runs_init() {
			return Ok(());
		}
		check_outputs(outputs)?;
		let cell = self.cell().ok_or(InvokeError::Detached)?;
		let result = cell.init(host, ctx, outputs, inputs);
		if let Err(err) = &result {
			tracing::warn!(factory = %cell.factory(), error = %err, "init failed");
		}
		result
	}

	/// Runs one update tick. Skipped when the mode lacks [`ThreadMode::UPDATE`].
	pub fn kontrol(&self, host: &HostApi, outputs: &mut [f64], inputs: &[f64]) -> Result<(), InvokeError> {
		if !self.mode.runs_update() {
			return Ok(());
		}
		check_outputs(outputs)?;
		let cell = self.cell().ok_or(InvokeError::Detached)?;
		cell.kontrol(host, outputs, inputs)
	}

	/// Finalizes the instance: `noteoff` when it was initialized, then
	/// destruction. Runs for every mode; repeated calls are no-ops.
	pub fn noteoff(&self, host: &HostApi) -> Result<(), InvokeError> {
		match self.cell() {
			Some(cell) => cell.finalize(host),
			None => Ok(()),
		}
	}

	fn cell(&self) -> Option<Arc<InstanceCell>> {
		match &self.site {
			Site::Owner(cell) => Some(Arc::clone(cell)),
			Site::Attached(weak) => weak.upgrade(),
		}
	}
}

fn check_outputs(outputs: &[f64]) -> Result<(), InvokeError> {
	if outputs.len() > MAX_OUTPUTS {
		return Err(InvokeError::TooManyOutputs(outputs.len()));
	}
	Ok(())
}

impl Bridge {
	/// Resolves `factory` across registered modules, constructs an instance,
	/// and runs `init` when `mode` includes [`ThreadMode::INIT`].
	///
	/// The first module in registration order that exports the name wins.
	pub fn invoke(
		&self,
		factory: &str,
		mode: ThreadMode,
		host: &HostApi,
		ctx: &InvocationContext,
		outputs: &mut [f64],
		inputs: &[f64],
	) -> Result<Invocation, InvokeError> {
		check_outputs(outputs)?;
		let invocation = Invocation::create(self, factory, mode, host)?;
		invocation.init(host, ctx, outputs, inputs)?;
		Ok(invocation)
	}

	pub(crate) fn create_instance(&self, factory: &str, host: &HostApi) -> Result<InstanceCell, InvokeError> {
		let _guard = self.construct_lock().lock();
		let Some(make) = self.registry().find_map(|module| module.factory(factory)) else {
			self.note(host, format_args!("invoke: factory `{factory}` not found"));
			return Err(InvokeError::FactoryNotFound(factory.to_owned()));
		};
		let instance = make.create().map_err(|reason| InvokeError::Construct {
			factory: factory.to_owned(),
			reason,
		})?;
		self.note(host, format_args!("invoke: constructed `{factory}`"));
		Ok(InstanceCell::new(factory.to_owned(), instance))
	}
}

#[cfg(test)]
mod tests;
