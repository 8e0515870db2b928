use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::foreign::{FactoryFn, ForeignInvokable};
use crate::{HostApi, InvocationContext, Status};

/// Object driven through the init, update, finalize lifecycle.
///
/// `init` runs at most once, `kontrol` once per update tick after a successful
/// `init`, and `noteoff` at most once before the object is dropped. The driver
/// enforces that order; implementations do not need to re-check it.
pub trait Invokable: Send {
	fn init(&mut self, host: &HostApi, ctx: &InvocationContext, outputs: &mut [f64], inputs: &[f64]) -> Status;

	fn kontrol(&mut self, _host: &HostApi, _outputs: &mut [f64], _inputs: &[f64]) -> Status {
		Status::OK
	}

	fn noteoff(&mut self, _host: &HostApi) -> Status {
		Status::OK
	}
}

/// Why a factory produced no usable object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CreateError {
	#[error("factory returned a null object")]
	Null,
	#[error("factory returned an object without a vtable")]
	MissingVTable,
}

/// Constructor for an in-process invokable.
pub type BuiltinFactory = Arc<dyn Fn() -> Box<dyn Invokable> + Send + Sync>;

/// Resolved constructor, either exported by a compiled module or registered in-process.
#[derive(Clone)]
pub enum Factory {
	Native(FactoryFn),
	Builtin(BuiltinFactory),
}

impl Factory {
	/// Constructs a new, independently owned instance.
	pub fn create(&self) -> Result<Box<dyn Invokable>, CreateError> {
		match self {
			Self::Native(factory) => {
				// SAFETY: the symbol was resolved as a `jitcc_factory`; the module stays loaded
				// for the rest of the process.
				let raw = unsafe { factory() };
				// SAFETY: a non-null return is a freshly allocated object owned by the caller.
				let object = unsafe { ForeignInvokable::from_raw(raw) }?;
				Ok(Box::new(object))
			}
			Self::Builtin(factory) => Ok(factory()),
		}
	}
}

impl fmt::Debug for Factory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Native(factory) => f.debug_tuple("Native").field(&(*factory as *const ())).finish(),
			Self::Builtin(_) => f.write_str("Builtin"),
		}
	}
}
