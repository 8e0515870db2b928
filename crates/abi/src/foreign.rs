//! Adapter over objects constructed by compiled modules.

use std::ffi::c_int;
use std::ptr::NonNull;

use crate::{CreateError, HostApi, Invokable, InvocationContext, Status};

/// `int entry(const jitcc_host *host)`.
pub type EntryPointFn = unsafe extern "C" fn(host: *const HostApi) -> c_int;

/// `jitcc_invokable *factory(void)`.
pub type FactoryFn = unsafe extern "C" fn() -> *mut RawInvokable;

#[repr(C)]
pub struct RawInvokableVTable {
	pub init: Option<
		unsafe extern "C" fn(
			this: *mut RawInvokable,
			host: *const HostApi,
			ctx: *const InvocationContext,
			outputs: *mut *mut f64,
			inputs: *const *const f64,
		) -> c_int,
	>,
	pub kontrol: Option<
		unsafe extern "C" fn(this: *mut RawInvokable, host: *const HostApi, outputs: *mut *mut f64, inputs: *const *const f64) -> c_int,
	>,
	pub noteoff: Option<unsafe extern "C" fn(this: *mut RawInvokable, host: *const HostApi) -> c_int>,
	pub destroy: Option<unsafe extern "C" fn(this: *mut RawInvokable)>,
}

/// Header of every object returned by a native factory.
#[repr(C)]
pub struct RawInvokable {
	pub vtable: *const RawInvokableVTable,
}

/// Owns one native object and forwards the lifecycle through its vtable.
///
/// Missing vtable slots behave like the default trait methods. The object is
/// destroyed exactly once, when the adapter is dropped.
pub struct ForeignInvokable {
	raw: NonNull<RawInvokable>,
	outputs: Vec<*mut f64>,
	inputs: Vec<*const f64>,
}

// SAFETY: module objects are required to tolerate being driven from whichever
// thread the host renders on; access is serialised by the owning driver.
unsafe impl Send for ForeignInvokable {}

impl ForeignInvokable {
	/// Takes ownership of a factory result.
	///
	/// An object without a vtable has no `destroy` slot to release it with, so
	/// it is leaked.
	///
	/// # Safety
	///
	/// `raw` must be null or point to a live object whose first member is a
	/// valid vtable pointer, and no other owner may destroy it.
	pub unsafe fn from_raw(raw: *mut RawInvokable) -> Result<Self, CreateError> {
		let raw = NonNull::new(raw).ok_or(CreateError::Null)?;
		// SAFETY: non-null objects carry a readable header per the contract above.
		if unsafe { raw.as_ref() }.vtable.is_null() {
			tracing::warn!(object = ?raw, "factory returned an object without a vtable");
			return Err(CreateError::MissingVTable);
		}
		Ok(Self {
			raw,
			outputs: Vec::new(),
			inputs: Vec::new(),
		})
	}

	fn vtable(&self) -> &RawInvokableVTable {
		// SAFETY: the vtable was checked non-null at construction and lives in the
		// module image, which is never unloaded while objects exist.
		unsafe { &*self.raw.as_ref().vtable }
	}

	fn stage(&mut self, outputs: &mut [f64], inputs: &[f64]) {
		self.outputs.clear();
		self.outputs.extend(outputs.iter_mut().map(|slot| slot as *mut f64));
		self.inputs.clear();
		self.inputs.extend(inputs.iter().map(|slot| slot as *const f64));
	}
}

impl Invokable for ForeignInvokable {
	fn init(&mut self, host: &HostApi, ctx: &InvocationContext, outputs: &mut [f64], inputs: &[f64]) -> Status {
		let Some(init) = self.vtable().init else {
			return Status::OK;
		};
		self.stage(outputs, inputs);
		// SAFETY: pointer arrays reference `outputs`/`inputs`, which outlive the call.
		let code = unsafe { init(self.raw.as_ptr(), host, ctx, self.outputs.as_mut_ptr(), self.inputs.as_ptr()) };
		Status(code)
	}

	fn kontrol(&mut self, host: &HostApi, outputs: &mut [f64], inputs: &[f64]) -> Status {
		let Some(kontrol) = self.vtable().kontrol else {
			return Status::OK;
		};
		self.stage(outputs, inputs);
		// SAFETY: as in `init`.
		let code = unsafe { kontrol(self.raw.as_ptr(), host, self.outputs.as_mut_ptr(), self.inputs.as_ptr()) };
		Status(code)
	}

	fn noteoff(&mut self, host: &HostApi) -> Status {
		let Some(noteoff) = self.vtable().noteoff else {
			return Status::OK;
		};
		// SAFETY: the object is live until `drop`.
		Status(unsafe { noteoff(self.raw.as_ptr(), host) })
	}
}

impl Drop for ForeignInvokable {
	fn drop(&mut self) {
		self.outputs.clear();
		self.inputs.clear();
		if let Some(destroy) = self.vtable().destroy {
			// SAFETY: ownership is exclusive, so this is the only destroy call.
			unsafe { destroy(self.raw.as_ptr()) };
		}
	}
}
