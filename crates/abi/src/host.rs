//! Host handle passed to every module call.

use std::ffi::{CStr, CString, c_char, c_int, c_void};

use crate::ABI_VERSION;

/// Message severity understood by [`HostApi::message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum MessageLevel {
	Info = 0,
	Warning = 1,
	Error = 2,
}

impl MessageLevel {
	fn from_raw(raw: c_int) -> Self {
		match raw {
			1 => Self::Warning,
			2 => Self::Error,
			_ => Self::Info,
		}
	}
}

/// Bit in [`HostApi::message_level`] that admits warnings.
pub const LEVEL_WARNINGS: u32 = 0x1;

/// Host message sink.
pub type MessageFn = unsafe extern "C" fn(user_data: *mut c_void, level: c_int, text: *const c_char);

/// Opaque reference to the embedding engine.
///
/// `user_data` belongs to whoever built the handle; jitcc only forwards it.
#[derive(Debug, Clone, Copy)]
#[repr(C)]
pub struct HostApi {
	pub struct_size: usize,
	pub abi_version: u32,
	pub message_level: u32,
	pub user_data: *mut c_void,
	pub message: Option<MessageFn>,
}

// SAFETY: the handle is a plain record; implementors of `message` must accept
// calls from any thread that drives a compilation or an invocation.
unsafe impl Send for HostApi {}
// SAFETY: see above, the record itself is never mutated through a shared reference.
unsafe impl Sync for HostApi {}

static FALLBACK_HOST: HostApi = HostApi {
	struct_size: std::mem::size_of::<HostApi>(),
	abi_version: ABI_VERSION,
	message_level: LEVEL_WARNINGS,
	user_data: std::ptr::null_mut(),
	message: Some(tracing_message),
};

unsafe extern "C" fn tracing_message(_user_data: *mut c_void, level: c_int, text: *const c_char) {
	if text.is_null() {
		return;
	}
	// SAFETY: callers pass a NUL-terminated string that outlives this call.
	let text = unsafe { CStr::from_ptr(text) }.to_string_lossy();
	match MessageLevel::from_raw(level) {
		MessageLevel::Info => tracing::info!(target: "jitcc::module", "{}", text.trim_end()),
		MessageLevel::Warning => tracing::warn!(target: "jitcc::module", "{}", text.trim_end()),
		MessageLevel::Error => tracing::error!(target: "jitcc::module", "{}", text.trim_end()),
	}
}

impl HostApi {
	/// Builds a handle around a host-provided message sink.
	pub const fn new(user_data: *mut c_void, message: Option<MessageFn>, message_level: u32) -> Self {
		Self {
			struct_size: std::mem::size_of::<HostApi>(),
			abi_version: ABI_VERSION,
			message_level,
			user_data,
			message,
		}
	}

	/// Process-wide handle that routes module messages into `tracing`.
	pub fn fallback() -> &'static HostApi {
		&FALLBACK_HOST
	}

	pub fn warnings_enabled(&self) -> bool {
		self.message_level & LEVEL_WARNINGS != 0
	}

	pub fn log(&self, text: &str) {
		self.send(MessageLevel::Info, text);
	}

	/// Sends a warning if the host admits warnings.
	pub fn warn(&self, text: &str) {
		if self.warnings_enabled() {
			self.send(MessageLevel::Warning, text);
		}
	}

	pub fn error(&self, text: &str) {
		self.send(MessageLevel::Error, text);
	}

	fn send(&self, level: MessageLevel, text: &str) {
		let Some(message) = self.message else {
			tracing::debug!(?level, "{text}");
			return;
		};
		let Ok(text) = CString::new(text.replace('\0', " ")) else {
			return;
		};
		// SAFETY: `message` was supplied together with `user_data` by the host.
		unsafe { message(self.user_data, level as c_int, text.as_ptr()) };
	}
}

impl Default for HostApi {
	fn default() -> Self {
		*Self::fallback()
	}
}
