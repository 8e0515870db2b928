use std::sync::atomic::{AtomicBool, Ordering};

/// Process-wide verbosity switch shared by every compilation and invocation.
///
/// Starts off, is switched on by a `-v` token in any compiler command, and
/// stays on for the life of the bridge.
#[derive(Debug, Default)]
pub struct Diagnostics {
	enabled: AtomicBool,
}

impl Diagnostics {
	pub fn new(enabled: bool) -> Self {
		Self {
			enabled: AtomicBool::new(enabled),
		}
	}

	pub fn enable(&self) {
		if !self.enabled.swap(true, Ordering::AcqRel) {
			tracing::debug!("diagnostics enabled");
		}
	}

	pub fn is_enabled(&self) -> bool {
		self.enabled.load(Ordering::Acquire)
	}
}
