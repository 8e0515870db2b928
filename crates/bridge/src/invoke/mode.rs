use bitflags::bitflags;

use crate::error::InvokeError;

bitflags! {
	/// Lifecycle roles active at one call site.
	///
	/// Hosts pass the mode as an integer: `1` init only, `2` update only,
	/// `3` both. `0` behaves like `3`.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
	pub struct ThreadMode: u8 {
		/// The call site constructs and initializes.
		const INIT = 0b01;
		/// The call site drives update ticks.
		const UPDATE = 0b10;
	}
}

impl ThreadMode {
	pub const BOTH: Self = Self::INIT.union(Self::UPDATE);

	pub fn from_raw(raw: i32) -> Result<Self, InvokeError> {
		match raw {
			0 | 3 => Ok(Self::BOTH),
			1 => Ok(Self::INIT),
			2 => Ok(Self::UPDATE),
			other => Err(InvokeError::InvalidThreadMode(other)),
		}
	}

	pub fn runs_init(self) -> bool {
		self.contains(Self::INIT)
	}

	pub fn runs_update(self) -> bool {
		self.contains(Self::UPDATE)
	}
}

impl TryFrom<i32> for ThreadMode {
	type Error = InvokeError;

	fn try_from(raw: i32) -> Result<Self, Self::Error> {
		Self::from_raw(raw)
	}
}
