use std::fmt;

/// Integer status returned across the module boundary. Zero is success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct Status(pub i32);

impl Status {
	pub const OK: Self = Self(0);

	pub const fn is_ok(self) -> bool {
		self.0 == 0
	}

	pub const fn code(self) -> i32 {
		self.0
	}
}

impl From<i32> for Status {
	fn from(code: i32) -> Self {
		Self(code)
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}
