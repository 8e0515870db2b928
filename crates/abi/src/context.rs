/// Framing of the calling logical unit, copied into an instance at init.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct InvocationContext {
	pub struct_size: usize,
	/// Frames per update period.
	pub ksmps: u32,
	/// First frame to render in the current period.
	pub ksmps_offset: u32,
	/// Last frame to render, or zero for the whole period.
	pub ksmps_no_end: u32,
	pub output_count: u32,
	pub input_count: u32,
	/// Identifier of the owning logical unit.
	pub unit_id: u64,
}

impl InvocationContext {
	pub fn new(ksmps: u32, output_count: usize, input_count: usize) -> Self {
		Self {
			struct_size: std::mem::size_of::<Self>(),
			ksmps,
			ksmps_offset: 0,
			ksmps_no_end: 0,
			output_count: output_count as u32,
			input_count: input_count as u32,
			unit_id: 0,
		}
	}

	pub fn with_unit(mut self, unit_id: u64) -> Self {
		self.unit_id = unit_id;
		self
	}

	pub fn with_frames(mut self, offset: u32, end: u32) -> Self {
		self.ksmps_offset = offset;
		self.ksmps_no_end = end;
		self
	}

	pub const fn ksmps(&self) -> u32 {
		self.ksmps
	}

	pub const fn kperiod_offset(&self) -> u32 {
		self.ksmps_offset
	}

	pub const fn kperiod_end(&self) -> u32 {
		if self.ksmps_no_end != 0 { self.ksmps_no_end } else { self.ksmps }
	}

	pub const fn output_arg_count(&self) -> u32 {
		self.output_count
	}

	pub const fn input_arg_count(&self) -> u32 {
		self.input_count
	}
}

impl Default for InvocationContext {
	fn default() -> Self {
		Self::new(0, 0, 0)
	}
}
