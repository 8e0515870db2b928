//! Raising operating system signals by name.
//!
//! Used for forced termination of the host process or to stop under a
//! debugger. The default disposition is restored before raising, so any
//! handler the host installed does not run.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SignalError {
	#[error("unrecognized signal `{0}`")]
	Unknown(String),
	#[error("failed to raise {signal}: {source}")]
	Raise {
		signal: Signal,
		#[source]
		source: std::io::Error,
	},
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
	/// Termination request.
	Term,
	/// Invalid memory access.
	Segv,
	/// External interrupt.
	Int,
	/// Invalid instruction.
	Ill,
	/// Abnormal termination.
	Abrt,
	/// Erroneous arithmetic operation.
	Fpe,
}

impl Signal {
	pub const ALL: [Signal; 6] = [Self::Term, Self::Segv, Self::Int, Self::Ill, Self::Abrt, Self::Fpe];

	pub fn name(self) -> &'static str {
		match self {
			Self::Term => "SIGTERM",
			Self::Segv => "SIGSEGV",
			Self::Int => "SIGINT",
			Self::Ill => "SIGILL",
			Self::Abrt => "SIGABRT",
			Self::Fpe => "SIGFPE",
		}
	}

	fn number(self) -> libc::c_int {
		match self {
			Self::Term => libc::SIGTERM,
			Self::Segv => libc::SIGSEGV,
			Self::Int => libc::SIGINT,
			Self::Ill => libc::SIGILL,
			Self::Abrt => libc::SIGABRT,
			Self::Fpe => libc::SIGFPE,
		}
	}
}

impl fmt::Display for Signal {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for Signal {
	type Err = SignalError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::ALL
			.into_iter()
			.find(|signal| signal.name() == s)
			.ok_or_else(|| SignalError::Unknown(s.to_owned()))
	}
}

/// Restores the default disposition for `signal` and raises it.
///
/// For fatal signals this does not return.
pub fn raise(signal: Signal) -> Result<(), SignalError> {
	tracing::warn!(%signal, "raising signal");
	let number = signal.number();
	// SAFETY: SIG_DFL is a valid disposition for every signal in `Signal`.
	let previous = unsafe { libc::signal(number, libc::SIG_DFL) };
	if previous == libc::SIG_ERR {
		return Err(SignalError::Raise {
			signal,
			source: std::io::Error::last_os_error(),
		});
	}
	// SAFETY: raising a signal with the default disposition has no memory effects here.
	if unsafe { libc::raise(number) } != 0 {
		return Err(SignalError::Raise {
			signal,
			source: std::io::Error::last_os_error(),
		});
	}
	Ok(())
}
