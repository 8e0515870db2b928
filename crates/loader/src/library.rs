//! Shared-object loading.
//!
//! Loaded libraries are never closed: dropping a [`DynamicLibrary`] forgets the
//! handle and leaves the image mapped, so code and objects handed out earlier
//! stay valid.

use std::ffi::OsStr;
use std::fmt;
use std::mem::ManuallyDrop;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading a shared object.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("failed to load {path}: {source}")]
	Open {
		path: PathBuf,
		#[source]
		source: libloading::Error,
	},
}

/// Symbol visibility requested for a loaded library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
	/// Exported symbols satisfy undefined references in libraries loaded later.
	#[default]
	Global,
	/// Exported symbols are only reachable through this handle.
	Local,
}

/// Returns the platform's shared library extension.
pub const fn library_extension() -> &'static str {
	if cfg!(target_os = "windows") {
		"dll"
	} else if cfg!(target_os = "macos") {
		"dylib"
	} else {
		"so"
	}
}

/// Handle to a shared object loaded into this process.
pub struct DynamicLibrary {
	lib: ManuallyDrop<libloading::Library>,
	path: PathBuf,
	visibility: Visibility,
}

impl DynamicLibrary {
	/// Loads `path`, resolving all symbols immediately.
	///
	/// `path` may also be a bare library name, in which case the platform
	/// search path applies.
	pub fn open(path: impl AsRef<Path>, visibility: Visibility) -> Result<Self, LoadError> {
		let path = path.as_ref();
		let lib = open_platform(path.as_os_str(), visibility).map_err(|source| LoadError::Open {
			path: path.to_path_buf(),
			source,
		})?;
		tracing::debug!(path = %path.display(), ?visibility, "loaded library");
		Ok(Self {
			lib: ManuallyDrop::new(lib),
			path: path.to_path_buf(),
			visibility,
		})
	}

	pub fn path(&self) -> &Path {
		&self.path
	}

	pub fn visibility(&self) -> Visibility {
		self.visibility
	}

	/// Resolves `name` as a value of type `T`, usually a function pointer.
	///
	/// Returns `None` when the symbol is absent or the name contains a NUL byte.
	///
	/// # Safety
	///
	/// `T` must match the actual type of the exported symbol.
	pub unsafe fn symbol<T: Copy>(&self, name: &str) -> Option<T> {
		// SAFETY: type agreement is the caller's obligation.
		let symbol = unsafe { self.lib.get::<T>(name.as_bytes()) }.ok()?;
		Some(*symbol)
	}
}

impl fmt::Debug for DynamicLibrary {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DynamicLibrary")
			.field("path", &self.path)
			.field("visibility", &self.visibility)
			.finish_non_exhaustive()
	}
}

#[cfg(unix)]
fn open_platform(path: &OsStr, visibility: Visibility) -> Result<libloading::Library, libloading::Error> {
	use libloading::os::unix::{Library, RTLD_GLOBAL, RTLD_LOCAL, RTLD_NOW};

	let scope = match visibility {
		Visibility::Global => RTLD_GLOBAL,
		Visibility::Local => RTLD_LOCAL,
	};
	// SAFETY: running library initialisers is the point of loading user modules.
	unsafe { Library::open(Some(path), RTLD_NOW | scope) }.map(Into::into)
}

#[cfg(windows)]
fn open_platform(path: &OsStr, _visibility: Visibility) -> Result<libloading::Library, libloading::Error> {
	// Windows resolves imports per module; there is no global namespace to join.
	// SAFETY: as above.
	unsafe { libloading::Library::new(path) }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_library_reports_path() {
		let err = DynamicLibrary::open("/nonexistent/jitcc/libmissing.so", Visibility::Global).unwrap_err();
		assert!(matches!(err, LoadError::Open { ref path, .. } if path.ends_with("libmissing.so")));
	}

	#[test]
	fn library_extension_matches_platform() {
		let ext = library_extension();
		#[cfg(target_os = "linux")]
		assert_eq!(ext, "so");
		#[cfg(target_os = "macos")]
		assert_eq!(ext, "dylib");
		#[cfg(target_os = "windows")]
		assert_eq!(ext, "dll");
	}

	#[cfg(all(target_os = "linux", target_env = "gnu"))]
	#[test]
	fn resolves_symbols_in_system_library() {
		let lib = DynamicLibrary::open("libc.so.6", Visibility::Local).expect("libc loads");
		assert_eq!(lib.visibility(), Visibility::Local);
		// SAFETY: `getpid` has this signature.
		let getpid: Option<unsafe extern "C" fn() -> i32> = unsafe { lib.symbol("getpid") };
		assert!(getpid.is_some());
		// SAFETY: any type is fine for a lookup that must fail.
		let missing: Option<unsafe extern "C" fn()> = unsafe { lib.symbol("jitcc_definitely_not_here") };
		assert!(missing.is_none());
	}
}
