//! Source to loaded module, then one call into its entry point.

use jitcc_abi::{C_HEADER, HostApi};
use jitcc_loader::{DynamicLibrary, Module, Visibility};
use jitcc_toolchain::{CompilerCommand, ToolchainError, requests_verbose, resolve_default_compiler, tokenize};
use tracing::{error, info, warn};

use crate::bridge::Bridge;
use crate::error::{BridgeError, Result};

/// One compilation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
	/// Symbol called once after loading, as `int entry(const jitcc_host *)`.
	pub entry_point: String,
	pub source: String,
	/// Compiler and flags, without input or output paths.
	pub compiler_command: String,
	/// Libraries loaded globally before the module itself.
	pub dependencies: Vec<String>,
}

impl SourceUnit {
	pub fn new(entry_point: impl Into<String>, source: impl Into<String>, compiler_command: impl Into<String>) -> Self {
		Self {
			entry_point: entry_point.into(),
			source: source.into(),
			compiler_command: compiler_command.into(),
			dependencies: Vec::new(),
		}
	}

	/// Sets dependencies from a space-delimited list.
	pub fn dependency_list(mut self, list: &str) -> Self {
		self.dependencies = tokenize(list);
		self
	}

	pub fn dependency(mut self, library: impl Into<String>) -> Self {
		self.dependencies.push(library.into());
		self
	}

	/// Prepends the jitcc C header to the source text.
	pub fn with_header(mut self) -> Self {
		self.source = format!("{C_HEADER}\n#line 1 \"jitcc-source\"\n{}", self.source);
		self
	}
}

impl Bridge {
	/// Compiles `unit`, loads the result, registers it, and calls its entry point.
	///
	/// Blocks until the compiler exits. The entry point's return value is the
	/// result; a module stays registered even when its entry point is missing.
	pub fn compile_and_run(&self, unit: &SourceUnit, host: &HostApi) -> Result<i32> {
		if requests_verbose(&unit.compiler_command) {
			self.diagnostics().enable();
		}
		let default_compiler = || self.config().compiler.as_deref().or_else(|| resolve_default_compiler());
		let command = CompilerCommand::parse(&unit.compiler_command, default_compiler).ok_or(ToolchainError::NoCompiler)?;
		self.note(host, format_args!("compile: command: {command}"));

		let artifact = match self.toolchain().compile(&unit.source, &command) {
			Ok(artifact) => artifact,
			Err(err) => {
				error!(entry = %unit.entry_point, error = %err, "compilation failed");
				host.error(&format!("jitcc: compilation failed: {err}\n"));
				return Err(err.into());
			}
		};
		self.note(host, format_args!("compile: artifact: {}", artifact.path.display()));

		for library in &unit.dependencies {
			match DynamicLibrary::open(library, Visibility::Global) {
				Ok(_) => self.note(host, format_args!("compile: loaded dependency: {library}")),
				Err(err) => {
					warn!(library = %library, error = %err, "dependency failed to load");
					host.warn(&format!("jitcc: {err}\n"));
				}
			}
		}

		let lib = match DynamicLibrary::open(&artifact.path, self.config().artifact_visibility) {
			Ok(lib) => lib,
			Err(err) => {
				error!(error = %err, "module failed to load");
				host.error(&format!("jitcc: {err}\n"));
				return Err(err.into());
			}
		};
		let module = Module::native(lib);
		let entry = module.entry_point(&unit.entry_point);
		let module_name = module.name();
		let id = self.registry().register(module);
		info!(module = %module_name, index = id.index(), "module registered");

		let Some(entry) = entry else {
			error!(entry = %unit.entry_point, module = %module_name, "entry point not found");
			host.error(&format!("jitcc: entry point `{}` not found\n", unit.entry_point));
			return Err(BridgeError::EntryPointNotFound {
				entry: unit.entry_point.clone(),
				module: module_name,
			});
		};

		// SAFETY: the symbol is declared as `jitcc_entry_point`; the module stays loaded.
		let result = unsafe { entry(host) };
		self.note(host, format_args!("compile: {} returned {result}", unit.entry_point));
		Ok(result)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;

	#[test]
	fn dependency_list_splits_on_spaces() {
		let unit = SourceUnit::new("main", "", "cc").dependency_list("  libm.so.6 libz.so ").dependency("libdl.so.2");
		assert_eq!(unit.dependencies, vec!["libm.so.6", "libz.so", "libdl.so.2"]);
	}

	#[test]
	fn header_precedes_source() {
		let unit = SourceUnit::new("main", "int x;", "cc").with_header();
		assert!(unit.source.starts_with(C_HEADER));
		assert!(unit.source.ends_with("int x;"));
	}

	#[test]
	fn missing_compiler_fails_without_registering() {
		let dir = tempfile::tempdir().unwrap();
		let bridge = Bridge::new(crate::BridgeConfig {
			temp_dir: Some(dir.path().to_path_buf()),
			..Default::default()
		});
		let unit = SourceUnit::new("main", "int main;", "jitcc-no-such-compiler -shared");

		let err = bridge.compile_and_run(&unit, HostApi::fallback()).unwrap_err();
		assert!(matches!(err, BridgeError::Toolchain(ToolchainError::Spawn { .. })));
		assert_eq!(err.status(), -1);
		assert!(bridge.registry().is_empty());
	}

	#[test]
	fn verbose_token_enables_diagnostics() {
		let dir = tempfile::tempdir().unwrap();
		let bridge = Bridge::new(crate::BridgeConfig {
			temp_dir: Some(dir.path().to_path_buf()),
			..Default::default()
		});
		assert!(!bridge.diagnostics().is_enabled());
		let unit = SourceUnit::new("main", "", "jitcc-no-such-compiler -v");
		let _ = bridge.compile_and_run(&unit, HostApi::fallback());
		assert!(bridge.diagnostics().is_enabled());
	}
}
