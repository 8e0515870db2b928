//! Writing source files and running the compiler over them.

use std::ffi::OsString;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::command::CompilerCommand;
use crate::{Result, ToolchainError};

/// Writes `text` to a new file `<dir>/jitcc_<random>.<extension>`.
///
/// Creation is exclusive, so concurrent callers never share a path. The file
/// is kept after the call.
pub fn write_source(dir: &Path, extension: &str, text: &str) -> Result<PathBuf> {
	let source_err = |source| ToolchainError::SourceFile {
		dir: dir.to_path_buf(),
		source,
	};
	let suffix = format!(".{extension}");
	let mut file = tempfile::Builder::new()
		.prefix("jitcc_")
		.suffix(&suffix)
		.rand_bytes(12)
		.tempfile_in(dir)
		.map_err(source_err)?;
	file.write_all(text.as_bytes()).map_err(source_err)?;
	let (_, path) = file.keep().map_err(|e| source_err(e.error))?;
	Ok(path)
}

/// Files produced by one successful compilation.
#[derive(Debug, Clone)]
pub struct Artifact {
	/// Generated source file, or `None` once it has been cleaned up.
	pub source: Option<PathBuf>,
	/// Loadable binary.
	pub path: PathBuf,
	/// Combined compiler stdout and stderr.
	pub diagnostics: String,
}

/// Compiler driver bound to a temporary directory and file naming scheme.
#[derive(Debug, Clone)]
pub struct Toolchain {
	temp_dir: PathBuf,
	source_extension: String,
	artifact_extension: String,
	keep_sources: bool,
}

impl Toolchain {
	pub fn new(temp_dir: impl Into<PathBuf>, source_extension: impl Into<String>, artifact_extension: impl Into<String>) -> Self {
		Self {
			temp_dir: temp_dir.into(),
			source_extension: source_extension.into(),
			artifact_extension: artifact_extension.into(),
			keep_sources: true,
		}
	}

	/// Whether generated source files survive the compilation. Defaults to `true`.
	pub fn keep_sources(mut self, keep: bool) -> Self {
		self.keep_sources = keep;
		self
	}

	pub fn temp_dir(&self) -> &Path {
		&self.temp_dir
	}

	/// Artifact path for a generated source file: the source path plus the
	/// library extension.
	pub fn artifact_path(&self, source: &Path) -> PathBuf {
		let mut path = OsString::from(source.as_os_str());
		path.push(".");
		path.push(&self.artifact_extension);
		PathBuf::from(path)
	}

	/// Compiles `text` with `command`, blocking until the compiler exits.
	pub fn compile(&self, text: &str, command: &CompilerCommand) -> Result<Artifact> {
		let source = write_source(&self.temp_dir, &self.source_extension, text)?;
		let path = self.artifact_path(&source);

		let mut cmd = command.to_command();
		cmd.arg(&source).arg("-o").arg(&path);
		info!(command = %command, source = %source.display(), "compiling module");

		let output = cmd.output().map_err(|source| ToolchainError::Spawn {
			program: command.program().to_string(),
			source,
		});
		let source = self.finish_source(source);
		let output = output?;

		let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
		diagnostics.push_str(&String::from_utf8_lossy(&output.stderr));
		debug!(status = ?output.status, artifact = %path.display(), "compiler exited");

		if !output.status.success() {
			return Err(ToolchainError::CompilerFailed {
				code: output.status.code(),
				diagnostics,
			});
		}
		Ok(Artifact { source, path, diagnostics })
	}

	fn finish_source(&self, source: PathBuf) -> Option<PathBuf> {
		if self.keep_sources {
			return Some(source);
		}
		if let Err(error) = fs::remove_file(&source) {
			debug!(source = %source.display(), %error, "failed to remove generated source");
		}
		None
	}
}
