//! Bridge configuration.
//!
//! ```toml
//! temp_dir = "/var/tmp/jitcc"
//! source_extension = "cpp"
//! compiler = "clang++"
//! keep_sources = true
//! artifact_visibility = "global"
//! verbose = false
//! ```
//!
//! Every key is optional. Environment variables override file values:
//! `JITCC_TMPDIR`, `JITCC_CXX` and `JITCC_VERBOSE`.

use std::path::{Path, PathBuf};

use jitcc_loader::Visibility;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("I/O error reading {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to parse config: {0}")]
	Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BridgeConfig {
	/// Directory for generated sources and artifacts. Defaults to the system temp dir.
	pub temp_dir: Option<PathBuf>,
	/// Extension of generated source files; it selects the compiler's language mode.
	pub source_extension: String,
	/// Compiler used when a command carries only options.
	pub compiler: Option<String>,
	/// Leave generated source files behind after compiling.
	pub keep_sources: bool,
	/// Visibility of compiled modules. Dependencies are always loaded globally.
	pub artifact_visibility: Visibility,
	/// Initial state of the diagnostics flag.
	pub verbose: bool,
}

impl Default for BridgeConfig {
	fn default() -> Self {
		Self {
			temp_dir: None,
			source_extension: "cpp".to_string(),
			compiler: None,
			keep_sources: true,
			artifact_visibility: Visibility::Global,
			verbose: false,
		}
	}
}

impl BridgeConfig {
	pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(text)?)
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
			path: path.to_path_buf(),
			source,
		})?;
		Self::from_toml_str(&text)
	}

	/// Applies `JITCC_TMPDIR`, `JITCC_CXX` and `JITCC_VERBOSE`.
	pub fn with_env_overrides(mut self) -> Self {
		if let Some(dir) = std::env::var_os("JITCC_TMPDIR").filter(|d| !d.is_empty()) {
			self.temp_dir = Some(PathBuf::from(dir));
		}
		if let Ok(cxx) = std::env::var("JITCC_CXX")
			&& !cxx.trim().is_empty()
		{
			self.compiler = Some(cxx);
		}
		if let Ok(verbose) = std::env::var("JITCC_VERBOSE") {
			self.verbose = matches!(verbose.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on");
		}
		self
	}

	/// Effective directory for generated files.
	pub fn temp_dir(&self) -> PathBuf {
		self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
	}
}
