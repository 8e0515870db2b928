//! Toolchain invocation.
//!
//! Source text is written to a uniquely named file in a temporary directory and
//! handed to an external compiler as
//! `<command> <source> -o <source>.<library extension>`. The caller blocks
//! until the compiler exits; there is no timeout.

mod command;
mod compile;

use std::path::PathBuf;

pub use command::{CompilerCommand, requests_verbose, resolve_default_compiler, tokenize};
pub use compile::{Artifact, Toolchain, write_source};
use thiserror::Error;

/// Errors raised while producing a compiled artifact.
#[derive(Debug, Error)]
pub enum ToolchainError {
	#[error("compiler command is empty and no default compiler was found")]
	NoCompiler,
	#[error("failed to create source file in {dir}: {source}")]
	SourceFile {
		dir: PathBuf,
		#[source]
		source: std::io::Error,
	},
	#[error("failed to run {program}: {source}")]
	Spawn {
		program: String,
		#[source]
		source: std::io::Error,
	},
	#[error("compiler exited with {}: {diagnostics}", code.map_or_else(|| "a signal".to_string(), |c| format!("status {c}")))]
	CompilerFailed { code: Option<i32>, diagnostics: String },
}

/// Result type for toolchain operations.
pub type Result<T> = std::result::Result<T, ToolchainError>;
