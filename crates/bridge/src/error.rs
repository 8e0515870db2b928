//! Error types and their host status codes.

use jitcc_abi::{CreateError, Status};
use jitcc_loader::LoadError;
use jitcc_toolchain::ToolchainError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::invoke::Phase;

const STATUS_TOOLCHAIN: i32 = -1;
const STATUS_LOAD: i32 = -2;
const STATUS_SYMBOL: i32 = -3;
const STATUS_CONFIG: i32 = -4;
const STATUS_REQUEST: i32 = -5;
const STATUS_LIFECYCLE: i32 = -6;

/// Failures of the compilation pipeline.
#[derive(Debug, Error)]
pub enum BridgeError {
	#[error(transparent)]
	Toolchain(#[from] ToolchainError),
	#[error(transparent)]
	Load(#[from] LoadError),
	#[error("entry point `{entry}` not found in {module}")]
	EntryPointNotFound { entry: String, module: String },
	#[error(transparent)]
	Config(#[from] ConfigError),
}

impl BridgeError {
	/// Nonzero status reported to the host for this failure.
	pub fn status(&self) -> i32 {
		match self {
			Self::Toolchain(ToolchainError::CompilerFailed { code: Some(code), .. }) if *code != 0 => *code,
			Self::Toolchain(_) => STATUS_TOOLCHAIN,
			Self::Load(_) => STATUS_LOAD,
			Self::EntryPointNotFound { .. } => STATUS_SYMBOL,
			Self::Config(_) => STATUS_CONFIG,
		}
	}
}

/// Failures of factory resolution and the instance lifecycle.
#[derive(Debug, Error)]
pub enum InvokeError {
	#[error("no loaded module exports factory `{0}`")]
	FactoryNotFound(String),
	#[error("factory `{factory}` produced no usable instance: {reason}")]
	Construct {
		factory: String,
		#[source]
		reason: CreateError,
	},
	#[error("invalid thread mode {0}")]
	InvalidThreadMode(i32),
	#[error("{0} output slots requested, at most {max} supported", max = jitcc_abi::MAX_OUTPUTS)]
	TooManyOutputs(usize),
	#[error("instance has not been initialized")]
	NotInitialized,
	#[error("instance is already initialized")]
	AlreadyInitialized,
	#[error("instance has been finalized")]
	Finalized,
	#[error("owning call site released the instance")]
	Detached,
	#[error("{phase} returned status {status}")]
	Failed { phase: Phase, status: Status },
}

impl InvokeError {
	/// Nonzero status reported to the host for this failure.
	pub fn status(&self) -> i32 {
		match self {
			Self::FactoryNotFound(_) | Self::Construct { .. } => STATUS_SYMBOL,
			Self::InvalidThreadMode(_) | Self::TooManyOutputs(_) => STATUS_REQUEST,
			Self::NotInitialized | Self::AlreadyInitialized | Self::Finalized | Self::Detached => STATUS_LIFECYCLE,
			Self::Failed { status, .. } => status.code(),
		}
	}
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
