use std::sync::OnceLock;

use jitcc_abi::HostApi;
use jitcc_loader::{BuiltinModule, Module, ModuleId, ModuleRegistry, library_extension};
use jitcc_toolchain::Toolchain;
use parking_lot::Mutex;

use crate::config::BridgeConfig;
use crate::diagnostics::Diagnostics;

/// Process-wide state shared by every compilation and invocation.
///
/// Hosts normally use [`Bridge::global`]; independent bridges are useful for
/// tests and for hosts that want separate registries. Loaded images are shared
/// by the whole process either way.
#[derive(Debug)]
pub struct Bridge {
	config: BridgeConfig,
	toolchain: Toolchain,
	registry: ModuleRegistry,
	diagnostics: Diagnostics,
	construct_lock: Mutex<()>,
}

impl Bridge {
	pub fn new(config: BridgeConfig) -> Self {
		let toolchain =
			Toolchain::new(config.temp_dir(), config.source_extension.clone(), library_extension()).keep_sources(config.keep_sources);
		Self {
			diagnostics: Diagnostics::new(config.verbose),
			toolchain,
			registry: ModuleRegistry::new(),
			construct_lock: Mutex::new(()),
			config,
		}
	}

	/// The bridge for this process, configured from the environment on first use.
	pub fn global() -> &'static Bridge {
		static GLOBAL: OnceLock<Bridge> = OnceLock::new();
		GLOBAL.get_or_init(|| Bridge::new(BridgeConfig::default().with_env_overrides()))
	}

	pub fn config(&self) -> &BridgeConfig {
		&self.config
	}

	pub fn registry(&self) -> &ModuleRegistry {
		&self.registry
	}

	pub fn diagnostics(&self) -> &Diagnostics {
		&self.diagnostics
	}

	pub(crate) fn toolchain(&self) -> &Toolchain {
		&self.toolchain
	}

	pub(crate) fn construct_lock(&self) -> &Mutex<()> {
		&self.construct_lock
	}

	/// Registers an in-process module; it is searched like a compiled one.
	pub fn register_builtin(&self, module: BuiltinModule) -> ModuleId {
		self.registry.register(Module::builtin(module))
	}

	/// Module teardown hook: forgets every registered module. Idempotent.
	pub fn teardown(&self) {
		self.registry.clear();
	}

	/// Reports a step to the host when diagnostics are on.
	pub(crate) fn note(&self, host: &HostApi, message: std::fmt::Arguments<'_>) {
		tracing::debug!("{message}");
		if self.diagnostics.is_enabled() {
			host.log(&format!("jitcc: {message}\n"));
		}
	}
}

impl Default for Bridge {
	fn default() -> Self {
		Self::new(BridgeConfig::default())
	}
}

#[cfg(test)]
mod tests {
	use serial_test::serial;

	use super::*;

	#[test]
	#[serial]
	fn global_bridge_is_shared_and_tears_down_repeatedly() {
		let bridge = Bridge::global();
		assert!(std::ptr::eq(bridge, Bridge::global()));

		bridge.register_builtin(BuiltinModule::new("process-wide"));
		assert_eq!(Bridge::global().registry().names(), vec!["process-wide".to_string()]);

		bridge.teardown();
		assert!(Bridge::global().registry().is_empty());
		bridge.teardown();
		assert!(Bridge::global().registry().is_empty());
	}
}
