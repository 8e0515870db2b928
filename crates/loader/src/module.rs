//! Registered units of code.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use jitcc_abi::{BuiltinFactory, EntryPointFn, Factory, FactoryFn, Invokable};

use crate::library::DynamicLibrary;

/// Named factories and entry points provided by the host process itself.
///
/// Builtin modules take part in factory resolution exactly like compiled ones,
/// which lets hosts ship stock invokables and lets tests exercise the registry
/// without a toolchain.
#[derive(Default, Clone)]
pub struct BuiltinModule {
	name: String,
	factories: HashMap<String, BuiltinFactory>,
	entry_points: HashMap<String, EntryPointFn>,
}

impl BuiltinModule {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			..Self::default()
		}
	}

	/// Adds a factory under `symbol`, replacing any previous one with that name.
	pub fn factory<F, I>(mut self, symbol: impl Into<String>, make: F) -> Self
	where
		F: Fn() -> I + Send + Sync + 'static,
		I: Invokable + 'static,
	{
		let make: BuiltinFactory = Arc::new(move || Box::new(make()) as Box<dyn Invokable>);
		self.factories.insert(symbol.into(), make);
		self
	}

	pub fn entry_point(mut self, symbol: impl Into<String>, entry: EntryPointFn) -> Self {
		self.entry_points.insert(symbol.into(), entry);
		self
	}
}

impl fmt::Debug for BuiltinModule {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut factories: Vec<_> = self.factories.keys().collect();
		factories.sort();
		f.debug_struct("BuiltinModule")
			.field("name", &self.name)
			.field("factories", &factories)
			.finish_non_exhaustive()
	}
}

#[derive(Debug)]
enum ModuleKind {
	Native(DynamicLibrary),
	Builtin(BuiltinModule),
}

/// A module as held by the registry.
#[derive(Debug)]
pub struct Module {
	kind: ModuleKind,
}

impl Module {
	pub fn native(lib: DynamicLibrary) -> Self {
		Self {
			kind: ModuleKind::Native(lib),
		}
	}

	pub fn builtin(module: BuiltinModule) -> Self {
		Self {
			kind: ModuleKind::Builtin(module),
		}
	}

	/// Display name: the artifact path for compiled modules.
	pub fn name(&self) -> String {
		match &self.kind {
			ModuleKind::Native(lib) => lib.path().display().to_string(),
			ModuleKind::Builtin(module) => module.name.clone(),
		}
	}

	/// Looks up an `int (*)(const jitcc_host *)` entry point.
	pub fn entry_point(&self, symbol: &str) -> Option<EntryPointFn> {
		match &self.kind {
			// SAFETY: entry points are declared with this signature by contract.
			ModuleKind::Native(lib) => unsafe { lib.symbol::<EntryPointFn>(symbol) },
			ModuleKind::Builtin(module) => module.entry_points.get(symbol).copied(),
		}
	}

	/// Looks up a factory exported under `symbol`.
	pub fn factory(&self, symbol: &str) -> Option<Factory> {
		match &self.kind {
			// SAFETY: factory symbols are declared as `jitcc_factory` by contract.
			ModuleKind::Native(lib) => unsafe { lib.symbol::<FactoryFn>(symbol) }.map(Factory::Native),
			ModuleKind::Builtin(module) => module.factories.get(symbol).cloned().map(Factory::Builtin),
		}
	}
}
