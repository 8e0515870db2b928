//! Process-wide record of loaded modules.
//!
//! Registry order is append order. Scans hold the registry lock for their whole
//! duration, so a scan that starts after [`ModuleRegistry::register`] returns
//! observes the new module.

use parking_lot::Mutex;

use crate::module::Module;

/// Position of a module in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(usize);

impl ModuleId {
	pub const fn index(self) -> usize {
		self.0
	}
}

/// Ordered collection of every module loaded during the life of the process.
///
/// Modules are never removed individually. [`ModuleRegistry::clear`] forgets
/// all of them at teardown without unloading any image.
#[derive(Debug, Default)]
pub struct ModuleRegistry {
	modules: Mutex<Vec<Module>>,
}

impl ModuleRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends `module`, taking ownership of its handle.
	pub fn register(&self, module: Module) -> ModuleId {
		let mut modules = self.modules.lock();
		let id = ModuleId(modules.len());
		tracing::debug!(module = %module.name(), index = id.0, "registered module");
		modules.push(module);
		id
	}

	/// Visits every module in registry order under the lock.
	pub fn for_each(&self, mut visit: impl FnMut(ModuleId, &Module)) {
		let modules = self.modules.lock();
		for (index, module) in modules.iter().enumerate() {
			visit(ModuleId(index), module);
		}
	}

	/// Returns the first non-`None` result of `lookup` in registry order.
	pub fn find_map<R>(&self, mut lookup: impl FnMut(&Module) -> Option<R>) -> Option<R> {
		let modules = self.modules.lock();
		modules.iter().find_map(|module| lookup(module))
	}

	pub fn len(&self) -> usize {
		self.modules.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.modules.lock().is_empty()
	}

	/// Module names in registry order.
	pub fn names(&self) -> Vec<String> {
		self.modules.lock().iter().map(Module::name).collect()
	}

	/// Forgets every module. Safe to call repeatedly.
	pub fn clear(&self) {
		let forgotten = std::mem::take(&mut *self.modules.lock());
		if !forgotten.is_empty() {
			tracing::debug!(count = forgotten.len(), "cleared module registry");
		}
	}
}
