//! Hook registry
//!
//! Maps qualified hook names to the ordered handlers registered against
//! them. Registration order equals plugin-load order and is the order the
//! invoker runs handlers in; the registry never validates names against
//! the command tree, so dead hooks are legal and simply never run.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use stratus_plugin::{HookHandler, Plugin};

use crate::expand::is_well_formed;

/// One registered handler together with its owning plugin
#[derive(Clone)]
pub struct RegisteredHook {
	pub plugin: String,
	pub handler: Arc<dyn HookHandler>,
}

/// Ordered hook registrations for one invocation
#[derive(Default)]
pub struct HookRegistry {
	hooks: IndexMap<String, Vec<RegisteredHook>>,
	deprecated: IndexMap<String, String>,
}

impl HookRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry that re-targets hooks on renamed lifecycle events.
	///
	/// Keys are deprecated base event names (no phase prefix), values
	/// their replacements. Registrations against a deprecated name are
	/// redirected, keeping the phase prefix, with a warning.
	pub fn with_deprecated_events(deprecated: IndexMap<String, String>) -> Self {
		Self {
			hooks: IndexMap::new(),
			deprecated,
		}
	}

	/// Register one handler. Called during plugin loading, in load order.
	pub fn register(&mut self, plugin: &str, event: &str, handler: Arc<dyn HookHandler>) {
		let target = self.redirect(plugin, event);
		if !is_well_formed(&target) {
			warn!(
				target: "lifecycle::hook::register",
				plugin,
				hook = %target,
				"hook name does not match \"[before:|after:]<command>:<event>\"; it will never be invoked unless a command expands to it"
			);
		}
		debug!(target: "lifecycle::hook::register", plugin, hook = %target, "register");
		self.hooks.entry(target).or_default().push(RegisteredHook {
			plugin: plugin.to_string(),
			handler,
		});
	}

	/// Collect the hook declarations of every plugin, in load order.
	pub fn collect(&mut self, plugins: &[Arc<dyn Plugin>]) {
		for plugin in plugins {
			for binding in plugin.hooks() {
				self.register(plugin.name(), &binding.event, binding.handler);
			}
		}
	}

	/// Handlers for a qualified name, in registration order. Unregistered
	/// names yield an empty slice, not an error.
	pub fn handlers_for(&self, name: &str) -> &[RegisteredHook] {
		self.hooks.get(name).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Total number of registered handlers.
	pub fn len(&self) -> usize {
		self.hooks.values().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.hooks.is_empty()
	}

	fn redirect(&self, plugin: &str, event: &str) -> String {
		let (prefix, base) = match event
			.strip_prefix("before:")
			.map(|base| ("before:", base))
			.or_else(|| event.strip_prefix("after:").map(|base| ("after:", base)))
		{
			Some((prefix, base)) => (prefix, base),
			None => ("", event),
		};
		match self.deprecated.get(base) {
			Some(replacement) => {
				let target = format!("{prefix}{replacement}");
				warn!(
					target: "lifecycle::hook::register",
					plugin,
					hook = event,
					replacement = %target,
					"plugin uses a deprecated hook; use the replacement instead"
				);
				target
			}
			None => event.to_string(),
		}
	}
}
