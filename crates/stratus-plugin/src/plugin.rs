//! The plugin capability
//!
//! A plugin is any value implementing [`Plugin`]. The engine composes
//! behavior through this trait alone: command fragments are merged into
//! the global tree, hook bindings are collected into the registry, and
//! nothing is ever copied onto a shared object.

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;

use stratus_core::ServiceContext;

use crate::declaration::CommandDef;
use crate::hooks::{HookBinding, HookResult};

/// Capability exposed by every Stratus plugin
#[async_trait]
pub trait Plugin: Send + Sync {
	/// Stable identity, used for load-order bookkeeping and diagnostics.
	fn name(&self) -> &str;

	/// Provider this plugin is specific to. Plugins naming a provider
	/// other than the service's active one are skipped at load time;
	/// `None` means provider-agnostic.
	fn provider(&self) -> Option<&str> {
		None
	}

	/// Partial command tree contributed by this plugin.
	fn commands(&self) -> IndexMap<String, CommandDef> {
		IndexMap::new()
	}

	/// Hook registrations contributed by this plugin, in declaration
	/// order.
	fn hooks(&self) -> Vec<HookBinding> {
		Vec::new()
	}

	/// Post-instantiation initialization, run once after every plugin has
	/// been loaded and before any command is invoked.
	async fn initialize(&self, _ctx: &Arc<ServiceContext>) -> HookResult {
		Ok(())
	}
}
