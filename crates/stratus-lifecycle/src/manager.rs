//! Plugin manager
//!
//! The facade the CLI talks to: loads plugins, merges their command
//! declarations, collects their hooks and exposes one `run` entry point
//! for a resolved command path. Built once per process invocation; the
//! tree and registry are immutable afterwards.

use std::sync::Arc;

use indexmap::IndexMap;

use stratus_core::{EngineResult, ServiceContext};
use stratus_plugin::{Plugin, PluginLoader};

use crate::invoker::Invoker;
use crate::registry::HookRegistry;
use crate::tree::{CommandNode, CommandTree};

/// Composition root of one CLI invocation
pub struct PluginManager {
	plugins: Vec<Arc<dyn Plugin>>,
	invoker: Invoker,
}

impl PluginManager {
	/// Load every plugin, merge the command tree and collect hooks.
	pub async fn build(loader: &PluginLoader, ctx: Arc<ServiceContext>) -> EngineResult<Self> {
		Self::build_with_deprecated_events(loader, ctx, IndexMap::new()).await
	}

	/// Like [`PluginManager::build`], with redirects for renamed
	/// lifecycle events (deprecated base name to replacement).
	pub async fn build_with_deprecated_events(
		loader: &PluginLoader,
		ctx: Arc<ServiceContext>,
		deprecated_events: IndexMap<String, String>,
	) -> EngineResult<Self> {
		let plugins = loader.load(&ctx).await?;
		let tree = CommandTree::merge(&plugins)?;
		let mut registry = HookRegistry::with_deprecated_events(deprecated_events);
		registry.collect(&plugins);

		Ok(Self {
			plugins,
			invoker: Invoker::new(Arc::new(tree), Arc::new(registry), ctx),
		})
	}

	/// Loaded plugins, in load order.
	pub fn plugins(&self) -> &[Arc<dyn Plugin>] {
		&self.plugins
	}

	pub fn tree(&self) -> &CommandTree {
		self.invoker.tree()
	}

	/// The commands a user can type, for help rendering.
	pub fn public_commands(&self) -> Vec<&CommandNode> {
		self.invoker.tree().public_commands()
	}

	/// Check that a path resolves to a CLI-accessible command.
	pub fn validate_command(&self, path: &[String]) -> EngineResult<()> {
		self.invoker.tree().get(path, false).map(|_| ())
	}

	/// Run one public command to completion.
	pub async fn run(&self, path: &[String]) -> EngineResult<()> {
		self.invoker.run(path).await
	}
}
