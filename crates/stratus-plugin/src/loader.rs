//! Ordered plugin loading
//!
//! Load order is the backbone of the engine's determinism: command-tree
//! merging and hook registration both follow it. The order is fixed as
//! core plugins, then the active provider's plugins, then user-declared
//! plugins in the order the service file lists them.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use stratus_core::{EngineError, EngineResult, ServiceContext};

use crate::plugin::Plugin;

/// Constructor for one plugin, given the shared service context
pub type PluginFactory = Box<dyn Fn(Arc<ServiceContext>) -> Arc<dyn Plugin> + Send + Sync>;

/// Ordered collection of plugin constructors
///
/// Core and provider factories are positional; user-declared plugins are
/// selected by name from the external catalog, so the service file alone
/// decides which of them load and in what order.
#[derive(Default)]
pub struct PluginLoader {
	core: Vec<PluginFactory>,
	provider: Vec<PluginFactory>,
	external: IndexMap<String, PluginFactory>,
}

impl PluginLoader {
	pub fn new() -> Self {
		Self::default()
	}

	/// Register a core engine plugin. Core plugins load first.
	pub fn register_core<F>(&mut self, factory: F) -> &mut Self
	where
		F: Fn(Arc<ServiceContext>) -> Arc<dyn Plugin> + Send + Sync + 'static,
	{
		self.core.push(Box::new(factory));
		self
	}

	/// Register a provider plugin. Provider plugins load after core ones.
	pub fn register_provider<F>(&mut self, factory: F) -> &mut Self
	where
		F: Fn(Arc<ServiceContext>) -> Arc<dyn Plugin> + Send + Sync + 'static,
	{
		self.provider.push(Box::new(factory));
		self
	}

	/// Make an external plugin available under the name the service file
	/// uses to request it.
	pub fn register_external<F>(&mut self, name: impl Into<String>, factory: F) -> &mut Self
	where
		F: Fn(Arc<ServiceContext>) -> Arc<dyn Plugin> + Send + Sync + 'static,
	{
		self.external.insert(name.into(), Box::new(factory));
		self
	}

	/// Instantiate every applicable plugin, in load order.
	///
	/// Plugins bound to a provider other than the service's active one
	/// are skipped. Two plugins with the same name are a fatal
	/// [`EngineError::DuplicatePlugin`]; a user-declared name missing
	/// from the catalog is a fatal [`EngineError::PluginNotFound`].
	pub async fn load(&self, ctx: &Arc<ServiceContext>) -> EngineResult<Vec<Arc<dyn Plugin>>> {
		let mut plugins: Vec<Arc<dyn Plugin>> = Vec::new();

		for factory in self.core.iter().chain(self.provider.iter()) {
			Self::add_plugin(&mut plugins, factory(Arc::clone(ctx)), ctx)?;
		}

		let declared = ctx.service().plugins.clone();
		for name in &declared {
			let factory = self
				.external
				.get(name)
				.ok_or_else(|| EngineError::PluginNotFound { name: name.clone() })?;
			Self::add_plugin(&mut plugins, factory(Arc::clone(ctx)), ctx)?;
		}

		for plugin in &plugins {
			plugin
				.initialize(ctx)
				.await
				.map_err(|source| EngineError::PluginInitialization {
					plugin: plugin.name().to_string(),
					source,
				})?;
		}

		Ok(plugins)
	}

	fn add_plugin(
		plugins: &mut Vec<Arc<dyn Plugin>>,
		plugin: Arc<dyn Plugin>,
		ctx: &Arc<ServiceContext>,
	) -> EngineResult<()> {
		if let Some(provider) = plugin.provider() {
			if provider != ctx.provider_name() {
				debug!(
					target: "lifecycle::plugin::load",
					plugin = plugin.name(),
					provider,
					"skipping plugin for inactive provider"
				);
				return Ok(());
			}
		}

		if plugins.iter().any(|loaded| loaded.name() == plugin.name()) {
			return Err(EngineError::DuplicatePlugin {
				name: plugin.name().to_string(),
			});
		}

		debug!(target: "lifecycle::plugin::load", plugin = plugin.name(), "loaded");
		plugins.push(plugin);
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use stratus_core::{RunOptions, ServiceDescription};

	struct NamedPlugin {
		name: &'static str,
		provider: Option<&'static str>,
	}

	impl Plugin for NamedPlugin {
		fn name(&self) -> &str {
			self.name
		}

		fn provider(&self) -> Option<&str> {
			self.provider
		}
	}

	fn context_with(service: ServiceDescription) -> Arc<ServiceContext> {
		Arc::new(ServiceContext::new(service, RunOptions::new()))
	}

	fn named(name: &'static str) -> impl Fn(Arc<ServiceContext>) -> Arc<dyn Plugin> {
		move |_| {
			Arc::new(NamedPlugin {
				name,
				provider: None,
			})
		}
	}

	#[tokio::test]
	async fn test_load_order_is_core_then_provider_then_user() {
		let mut loader = PluginLoader::new();
		loader.register_provider(named("aws-common"));
		loader.register_core(named("core"));
		loader.register_external("user-plugin", named("user-plugin"));

		let ctx = context_with(
			ServiceDescription::new("svc").with_plugins(["user-plugin"]),
		);
		let plugins = loader.load(&ctx).await.unwrap();
		let names: Vec<_> = plugins.iter().map(|p| p.name()).collect();

		assert_eq!(names, vec!["core", "aws-common", "user-plugin"]);
	}

	#[tokio::test]
	async fn test_inactive_provider_plugins_are_skipped() {
		let mut loader = PluginLoader::new();
		loader.register_provider(|_| {
			Arc::new(NamedPlugin {
				name: "gcp-common",
				provider: Some("gcp"),
			}) as Arc<dyn Plugin>
		});
		loader.register_provider(|_| {
			Arc::new(NamedPlugin {
				name: "aws-common",
				provider: Some("aws"),
			}) as Arc<dyn Plugin>
		});

		let ctx = context_with(ServiceDescription::new("svc").with_provider("aws"));
		let plugins = loader.load(&ctx).await.unwrap();
		let names: Vec<_> = plugins.iter().map(|p| p.name()).collect();

		assert_eq!(names, vec!["aws-common"]);
	}

	#[tokio::test]
	async fn test_duplicate_plugin_is_fatal() {
		let mut loader = PluginLoader::new();
		loader.register_core(named("core"));
		loader.register_core(named("core"));

		let ctx = context_with(ServiceDescription::new("svc"));
		let err = loader.load(&ctx).await.err().unwrap();
		assert!(matches!(err, EngineError::DuplicatePlugin { name } if name == "core"));
	}

	#[tokio::test]
	async fn test_unknown_user_plugin_is_fatal() {
		let loader = PluginLoader::new();
		let ctx = context_with(ServiceDescription::new("svc").with_plugins(["missing"]));

		let err = loader.load(&ctx).await.err().unwrap();
		assert!(matches!(err, EngineError::PluginNotFound { name } if name == "missing"));
	}

	#[tokio::test]
	async fn test_user_declared_order_wins_over_registration_order() {
		let mut loader = PluginLoader::new();
		loader.register_external("a", named("a"));
		loader.register_external("b", named("b"));

		let ctx = context_with(ServiceDescription::new("svc").with_plugins(["b", "a"]));
		let plugins = loader.load(&ctx).await.unwrap();
		let names: Vec<_> = plugins.iter().map(|p| p.name()).collect();

		assert_eq!(names, vec!["b", "a"]);
	}
}
