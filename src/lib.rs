//! # Stratus
//!
//! A pluggable infrastructure-deployment framework for Rust.
//!
//! Stratus translates a declarative service description into cloud
//! provider operations, executed through independently loaded plugins.
//! Plugins contribute partial command trees and hook registrations; the
//! engine merges the trees, expands a command's lifecycle events into
//! phase-qualified hook names and runs the registered handlers strictly
//! sequentially, aborting the whole run on the first failure.
//!
//! This facade crate re-exports the public surface of the member crates:
//!
//! - [`core`]: error taxonomy, service description, options, context
//! - [`plugin`]: the [`Plugin`] capability, command declarations, hooks
//! - [`lifecycle`]: command tree, expansion, registry, invoker, manager
//!
//! ## Quick Example
//!
//! ```rust
//! use std::sync::Arc;
//! use indexmap::IndexMap;
//! use stratus::core::{RunOptions, ServiceContext, ServiceDescription};
//! use stratus::lifecycle::PluginManager;
//! use stratus::plugin::{CommandDef, HookBinding, HookFn, Plugin, PluginLoader};
//!
//! struct StatusPlugin;
//!
//! impl Plugin for StatusPlugin {
//! 	fn name(&self) -> &str {
//! 		"status"
//! 	}
//!
//! 	fn commands(&self) -> IndexMap<String, CommandDef> {
//! 		let mut commands = IndexMap::new();
//! 		commands.insert(
//! 			"status".to_string(),
//! 			CommandDef::entrypoint("Show deployment status").with_lifecycle_events(["status"]),
//! 		);
//! 		commands
//! 	}
//!
//! 	fn hooks(&self) -> Vec<HookBinding> {
//! 		vec![HookBinding::new(
//! 			"status:status",
//! 			HookFn::new(|_ctx| Box::pin(async { Ok(()) })),
//! 		)]
//! 	}
//! }
//!
//! # tokio_test::block_on(async {
//! let mut loader = PluginLoader::new();
//! loader.register_core(|_| Arc::new(StatusPlugin) as Arc<dyn Plugin>);
//!
//! let ctx = Arc::new(ServiceContext::new(
//! 	ServiceDescription::new("demo"),
//! 	RunOptions::new(),
//! ));
//! let manager = PluginManager::build(&loader, ctx).await.unwrap();
//! manager.run(&["status".to_string()]).await.unwrap();
//! # });
//! ```

pub use stratus_core as core;
pub use stratus_lifecycle as lifecycle;
pub use stratus_plugin as plugin;

// Re-export the types almost every consumer touches.
pub use stratus_core::{EngineError, EngineResult, RunOptions, ServiceContext, ServiceDescription};
pub use stratus_lifecycle::PluginManager;
pub use stratus_plugin::{CommandDef, CommandKind, HookBinding, HookContext, HookHandler, Plugin, PluginLoader};
