//! # Stratus Lifecycle
//!
//! The orchestration engine of the Stratus deployment framework.
//!
//! A single CLI invocation is expanded into a deterministic, ordered
//! sequence of hook executions spanning every loaded plugin:
//!
//! ```text
//! plugins → CommandTree::merge → resolve path → expand events → Invoker
//!                                                                  │
//!                                  HookRegistry (load-order) ──────┘
//! ```
//!
//! The engine owns no I/O and no cloud knowledge. It merges command
//! declarations, turns a command's lifecycle events into phase-qualified
//! hook names (`before:<path>:<event>`, `<path>:<event>`,
//! `after:<path>:<event>`), and runs the registered handlers strictly
//! sequentially, aborting the whole run on the first failure.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use indexmap::IndexMap;
//! use stratus_core::{RunOptions, ServiceContext, ServiceDescription};
//! use stratus_lifecycle::PluginManager;
//! use stratus_plugin::{CommandDef, HookBinding, HookFn, Plugin, PluginLoader};
//!
//! struct HelloPlugin;
//!
//! impl Plugin for HelloPlugin {
//! 	fn name(&self) -> &str {
//! 		"hello"
//! 	}
//!
//! 	fn commands(&self) -> IndexMap<String, CommandDef> {
//! 		let mut commands = IndexMap::new();
//! 		commands.insert(
//! 			"hello".to_string(),
//! 			CommandDef::new("Say hello").with_lifecycle_events(["greet"]),
//! 		);
//! 		commands
//! 	}
//!
//! 	fn hooks(&self) -> Vec<HookBinding> {
//! 		vec![HookBinding::new(
//! 			"hello:greet",
//! 			HookFn::new(|_ctx| Box::pin(async { Ok(()) })),
//! 		)]
//! 	}
//! }
//!
//! # tokio_test::block_on(async {
//! let mut loader = PluginLoader::new();
//! loader.register_core(|_| Arc::new(HelloPlugin) as Arc<dyn Plugin>);
//!
//! let ctx = Arc::new(ServiceContext::new(
//! 	ServiceDescription::new("demo"),
//! 	RunOptions::new(),
//! ));
//! let manager = PluginManager::build(&loader, ctx).await.unwrap();
//! manager.run(&["hello".to_string()]).await.unwrap();
//! # });
//! ```

pub mod expand;
pub mod invoker;
pub mod manager;
pub mod registry;
pub mod tree;

pub use expand::{HookPhase, RUN_LEVEL_HOOKS, expand, is_well_formed};
pub use invoker::Invoker;
pub use manager::PluginManager;
pub use registry::{HookRegistry, RegisteredHook};
pub use tree::{CommandNode, CommandTree};
