//! # Stratus Plugin
//!
//! The plugin contract of the Stratus deployment framework.
//!
//! A Stratus plugin contributes two things: a partial command tree
//! ([`CommandDef`] fragments) and hook registrations ([`HookBinding`])
//! against qualified lifecycle names. The orchestration engine in
//! `stratus-lifecycle` merges the fragments of every loaded plugin and
//! drives the hooks; this crate only defines the boundary.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use indexmap::IndexMap;
//! use stratus_plugin::{CommandDef, HookBinding, HookFn, Plugin};
//!
//! struct GreetPlugin;
//!
//! impl Plugin for GreetPlugin {
//! 	fn name(&self) -> &str {
//! 		"greet"
//! 	}
//!
//! 	fn commands(&self) -> IndexMap<String, CommandDef> {
//! 		let mut commands = IndexMap::new();
//! 		commands.insert(
//! 			"greet".to_string(),
//! 			CommandDef::new("Print a greeting").with_lifecycle_events(["greet"]),
//! 		);
//! 		commands
//! 	}
//!
//! 	fn hooks(&self) -> Vec<HookBinding> {
//! 		vec![HookBinding::new(
//! 			"greet:greet",
//! 			HookFn::new(|_ctx| Box::pin(async { Ok(()) })),
//! 		)]
//! 	}
//! }
//! ```

pub mod declaration;
pub mod hooks;
pub mod loader;
pub mod plugin;

pub use declaration::{CommandDef, CommandKind, OptionDef};
pub use hooks::{
	ChainTermination, HookBinding, HookContext, HookError, HookFn, HookHandler, HookResult,
	SpawnOptions, Spawner,
};
pub use loader::{PluginFactory, PluginLoader};
pub use plugin::Plugin;
