//! Command declaration fragments
//!
//! Plugins declare partial command trees; the lifecycle engine merges the
//! fragments of every loaded plugin into the global command tree. A
//! fragment is pure data: nothing here resolves, validates against other
//! plugins, or registers hooks.

use indexmap::IndexMap;
use serde_json::Value;

/// How a command participates in the CLI surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommandKind {
	/// Top-level, user-invocable command
	Entrypoint,
	/// Groups subcommands; not itself invocable
	Container,
	/// Nested invocable command
	#[default]
	Child,
	/// Reachable only through `spawn`, hidden from the CLI
	Internal,
}

/// Declared CLI option schema, consumed opaquely by the engine
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionDef {
	pub usage: String,

	/// Single-letter shortcut, folded into the long name before a run
	pub shortcut: Option<String>,

	pub required: bool,

	/// Assigned when the user did not pass the option
	pub default: Option<Value>,
}

impl OptionDef {
	pub fn new(usage: impl Into<String>) -> Self {
		Self {
			usage: usage.into(),
			..Self::default()
		}
	}

	pub fn with_shortcut(mut self, shortcut: impl Into<String>) -> Self {
		self.shortcut = Some(shortcut.into());
		self
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn with_default(mut self, default: impl Into<Value>) -> Self {
		self.default = Some(default.into());
		self
	}
}

/// One node of a plugin's partial command tree
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandDef {
	pub kind: CommandKind,

	/// One-line help text
	pub usage: String,

	/// Ordered lifecycle event names; empty for containers
	pub lifecycle_events: Vec<String>,

	pub options: IndexMap<String, OptionDef>,

	/// Nested fragments, keyed by subcommand name
	pub commands: IndexMap<String, CommandDef>,

	/// Colon-joined alternative paths for this command
	pub aliases: Vec<String>,
}

impl CommandDef {
	pub fn new(usage: impl Into<String>) -> Self {
		Self {
			usage: usage.into(),
			..Self::default()
		}
	}

	/// A command grouping subcommands, not itself invocable.
	pub fn container(usage: impl Into<String>) -> Self {
		Self {
			kind: CommandKind::Container,
			usage: usage.into(),
			..Self::default()
		}
	}

	/// A top-level, user-invocable command.
	pub fn entrypoint(usage: impl Into<String>) -> Self {
		Self {
			kind: CommandKind::Entrypoint,
			usage: usage.into(),
			..Self::default()
		}
	}

	/// A command reachable only through `spawn`.
	pub fn internal() -> Self {
		Self {
			kind: CommandKind::Internal,
			..Self::default()
		}
	}

	pub fn with_lifecycle_events<I, S>(mut self, events: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.lifecycle_events = events.into_iter().map(Into::into).collect();
		self
	}

	pub fn with_option(mut self, name: impl Into<String>, option: OptionDef) -> Self {
		self.options.insert(name.into(), option);
		self
	}

	pub fn with_subcommand(mut self, name: impl Into<String>, command: CommandDef) -> Self {
		self.commands.insert(name.into(), command);
		self
	}

	pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
		self.aliases.push(alias.into());
		self
	}

	pub fn is_invocable(&self) -> bool {
		self.kind != CommandKind::Container
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_builder_preserves_event_order() {
		let def = CommandDef::new("Deploy the service")
			.with_lifecycle_events(["initialize", "package", "deploy"]);
		assert_eq!(def.lifecycle_events, vec!["initialize", "package", "deploy"]);
	}

	#[test]
	fn test_subcommand_insertion_order_is_kept() {
		let def = CommandDef::container("Deployment commands")
			.with_subcommand("function", CommandDef::new("Deploy a single function"))
			.with_subcommand("list", CommandDef::new("List deployments"));

		let names: Vec<_> = def.commands.keys().cloned().collect();
		assert_eq!(names, vec!["function", "list"]);
	}

	#[test]
	fn test_option_builder() {
		let option = OptionDef::new("Stage of the service")
			.with_shortcut("s")
			.with_default(json!("dev"));
		assert_eq!(option.shortcut.as_deref(), Some("s"));
		assert_eq!(option.default, Some(json!("dev")));
		assert!(!option.required);
	}

	#[test]
	fn test_container_is_not_invocable() {
		assert!(!CommandDef::container("x").is_invocable());
		assert!(CommandDef::entrypoint("x").is_invocable());
		assert!(CommandDef::internal().is_invocable());
		assert!(CommandDef::new("x").is_invocable());
	}
}
