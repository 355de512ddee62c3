//! Command tree merging
//!
//! Folds every plugin's partial command declarations into one global
//! command tree, in plugin-load order, rejecting incompatible
//! redeclarations. The merged tree is built once per invocation and is
//! immutable afterwards.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use stratus_core::{EngineError, EngineResult};
use stratus_plugin::{CommandDef, CommandKind, OptionDef, Plugin};

/// One command of the merged global tree
#[derive(Debug, Clone)]
pub struct CommandNode {
	pub name: String,

	/// Full path from the root; globally unique
	pub path: Vec<String>,

	pub kind: CommandKind,

	pub usage: String,

	/// Ordered lifecycle event names; empty for containers
	pub lifecycle_events: Vec<String>,

	pub options: IndexMap<String, OptionDef>,

	pub subcommands: IndexMap<String, CommandNode>,

	/// Plugin that first declared this path, for diagnostics
	pub plugin: String,
}

impl CommandNode {
	/// Colon-joined path, the form used inside qualified hook names.
	pub fn key(&self) -> String {
		self.path.join(":")
	}

	/// Space-joined path, the form users type.
	pub fn display_path(&self) -> String {
		self.path.join(" ")
	}
}

#[derive(Debug, Default)]
struct AliasNode {
	/// Colon-joined target command path, when this node terminates an alias
	command: Option<String>,
	children: IndexMap<String, AliasNode>,
}

/// The merged global command tree plus the alias trie
#[derive(Debug, Default)]
pub struct CommandTree {
	commands: IndexMap<String, CommandNode>,
	aliases: AliasNode,
}

impl CommandTree {
	/// Fold the command declarations of `plugins`, in load order, into one
	/// tree.
	pub fn merge(plugins: &[Arc<dyn Plugin>]) -> EngineResult<Self> {
		let mut tree = Self::default();
		for plugin in plugins {
			for (name, def) in plugin.commands() {
				tree.attach(&name, def, plugin.name())?;
			}
		}
		Ok(tree)
	}

	/// Attach one top-level declaration fragment.
	pub fn attach(&mut self, name: &str, def: CommandDef, plugin: &str) -> EngineResult<()> {
		let mut pending_aliases = Vec::new();
		Self::attach_into(
			&mut self.commands,
			&self.aliases,
			&[],
			name,
			def,
			plugin,
			&mut pending_aliases,
		)?;
		for (alias, target) in pending_aliases {
			self.register_alias(&alias, &target)?;
		}
		Ok(())
	}

	/// Resolve a CLI path to a command.
	///
	/// Aliases are resolved first, then the path segments are walked.
	/// Internal commands resolve only when `allow_internal` is set (the
	/// spawn path); a trailing container resolves to itself so the
	/// caller can render its subcommands.
	pub fn get(&self, path: &[String], allow_internal: bool) -> EngineResult<&CommandNode> {
		let unknown = || EngineError::UnknownCommand {
			path: path.join(" "),
		};

		let effective = match self.alias_target(path) {
			Some(target) => target.split(':').map(str::to_string).collect(),
			None => path.to_vec(),
		};
		if effective.is_empty() {
			return Err(unknown());
		}

		let mut current = &self.commands;
		for (index, segment) in effective.iter().enumerate() {
			let node = current.get(segment).ok_or_else(unknown)?;
			if node.kind == CommandKind::Internal && !allow_internal {
				return Err(unknown());
			}
			if index == effective.len() - 1 {
				return Ok(node);
			}
			current = &node.subcommands;
		}
		unreachable!("loop returns on the last segment")
	}

	/// The commands reachable from the CLI: every node except internal
	/// ones (and their subtrees), flattened in declaration order.
	pub fn public_commands(&self) -> Vec<&CommandNode> {
		let mut result = Vec::new();
		let mut stack: Vec<&IndexMap<String, CommandNode>> = vec![&self.commands];
		while let Some(level) = stack.pop() {
			for node in level.values() {
				if node.kind == CommandKind::Internal {
					continue;
				}
				result.push(node);
				stack.push(&node.subcommands);
			}
		}
		result
	}

	/// Alias target for `path`, when the whole path names an alias.
	fn alias_target(&self, path: &[String]) -> Option<&str> {
		let mut node = &self.aliases;
		for segment in path {
			node = node.children.get(segment)?;
		}
		node.command.as_deref()
	}

	fn register_alias(&mut self, alias: &str, target: &str) -> EngineResult<()> {
		// An alias that is a prefix of its own target would shadow the
		// command it points at.
		if target.starts_with(alias) {
			return Err(EngineError::InvalidAlias {
				alias: alias.to_string(),
				reason: "alias would shadow its own command".to_string(),
			});
		}

		let segments: Vec<&str> = alias.split(':').collect();

		// The alias must not occupy the path of a real command.
		let mut commands = Some(&self.commands);
		let mut shadowed = true;
		for segment in &segments {
			match commands.and_then(|map| map.get(*segment)) {
				Some(node) => commands = Some(&node.subcommands),
				None => {
					shadowed = false;
					break;
				}
			}
		}
		if shadowed {
			return Err(EngineError::InvalidAlias {
				alias: alias.to_string(),
				reason: "cannot override an existing command".to_string(),
			});
		}

		let mut node = &mut self.aliases;
		for segment in &segments {
			node = node.children.entry(segment.to_string()).or_default();
		}
		if let Some(existing) = &node.command {
			return Err(EngineError::AliasConflict {
				alias: alias.to_string(),
				existing: existing.clone(),
			});
		}
		debug!(target: "lifecycle::command::register", alias, command = target, "alias");
		node.command = Some(target.to_string());
		Ok(())
	}

	#[allow(clippy::too_many_arguments)]
	fn attach_into(
		map: &mut IndexMap<String, CommandNode>,
		aliases: &AliasNode,
		parent_path: &[String],
		name: &str,
		def: CommandDef,
		plugin: &str,
		pending_aliases: &mut Vec<(String, String)>,
	) -> EngineResult<()> {
		let mut path = parent_path.to_vec();
		path.push(name.to_string());
		let key = path.join(":");

		Self::validate_declaration(&path, &def)?;
		if Self::alias_occupies(aliases, &path) {
			return Err(EngineError::InvalidCommand {
				path: key,
				reason: "cannot override an existing alias".to_string(),
			});
		}

		match map.get_mut(name) {
			None => {
				let node = Self::build_node(aliases, &path, name, def, plugin, pending_aliases)?;
				debug!(target: "lifecycle::command::register", command = %key, plugin, "register");
				map.insert(name.to_string(), node);
				Ok(())
			}
			Some(existing) => {
				// Only a pure container extension of a container is a
				// legal redeclaration; everything else collides,
				// including turning a container into an invocable leaf.
				let extends_container = existing.kind == CommandKind::Container
					&& def.kind == CommandKind::Container;
				if !extends_container {
					return Err(EngineError::CommandConflict {
						path: key,
						first: existing.plugin.clone(),
						second: plugin.to_string(),
					});
				}

				for (option_name, option) in def.options {
					existing.options.entry(option_name).or_insert(option);
				}
				for alias in &def.aliases {
					pending_aliases.push((alias.clone(), key.clone()));
				}
				for (sub_name, sub_def) in def.commands {
					Self::attach_into(
						&mut existing.subcommands,
						aliases,
						&path,
						&sub_name,
						sub_def,
						plugin,
						pending_aliases,
					)?;
				}
				Ok(())
			}
		}
	}

	fn build_node(
		aliases: &AliasNode,
		path: &[String],
		name: &str,
		def: CommandDef,
		plugin: &str,
		pending_aliases: &mut Vec<(String, String)>,
	) -> EngineResult<CommandNode> {
		let key = path.join(":");
		for alias in &def.aliases {
			pending_aliases.push((alias.clone(), key.clone()));
		}

		let mut subcommands = IndexMap::new();
		for (sub_name, sub_def) in def.commands {
			Self::attach_into(
				&mut subcommands,
				aliases,
				path,
				&sub_name,
				sub_def,
				plugin,
				pending_aliases,
			)?;
		}

		Ok(CommandNode {
			name: name.to_string(),
			path: path.to_vec(),
			kind: def.kind,
			usage: def.usage,
			lifecycle_events: def.lifecycle_events,
			options: def.options,
			subcommands,
			plugin: plugin.to_string(),
		})
	}

	fn validate_declaration(path: &[String], def: &CommandDef) -> EngineResult<()> {
		let key = path.join(":");
		if def.kind == CommandKind::Container && !def.lifecycle_events.is_empty() {
			return Err(EngineError::InvalidCommand {
				path: key,
				reason: "container commands cannot declare lifecycle events".to_string(),
			});
		}
		for (index, event) in def.lifecycle_events.iter().enumerate() {
			if def.lifecycle_events[..index].contains(event) {
				return Err(EngineError::InvalidCommand {
					path: key,
					reason: format!("duplicate lifecycle event \"{event}\""),
				});
			}
		}
		Ok(())
	}

	fn alias_occupies(aliases: &AliasNode, path: &[String]) -> bool {
		let mut node = aliases;
		for segment in path {
			match node.children.get(segment) {
				Some(child) => node = child,
				None => return false,
			}
		}
		node.command.is_some()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	struct DeclaringPlugin {
		name: &'static str,
		commands: IndexMap<String, CommandDef>,
	}

	impl Plugin for DeclaringPlugin {
		fn name(&self) -> &str {
			self.name
		}

		fn commands(&self) -> IndexMap<String, CommandDef> {
			self.commands.clone()
		}
	}

	fn plugin_with(name: &'static str, commands: Vec<(&str, CommandDef)>) -> Arc<dyn Plugin> {
		Arc::new(DeclaringPlugin {
			name,
			commands: commands
				.into_iter()
				.map(|(k, v)| (k.to_string(), v))
				.collect(),
		})
	}

	fn path(segments: &[&str]) -> Vec<String> {
		segments.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn test_merge_disjoint_plugins_is_the_union() {
		let plugins = vec![
			plugin_with(
				"core",
				vec![(
					"deploy",
					CommandDef::new("Deploy").with_lifecycle_events(["deploy"]),
				)],
			),
			plugin_with(
				"info",
				vec![(
					"info",
					CommandDef::new("Info").with_lifecycle_events(["info"]),
				)],
			),
		];

		let tree = CommandTree::merge(&plugins).unwrap();
		assert!(tree.get(&path(&["deploy"]), false).is_ok());
		assert!(tree.get(&path(&["info"]), false).is_ok());
		assert_eq!(tree.public_commands().len(), 2);
	}

	#[test]
	fn test_conflicting_declarations_name_both_plugins() {
		let plugins = vec![
			plugin_with(
				"first-deploy",
				vec![(
					"deploy",
					CommandDef::new("Deploy").with_lifecycle_events(["deploy"]),
				)],
			),
			plugin_with(
				"second-deploy",
				vec![(
					"deploy",
					CommandDef::new("Deploy again").with_lifecycle_events(["deploy"]),
				)],
			),
		];

		let err = CommandTree::merge(&plugins).unwrap_err();
		match err {
			EngineError::CommandConflict {
				path,
				first,
				second,
			} => {
				assert_eq!(path, "deploy");
				assert_eq!(first, "first-deploy");
				assert_eq!(second, "second-deploy");
			}
			other => panic!("expected CommandConflict, got {other:?}"),
		}
	}

	#[test]
	fn test_container_extension_is_not_a_conflict() {
		let plugins = vec![
			plugin_with(
				"core",
				vec![(
					"config",
					CommandDef::container("Configuration").with_subcommand(
						"credentials",
						CommandDef::new("Manage credentials").with_lifecycle_events(["store"]),
					),
				)],
			),
			plugin_with(
				"tabcompletion",
				vec![(
					"config",
					CommandDef::container("Configuration").with_subcommand(
						"tabcompletion",
						CommandDef::new("Install completion").with_lifecycle_events(["install"]),
					),
				)],
			),
		];

		let tree = CommandTree::merge(&plugins).unwrap();
		assert!(tree.get(&path(&["config", "credentials"]), false).is_ok());
		assert!(tree.get(&path(&["config", "tabcompletion"]), false).is_ok());
	}

	#[test]
	fn test_duplicate_subcommand_in_union_is_a_conflict() {
		let plugins = vec![
			plugin_with(
				"core",
				vec![(
					"config",
					CommandDef::container("Configuration").with_subcommand(
						"credentials",
						CommandDef::new("Manage credentials").with_lifecycle_events(["store"]),
					),
				)],
			),
			plugin_with(
				"other",
				vec![(
					"config",
					CommandDef::container("Configuration").with_subcommand(
						"credentials",
						CommandDef::new("Also credentials").with_lifecycle_events(["store"]),
					),
				)],
			),
		];

		let err = CommandTree::merge(&plugins).unwrap_err();
		assert!(
			matches!(err, EngineError::CommandConflict { path, .. } if path == "config:credentials")
		);
	}

	#[test]
	fn test_container_later_made_invocable_is_a_conflict() {
		let plugins = vec![
			plugin_with(
				"core",
				vec![("config", CommandDef::container("Configuration"))],
			),
			plugin_with(
				"other",
				vec![(
					"config",
					CommandDef::new("Configure").with_lifecycle_events(["configure"]),
				)],
			),
		];

		let err = CommandTree::merge(&plugins).unwrap_err();
		assert!(matches!(err, EngineError::CommandConflict { path, .. } if path == "config"));
	}

	#[test]
	fn test_unknown_path_fails_resolution() {
		let tree = CommandTree::merge(&[]).unwrap();
		let err = tree.get(&path(&["deploy", "everything"]), false).unwrap_err();
		assert!(
			matches!(err, EngineError::UnknownCommand { path } if path == "deploy everything")
		);
	}

	#[test]
	fn test_internal_commands_resolve_only_when_allowed() {
		let plugins = vec![plugin_with(
			"core",
			vec![(
				"package-internal",
				CommandDef::internal().with_lifecycle_events(["package"]),
			)],
		)];
		let tree = CommandTree::merge(&plugins).unwrap();

		assert!(tree.get(&path(&["package-internal"]), false).is_err());
		assert!(tree.get(&path(&["package-internal"]), true).is_ok());
		assert!(tree.public_commands().is_empty());
	}

	#[test]
	fn test_trailing_container_resolves_to_itself() {
		let plugins = vec![plugin_with(
			"core",
			vec![(
				"config",
				CommandDef::container("Configuration").with_subcommand(
					"credentials",
					CommandDef::new("Credentials").with_lifecycle_events(["store"]),
				),
			)],
		)];
		let tree = CommandTree::merge(&plugins).unwrap();

		let node = tree.get(&path(&["config"]), false).unwrap();
		assert_eq!(node.kind, CommandKind::Container);
	}

	#[test]
	fn test_alias_resolves_to_its_target() {
		let plugins = vec![plugin_with(
			"core",
			vec![(
				"deploy",
				CommandDef::container("Deployment").with_subcommand(
					"function",
					CommandDef::new("Deploy one function")
						.with_lifecycle_events(["deploy"])
						.with_alias("function-deploy"),
				),
			)],
		)];
		let tree = CommandTree::merge(&plugins).unwrap();

		let node = tree.get(&path(&["function-deploy"]), false).unwrap();
		assert_eq!(node.key(), "deploy:function");
	}

	#[test]
	fn test_alias_conflicts_are_fatal() {
		let plugins = vec![
			plugin_with(
				"core",
				vec![(
					"deploy",
					CommandDef::new("Deploy")
						.with_lifecycle_events(["deploy"])
						.with_alias("ship"),
				)],
			),
			plugin_with(
				"other",
				vec![(
					"publish",
					CommandDef::new("Publish")
						.with_lifecycle_events(["publish"])
						.with_alias("ship"),
				)],
			),
		];

		let err = CommandTree::merge(&plugins).unwrap_err();
		assert!(matches!(
			err,
			EngineError::AliasConflict { alias, existing } if alias == "ship" && existing == "deploy"
		));
	}

	#[test]
	fn test_alias_cannot_shadow_a_command() {
		let plugins = vec![
			plugin_with(
				"core",
				vec![(
					"deploy",
					CommandDef::new("Deploy").with_lifecycle_events(["deploy"]),
				)],
			),
			plugin_with(
				"other",
				vec![(
					"publish",
					CommandDef::new("Publish")
						.with_lifecycle_events(["publish"])
						.with_alias("deploy"),
				)],
			),
		];

		let err = CommandTree::merge(&plugins).unwrap_err();
		assert!(matches!(err, EngineError::InvalidAlias { alias, .. } if alias == "deploy"));
	}

	#[test]
	fn test_command_cannot_override_an_alias() {
		let plugins = vec![
			plugin_with(
				"core",
				vec![(
					"deploy",
					CommandDef::new("Deploy")
						.with_lifecycle_events(["deploy"])
						.with_alias("publish"),
				)],
			),
			plugin_with(
				"other",
				vec![(
					"publish",
					CommandDef::new("Publish").with_lifecycle_events(["publish"]),
				)],
			),
		];

		let err = CommandTree::merge(&plugins).unwrap_err();
		assert!(matches!(err, EngineError::InvalidCommand { path, .. } if path == "publish"));
	}

	#[rstest]
	#[case::container_with_events(
		CommandDef::container("Bad").with_lifecycle_events(["x"])
	)]
	#[case::duplicate_events(
		CommandDef::new("Bad").with_lifecycle_events(["x", "x"])
	)]
	fn test_malformed_declarations_are_rejected(#[case] def: CommandDef) {
		let plugins = vec![plugin_with("core", vec![("bad", def)])];
		let err = CommandTree::merge(&plugins).unwrap_err();
		assert!(matches!(err, EngineError::InvalidCommand { .. }));
	}

	#[test]
	fn test_merge_is_deterministic_across_runs() {
		let build = || {
			let plugins = vec![
				plugin_with(
					"core",
					vec![
						(
							"deploy",
							CommandDef::new("Deploy").with_lifecycle_events(["deploy"]),
						),
						(
							"info",
							CommandDef::new("Info").with_lifecycle_events(["info"]),
						),
					],
				),
				plugin_with(
					"provider",
					vec![(
						"metrics",
						CommandDef::new("Metrics").with_lifecycle_events(["collect"]),
					)],
				),
			];
			CommandTree::merge(&plugins).unwrap()
		};

		let first = build();
		let second = build();
		let keys = |tree: &CommandTree| {
			tree.public_commands()
				.iter()
				.map(|node| node.key())
				.collect::<Vec<_>>()
		};
		assert_eq!(keys(&first), keys(&second));
	}
}
