//! Engine error taxonomy
//!
//! Every failure the orchestration core can surface is an [`EngineError`].
//! The engine performs no local recovery: all variants propagate to the
//! top-level caller unchanged. Compensating behavior (stack rollback and
//! the like) is implemented as ordinary hooks by provider plugins, never
//! by the engine itself.

use thiserror::Error;

/// Opaque cause carried by a failed hook handler.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced by the orchestration engine
#[derive(Debug, Error)]
pub enum EngineError {
	/// Two plugins declared incompatible commands at the same path.
	/// Construction-time and fatal.
	#[error(
		"Conflicting definitions for command \"{path}\": declared by plugin \"{first}\", redeclared by plugin \"{second}\""
	)]
	CommandConflict {
		path: String,
		first: String,
		second: String,
	},

	/// A single plugin declared a command that violates the declaration
	/// rules (duplicate lifecycle events, container with events, ...).
	#[error("Invalid command declaration \"{path}\": {reason}")]
	InvalidCommand { path: String, reason: String },

	/// The requested CLI path does not resolve to an invocable command.
	#[error("Unrecognized command \"{path}\"")]
	UnknownCommand { path: String },

	/// A hook handler signaled failure; fatal to the current run.
	#[error("Hook \"{hook}\" of plugin \"{plugin}\" failed")]
	HandlerFailure {
		hook: String,
		plugin: String,
		#[source]
		source: BoxError,
	},

	/// User-initiated interruption, observed between handler invocations.
	/// Non-error termination with a distinct exit code.
	#[error("Run interrupted")]
	Cancelled,

	/// The same plugin was registered twice.
	#[error(
		"Encountered duplicate plugin definition \"{name}\". Please remove duplicate plugins from your configuration"
	)]
	DuplicatePlugin { name: String },

	/// A user-declared plugin name has no known implementation.
	#[error("Plugin \"{name}\" not found. Make sure it is listed in the \"plugins\" section of your service file and available to the CLI")]
	PluginNotFound { name: String },

	/// A plugin failed its post-instantiation initialization.
	#[error("Plugin \"{plugin}\" failed to initialize")]
	PluginInitialization {
		plugin: String,
		#[source]
		source: BoxError,
	},

	/// An alias is already bound to another command.
	#[error("Alias \"{alias}\" is already defined for command \"{existing}\"")]
	AliasConflict { alias: String, existing: String },

	/// An alias declaration that can never be honored.
	#[error("Invalid command alias \"{alias}\": {reason}")]
	InvalidAlias { alias: String, reason: String },

	/// Service description could not be loaded or parsed.
	#[error("Failed to load service configuration: {0}")]
	Config(String),
}

impl EngineError {
	/// Process exit code for this error.
	///
	/// `Cancelled` is not a failure: it exits with the conventional
	/// interrupt code so callers can tell the two apart.
	pub fn exit_code(&self) -> i32 {
		match self {
			EngineError::Cancelled => 130,
			_ => 1,
		}
	}

	/// Qualified hook name, when the error originated inside a handler.
	pub fn hook(&self) -> Option<&str> {
		match self {
			EngineError::HandlerFailure { hook, .. } => Some(hook),
			_ => None,
		}
	}

	/// Owning plugin, when one is known.
	pub fn plugin(&self) -> Option<&str> {
		match self {
			EngineError::HandlerFailure { plugin, .. } => Some(plugin),
			EngineError::PluginInitialization { plugin, .. } => Some(plugin),
			EngineError::DuplicatePlugin { name } => Some(name),
			EngineError::PluginNotFound { name } => Some(name),
			_ => None,
		}
	}
}

pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_cancelled_has_distinct_exit_code() {
		assert_eq!(EngineError::Cancelled.exit_code(), 130);
		assert_eq!(
			EngineError::UnknownCommand {
				path: "deploy".to_string()
			}
			.exit_code(),
			1
		);
	}

	#[test]
	fn test_handler_failure_carries_diagnostic_triple() {
		let err = EngineError::HandlerFailure {
			hook: "before:deploy:deploy".to_string(),
			plugin: "aws-deploy".to_string(),
			source: "stack update failed".into(),
		};

		assert_eq!(err.hook(), Some("before:deploy:deploy"));
		assert_eq!(err.plugin(), Some("aws-deploy"));
		let source = std::error::Error::source(&err).expect("source should be preserved");
		assert_eq!(source.to_string(), "stack update failed");
	}

	#[test]
	fn test_conflict_message_names_both_plugins() {
		let err = EngineError::CommandConflict {
			path: "deploy".to_string(),
			first: "core".to_string(),
			second: "legacy-deploy".to_string(),
		};
		let message = err.to_string();
		assert!(message.contains("core"));
		assert!(message.contains("legacy-deploy"));
		assert!(message.contains("deploy"));
	}
}
