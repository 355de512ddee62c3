//! Lifecycle event expansion
//!
//! A pure mapping from a command's declared structure to the ordered list
//! of qualified hook names for one invocation. No registry lookups happen
//! here: the expansion is the same whether or not anything registered for
//! the produced names.

use crate::tree::CommandNode;

/// Hook names the run loop consumes outside any command lifecycle:
/// `initialize` before the command, `error` after a failure, `finalize`
/// after success.
pub const RUN_LEVEL_HOOKS: &[&str] = &["initialize", "error", "finalize"];

/// Phases applied to every lifecycle event, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
	Before,
	At,
	After,
}

impl HookPhase {
	pub const ALL: [HookPhase; 3] = [HookPhase::Before, HookPhase::At, HookPhase::After];

	pub fn prefix(&self) -> &'static str {
		match self {
			HookPhase::Before => "before:",
			HookPhase::At => "",
			HookPhase::After => "after:",
		}
	}
}

/// Qualified hook names for `command`, in invocation order.
///
/// For each lifecycle event `e`, in declared order, three names are
/// produced: `before:<path>:<e>`, `<path>:<e>`, `after:<path>:<e>`. All
/// phases of event *i* precede every phase of event *i + 1*.
pub fn expand(command: &CommandNode) -> Vec<String> {
	let key = command.key();
	let mut names = Vec::with_capacity(command.lifecycle_events.len() * HookPhase::ALL.len());
	for event in &command.lifecycle_events {
		for phase in HookPhase::ALL {
			names.push(format!("{}{key}:{event}", phase.prefix()));
		}
	}
	names
}

/// Whether a registered hook name matches the qualified-name grammar
/// `[before:|after:]?<segment>(:<segment>)*:<event>` or one of the
/// run-level names.
///
/// Malformed names are still registered (they are at worst dead hooks),
/// but flagging them at registration catches typos that would otherwise
/// be silent no-ops.
pub fn is_well_formed(name: &str) -> bool {
	if RUN_LEVEL_HOOKS.contains(&name) {
		return true;
	}
	let rest = name
		.strip_prefix("before:")
		.or_else(|| name.strip_prefix("after:"))
		.unwrap_or(name);
	let mut segments = 0;
	for segment in rest.split(':') {
		if segment.is_empty()
			|| !segment
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
		{
			return false;
		}
		segments += 1;
	}
	segments >= 2
}
