//! Raw argument splitting
//!
//! The command tree is assembled from plugins at run time, so the command
//! path cannot be a static clap subcommand hierarchy. Instead the binary
//! takes the raw trailing arguments and splits them here: positional
//! segments first, then `--long[=value]` / `-s [value]` options. The
//! resolved path is validated against the merged tree afterwards.

use serde_json::Value;

use stratus_core::{EngineError, EngineResult, RunOptions};

/// Split raw CLI tokens into a command path and resolved options.
///
/// Positional segments end at the first dash-prefixed token. A value
/// token following an option is bound to it; repeated options collect
/// into an array, and `true`/`false` values parse as booleans.
pub fn split(tokens: &[String]) -> EngineResult<(Vec<String>, RunOptions)> {
	let mut path = Vec::new();
	let mut options = RunOptions::new();
	let mut iter = tokens.iter().peekable();
	let mut seen_option = false;

	while let Some(token) = iter.next() {
		let key = if let Some(long) = token.strip_prefix("--") {
			long
		} else if let Some(short) = token.strip_prefix('-') {
			short
		} else {
			if seen_option {
				return Err(EngineError::Config(format!(
					"unexpected argument \"{token}\" after options"
				)));
			}
			path.push(token.clone());
			continue;
		};
		seen_option = true;

		if key.is_empty() {
			return Err(EngineError::Config(format!("malformed option \"{token}\"")));
		}

		let (key, value) = match key.split_once('=') {
			Some((key, value)) => (key, parse_value(value)),
			None => {
				let takes_value = iter.peek().is_some_and(|next| !next.starts_with('-'));
				match iter.next_if(|_| takes_value) {
					Some(value) => (key, parse_value(value)),
					None => (key, Value::Bool(true)),
				}
			}
		};
		push_option(&mut options, key, value);
	}

	Ok((path, options))
}

/// Repeated options accumulate into an array, in input order.
fn push_option(options: &mut RunOptions, key: &str, value: Value) {
	match options.get(key).cloned() {
		None => options.insert(key, value),
		Some(Value::Array(mut items)) => {
			items.push(value);
			options.insert(key, Value::Array(items));
		}
		Some(existing) => options.insert(key, Value::Array(vec![existing, value])),
	}
}

fn parse_value(raw: &str) -> Value {
	match raw {
		"true" => Value::Bool(true),
		"false" => Value::Bool(false),
		_ => Value::String(raw.to_string()),
	}
}
