//! Resolved CLI options
//!
//! The options map produced by the argument splitter and consumed, by
//! reference, by every hook handler. Values are opaque JSON values: the
//! engine never interprets them beyond presence checks, shortcut folding
//! and default assignment.

use indexmap::IndexMap;
use serde_json::Value;

/// Resolved CLI options for one invocation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOptions {
	values: IndexMap<String, Value>,
}

impl RunOptions {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.values.get(key)
	}

	/// String form of an option, when it has one.
	pub fn get_str(&self, key: &str) -> Option<&str> {
		self.values.get(key).and_then(Value::as_str)
	}

	/// Boolean flags: `--force` parses to `true`.
	pub fn is_set(&self, key: &str) -> bool {
		match self.values.get(key) {
			Some(Value::Bool(flag)) => *flag,
			Some(_) => true,
			None => false,
		}
	}

	pub fn contains(&self, key: &str) -> bool {
		self.values.contains_key(key)
	}

	pub fn insert(&mut self, key: impl Into<String>, value: Value) {
		self.values.insert(key.into(), value);
	}

	/// Insert only when the key is absent. Used for declared defaults so
	/// explicit user input always wins.
	pub fn insert_default(&mut self, key: &str, value: &Value) {
		if !self.values.contains_key(key) {
			self.values.insert(key.to_string(), value.clone());
		}
	}

	/// Fold a single-letter shortcut into its long option name, keeping
	/// the shortcut entry in place (the original input stays observable).
	pub fn promote_shortcut(&mut self, shortcut: &str, long: &str) {
		if let Some(value) = self.values.get(shortcut).cloned() {
			self.values.entry(long.to_string()).or_insert(value);
		}
	}

	pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
		self.values.iter()
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}
}

impl FromIterator<(String, Value)> for RunOptions {
	fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
		Self {
			values: iter.into_iter().collect(),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_flag_semantics() {
		let mut options = RunOptions::new();
		options.insert("force", json!(true));
		options.insert("stage", json!("dev"));

		assert!(options.is_set("force"));
		assert!(options.is_set("stage"));
		assert!(!options.is_set("verbose"));
		assert_eq!(options.get_str("stage"), Some("dev"));
	}

	#[test]
	fn test_defaults_do_not_override_user_input() {
		let mut options = RunOptions::new();
		options.insert("stage", json!("prod"));
		options.insert_default("stage", &json!("dev"));
		options.insert_default("region", &json!("us-east-1"));

		assert_eq!(options.get_str("stage"), Some("prod"));
		assert_eq!(options.get_str("region"), Some("us-east-1"));
	}

	#[test]
	fn test_shortcut_promotion_keeps_existing_long_option() {
		let mut options = RunOptions::new();
		options.insert("f", json!("resize"));
		options.promote_shortcut("f", "function");
		assert_eq!(options.get_str("function"), Some("resize"));

		let mut explicit = RunOptions::new();
		explicit.insert("f", json!("resize"));
		explicit.insert("function", json!("upload"));
		explicit.promote_shortcut("f", "function");
		assert_eq!(explicit.get_str("function"), Some("upload"));
	}
}
