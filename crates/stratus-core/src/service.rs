//! Service description
//!
//! The declarative description of the service being deployed, loaded once
//! per invocation from the service file (`stratus.yml`) and shared by
//! reference with every hook handler. The engine treats everything below
//! the top-level keys as opaque data for the provider compilers; no
//! variable interpolation or schema validation happens here.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{EngineError, EngineResult};

/// File names probed, in order, when no explicit config path is given
const SERVICE_FILE_NAMES: &[&str] = &["stratus.yml", "stratus.yaml", "stratus.json"];

/// Provider section of the service description
///
/// Only `name` is meaningful to the engine (plugin filtering); the rest is
/// carried verbatim for provider plugins.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProviderConfig {
	#[serde(default)]
	pub name: String,

	#[serde(flatten)]
	pub settings: IndexMap<String, Value>,
}

/// The declarative service description
///
/// Mutable and shared by reference across all handlers of a run. The
/// single-writer invariant holds: exactly one handler executes at a time,
/// so there is never more than one concurrent mutator.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceDescription {
	/// Service name, unique per stage/region from the provider's viewpoint
	#[serde(default)]
	pub service: String,

	#[serde(default)]
	pub provider: ProviderConfig,

	/// User-declared plugins, in declared order
	#[serde(default)]
	pub plugins: Vec<String>,

	/// Free-form plugin configuration
	#[serde(default)]
	pub custom: IndexMap<String, Value>,

	/// Function definitions, opaque to the engine
	#[serde(default)]
	pub functions: IndexMap<String, Value>,

	/// Extra resources passed through to the provider template, opaque
	#[serde(default)]
	pub resources: IndexMap<String, Value>,
}

impl ServiceDescription {
	pub fn new(service: impl Into<String>) -> Self {
		Self {
			service: service.into(),
			..Self::default()
		}
	}

	pub fn with_provider(mut self, name: impl Into<String>) -> Self {
		self.provider.name = name.into();
		self
	}

	pub fn with_plugins<I, S>(mut self, plugins: I) -> Self
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.plugins = plugins.into_iter().map(Into::into).collect();
		self
	}

	/// Parse a service description from YAML (also accepts JSON, which is
	/// a YAML subset).
	pub fn from_yaml(input: &str) -> EngineResult<Self> {
		serde_yaml::from_str(input).map_err(|err| EngineError::Config(err.to_string()))
	}

	/// Load the service description from a file.
	pub fn from_file(path: &Path) -> EngineResult<Self> {
		let raw = std::fs::read_to_string(path).map_err(|err| {
			EngineError::Config(format!("cannot read {}: {err}", path.display()))
		})?;
		let service = Self::from_yaml(&raw)?;
		tracing::debug!(
			target: "stratus::config",
			service = %service.service,
			provider = %service.provider.name,
			plugins = service.plugins.len(),
			"service description loaded"
		);
		Ok(service)
	}

	/// Probe `dir` for a service file, returning the first match.
	pub fn discover(dir: &Path) -> Option<PathBuf> {
		SERVICE_FILE_NAMES
			.iter()
			.map(|name| dir.join(name))
			.find(|candidate| candidate.is_file())
	}

	/// Whether a service description was actually configured, as opposed
	/// to the empty default used for service-independent commands.
	pub fn is_configured(&self) -> bool {
		!self.service.is_empty()
	}
}
