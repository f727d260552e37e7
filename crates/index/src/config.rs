//! Registry configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// How [`crate::Registry::lookup`] locates matching records.
///
/// Both strategies return identical results in identical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupStrategy {
	/// Linear pass over every ingested record per lookup.
	Scan,
	/// Capability to record-position map rebuilt on each ingest.
	#[default]
	Indexed,
}

/// Registry settings, as read from TOML:
///
/// ```toml
/// label = "std-docs"
/// lookup = "scan"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
	/// Name attached to the registry's log events.
	pub label: String,
	pub lookup: LookupStrategy,
}

impl Default for RegistryConfig {
	fn default() -> Self {
		Self {
			label: "implementors".to_string(),
			lookup: LookupStrategy::default(),
		}
	}
}

impl RegistryConfig {
	pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
		Ok(toml::from_str(content)?)
	}

	pub fn load(path: &Path) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		Self::from_toml_str(&content)
	}
}
