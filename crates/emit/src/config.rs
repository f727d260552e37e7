//! Emitter configuration.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use implindex::UnitFormat;
use serde::{Deserialize, Serialize};

use crate::error::EmitError;

const RUST_DOCS: &str = "https://doc.rust-lang.org/nightly/";

/// Where and how unit files are written.
///
/// ```toml
/// out_dir = "target/doc"
/// format = "json"
///
/// [extern_urls]
/// serde = "https://docs.rs/serde/latest/"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EmitConfig {
	/// Documentation root; unit files go under `<out_dir>/implementors/`.
	pub out_dir: PathBuf,
	pub format: UnitFormat,
	/// Crates documented elsewhere, mapped to the base URL of their docs.
	/// Entries here are merged over the standard library defaults.
	pub extern_urls: BTreeMap<String, String>,
}

impl Default for EmitConfig {
	fn default() -> Self {
		Self {
			out_dir: PathBuf::from("doc"),
			format: UnitFormat::default(),
			extern_urls: default_extern_urls(),
		}
	}
}

fn default_extern_urls() -> BTreeMap<String, String> {
	["core", "alloc", "std"]
		.into_iter()
		.map(|krate| (krate.to_string(), RUST_DOCS.to_string()))
		.collect()
}

impl EmitConfig {
	pub fn from_toml_str(content: &str) -> Result<Self, EmitError> {
		let mut config: Self = toml::from_str(content)?;
		for (krate, url) in default_extern_urls() {
			config.extern_urls.entry(krate).or_insert(url);
		}
		Ok(config)
	}

	pub fn load(path: &Path) -> Result<Self, EmitError> {
		let content = std::fs::read_to_string(path).map_err(EmitError::io(path))?;
		Self::from_toml_str(&content)
	}
}
