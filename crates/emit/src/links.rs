//! Link metadata: documentation hrefs and unit file locations for item paths.

use std::collections::BTreeMap;
use std::path::PathBuf;

use implindex::{ItemKind, ItemPath, UnitFormat};

use crate::config::EmitConfig;

/// Directory under the documentation root that holds unit files.
pub const IMPLEMENTORS_DIR: &str = "implementors";

/// Resolves item paths to documentation URLs.
///
/// Items of crates listed in `extern_urls` link absolutely into that crate's hosted
/// docs; everything else links relative to the documentation root.
#[derive(Debug, Clone, Default)]
pub struct DocLinks {
	extern_urls: BTreeMap<String, String>,
}

impl DocLinks {
	pub fn new(extern_urls: BTreeMap<String, String>) -> Self {
		let extern_urls = extern_urls
			.into_iter()
			.map(|(krate, mut url)| {
				if !url.ends_with('/') {
					url.push('/');
				}
				(krate, url)
			})
			.collect();
		Self { extern_urls }
	}

	pub fn from_config(config: &EmitConfig) -> Self {
		Self::new(config.extern_urls.clone())
	}

	/// Href of the page documenting a trait.
	pub fn trait_href(&self, path: &ItemPath) -> String {
		self.item_href(path, "trait")
	}

	/// Href of the page documenting a type of the given kind.
	pub fn type_href(&self, path: &ItemPath, kind: ItemKind) -> String {
		self.item_href(path, kind.as_str())
	}

	/// `krate/module/<item_type>.Name.html`, prefixed with the crate's base URL when
	/// the crate is documented elsewhere.
	pub fn item_href(&self, path: &ItemPath, item_type: &str) -> String {
		let mut href = self.extern_urls.get(path.krate()).cloned().unwrap_or_default();
		if let Some(parent) = path.parent() {
			for segment in parent.split("::") {
				href.push_str(segment);
				href.push('/');
			}
		}
		href.push_str(item_type);
		href.push('.');
		href.push_str(path.name());
		href.push_str(".html");
		href
	}

	pub fn is_extern(&self, krate: &str) -> bool {
		self.extern_urls.contains_key(krate)
	}
}

/// Location of a capability's unit file, relative to the documentation root:
/// `implementors/core/marker/trait.Copy.js`.
pub fn unit_path(capability: &ItemPath, format: UnitFormat) -> PathBuf {
	let mut path = PathBuf::from(IMPLEMENTORS_DIR);
	if let Some(parent) = capability.parent() {
		path.extend(parent.split("::"));
	}
	path.push(format!("trait.{}.{}", capability.name(), format.extension()));
	path
}
