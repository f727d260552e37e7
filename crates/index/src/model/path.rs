use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

macro_rules! string_identity {
	($(#[$attr:meta])* $name:ident) => {
		$(#[$attr])*
		#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(Arc<str>);

		impl $name {
			/// Creates an identity from any string-like value.
			pub fn new(value: impl Into<Arc<str>>) -> Self {
				Self(value.into())
			}

			pub fn as_str(&self) -> &str {
				&self.0
			}

			pub fn is_empty(&self) -> bool {
				self.0.is_empty()
			}
		}

		impl fmt::Display for $name {
			fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
				f.write_str(&self.0)
			}
		}

		impl Borrow<str> for $name {
			fn borrow(&self) -> &str {
				&self.0
			}
		}

		impl AsRef<str> for $name {
			fn as_ref(&self) -> &str {
				&self.0
			}
		}

		impl From<&str> for $name {
			fn from(value: &str) -> Self {
				Self(value.into())
			}
		}

		impl From<String> for $name {
			fn from(value: String) -> Self {
				Self(value.into())
			}
		}
	};
}

string_identity! {
	/// Fully-qualified item path such as `core::marker::Copy`.
	///
	/// Identity is plain string equality. Two spellings of the same item through
	/// different re-exports are different paths.
	ItemPath
}

string_identity! {
	/// Package (crate) identity as emitted by the build, e.g. `wasi_common`.
	PackageId
}

const SEP: &str = "::";

impl ItemPath {
	/// Iterates the `::`-separated segments.
	pub fn segments(&self) -> impl Iterator<Item = &str> {
		self.0.split(SEP)
	}

	/// First segment: the crate the path is rooted in.
	pub fn krate(&self) -> &str {
		self.0.split(SEP).next().unwrap_or_default()
	}

	/// Last segment: the item's own name.
	pub fn name(&self) -> &str {
		self.0.rsplit(SEP).next().unwrap_or_default()
	}

	/// Everything before the last segment, or `None` for a single-segment path.
	pub fn parent(&self) -> Option<&str> {
		self.0.rsplit_once(SEP).map(|(parent, _)| parent)
	}
}
