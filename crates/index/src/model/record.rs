use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::ItemPath;
use crate::error::FragmentError;

/// Kind of the implementing item. Only used to pick link targets and CSS classes.
#[derive(
	Debug,
	Clone,
	Copy,
	PartialEq,
	Eq,
	Hash,
	Serialize,
	Deserialize,
	strum::Display,
	strum::EnumString,
	strum::IntoStaticStr,
	strum::VariantArray,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ItemKind {
	Struct,
	Enum,
	Union,
	/// Type alias.
	Type,
	Primitive,
	ForeignType,
}

impl ItemKind {
	/// Lowercase name used in page file names (`struct.Foo.html`) and link classes.
	pub fn as_str(self) -> &'static str {
		self.into()
	}
}

/// One "`implementor` implements `capability`" fact.
///
/// Records are immutable: fields are set through the constructor and the `with_*`
/// consuming builders before the record is handed to a [`super::Fragment`], and
/// are only readable afterwards. Text fields are reference counted so lookups can
/// hand out clones cheaply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplementorRecord {
	capability: ItemPath,
	implementor: ItemPath,
	kind: ItemKind,
	display: Arc<str>,
	#[serde(default)]
	generic: bool,
	#[serde(default)]
	source_ref: Arc<str>,
}

impl ImplementorRecord {
	/// Creates a concrete record whose display label defaults to the implementor's name.
	pub fn new(capability: impl Into<ItemPath>, implementor: impl Into<ItemPath>, kind: ItemKind) -> Self {
		let implementor = implementor.into();
		let display = Arc::from(implementor.name());
		Self {
			capability: capability.into(),
			implementor,
			kind,
			display,
			generic: false,
			source_ref: Arc::default(),
		}
	}

	pub fn with_display(mut self, display: impl Into<Arc<str>>) -> Self {
		self.display = display.into();
		self
	}

	pub fn with_source_ref(mut self, source_ref: impl Into<Arc<str>>) -> Self {
		self.source_ref = source_ref.into();
		self
	}

	pub fn with_generic(mut self, generic: bool) -> Self {
		self.generic = generic;
		self
	}

	pub fn capability(&self) -> &ItemPath {
		&self.capability
	}

	pub fn implementor(&self) -> &ItemPath {
		&self.implementor
	}

	pub fn kind(&self) -> ItemKind {
		self.kind
	}

	/// Pre-rendered label markup. Never recomputed after emission.
	pub fn display(&self) -> &str {
		&self.display
	}

	/// Whether this is a blanket or parameterized implementation.
	pub fn is_generic(&self) -> bool {
		self.generic
	}

	/// Documentation URL of the implementor.
	pub fn source_ref(&self) -> &str {
		&self.source_ref
	}

	pub(crate) fn check(&self, index: usize) -> Result<(), FragmentError> {
		if self.capability.is_empty() {
			return Err(FragmentError::EmptyPath { index, field: "capability" });
		}
		if self.implementor.is_empty() {
			return Err(FragmentError::EmptyPath { index, field: "implementor" });
		}
		Ok(())
	}
}
