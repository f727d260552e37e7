//! Fragment assembly from analyzer facts.

use implindex::{Fragment, ImplementorRecord, ItemKind, ItemPath, PackageId};
use rustc_hash::FxHashSet;

use crate::links::DocLinks;
use crate::render;

/// One "implementor implements capability" fact as reported by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImplFact {
	pub capability: ItemPath,
	/// Canonical path, including private modules. This is the record's identity.
	pub implementor: ItemPath,
	/// Path the implementor is documented under when re-exported elsewhere.
	pub public: Option<ItemPath>,
	pub kind: ItemKind,
	/// Impl generics as written, e.g. `<T: Clone>`. Present for parameterized impls.
	pub generics: Option<String>,
	/// Arguments applied to the implementor, e.g. `<T>`.
	pub type_args: Option<String>,
}

impl ImplFact {
	pub fn new(capability: impl Into<ItemPath>, implementor: impl Into<ItemPath>, kind: ItemKind) -> Self {
		Self {
			capability: capability.into(),
			implementor: implementor.into(),
			public: None,
			kind,
			generics: None,
			type_args: None,
		}
	}

	pub fn reexported_as(mut self, public: impl Into<ItemPath>) -> Self {
		self.public = Some(public.into());
		self
	}

	pub fn generics(mut self, generics: impl Into<String>) -> Self {
		self.generics = Some(generics.into());
		self
	}

	pub fn type_args(mut self, type_args: impl Into<String>) -> Self {
		self.type_args = Some(type_args.into());
		self
	}

	/// Path used for links and titles.
	pub fn public_path(&self) -> &ItemPath {
		self.public.as_ref().unwrap_or(&self.implementor)
	}

	pub fn is_generic(&self) -> bool {
		self.generics.is_some()
	}
}

/// Collects one package's facts into a [`Fragment`], in push order.
pub struct FragmentBuilder<'a> {
	package: PackageId,
	links: &'a DocLinks,
	seen: FxHashSet<(ItemPath, ItemPath)>,
	records: Vec<ImplementorRecord>,
}

impl<'a> FragmentBuilder<'a> {
	pub fn new(package: impl Into<PackageId>, links: &'a DocLinks) -> Self {
		Self {
			package: package.into(),
			links,
			seen: FxHashSet::default(),
			records: Vec::new(),
		}
	}

	/// Renders and appends a fact. Returns `false` and skips it when the same
	/// capability/implementor pair was already pushed.
	pub fn push(&mut self, fact: ImplFact) -> bool {
		if !self.seen.insert((fact.capability.clone(), fact.implementor.clone())) {
			tracing::warn!(
				package = %self.package,
				capability = %fact.capability,
				implementor = %fact.implementor,
				"skipping duplicate implementor"
			);
			return false;
		}

		let display = render::impl_label(self.links, &fact);
		let source_ref = self.links.type_href(fact.public_path(), fact.kind);
		let generic = fact.is_generic();
		self.records.push(
			ImplementorRecord::new(fact.capability, fact.implementor, fact.kind)
				.with_display(display)
				.with_source_ref(source_ref)
				.with_generic(generic),
		);
		true
	}

	pub fn extend(&mut self, facts: impl IntoIterator<Item = ImplFact>) {
		for fact in facts {
			self.push(fact);
		}
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	pub fn finish(self) -> (PackageId, Fragment) {
		tracing::debug!(package = %self.package, records = self.records.len(), "fragment built");
		(self.package, Fragment::new(self.records))
	}
}
