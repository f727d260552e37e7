//! Page registry with atomic snapshot publication.
//!
//! # Purpose
//!
//! Merge fragments from any number of packages and answer capability queries while
//! further fragments may still be arriving.
//!
//! # Mental model
//!
//! * Readers load an `Arc<Snapshot>` and run the lookup against that immutable view.
//! * Writers serialize on one mutex, build a replacement snapshot from the current one,
//!   and publish it with a single store.
//! * A lookup therefore observes exactly the ingests that finished before it started.
//!
//! # Invariants
//!
//! * Ingestion is keyed by package identity; a repeat ingest replaces the fragment
//!   wholesale and moves the package to the end of the ingestion order.
//! * Lookup order is ingestion order across fragments, emission order within one.
//! * [`LookupStrategy::Scan`] and [`LookupStrategy::Indexed`] return identical results.
//!
//! # Concurrency
//!
//! * Reads: wait-free (`ArcSwap` load).
//! * Writes: serialized by a `parking_lot::Mutex`; delivery and drain go through the
//!   same path, so they share its atomicity.

use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::Mutex;

use crate::config::{LookupStrategy, RegistryConfig};
use crate::model::{Fragment, ImplementorRecord, PackageId};
use crate::unit::TransmissionUnit;

mod snapshot;

pub use snapshot::Snapshot;


/// Aggregation point for every fragment delivered to one page.
pub struct Registry {
	label: Arc<str>,
	strategy: LookupStrategy,
	snap: ArcSwap<Snapshot>,
	write: Mutex<()>,
}

impl std::fmt::Debug for Registry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let snap = self.snap.load();
		f.debug_struct("Registry")
			.field("label", &self.label)
			.field("strategy", &self.strategy)
			.field("packages", &snap.len())
			.field("records", &snap.record_count())
			.finish()
	}
}

impl Default for Registry {
	fn default() -> Self {
		Self::new(&RegistryConfig::default())
	}
}

impl Registry {
	pub fn new(config: &RegistryConfig) -> Self {
		Self {
			label: Arc::from(config.label.as_str()),
			strategy: config.lookup,
			snap: ArcSwap::from_pointee(Snapshot::default()),
			write: Mutex::new(()),
		}
	}

	/// Installs or replaces the fragment for `package`.
	pub fn ingest(&self, package: PackageId, fragment: Fragment) {
		self.ingest_all(std::iter::once((package, fragment)));
	}

	/// The registration hook: ingests every package of a unit, in unit order.
	pub fn register_implementors(&self, unit: TransmissionUnit) {
		self.ingest_all(unit);
	}

	/// Ingests a batch in iteration order and publishes one snapshot for all of it.
	pub fn ingest_all(&self, batch: impl IntoIterator<Item = (PackageId, Fragment)>) {
		let _guard = self.write.lock();
		let current = self.snap.load_full();

		let mut fragments = current.fragments().clone();
		let mut ingested = 0usize;
		for (package, fragment) in batch {
			let replaced = fragments.shift_remove(&package).is_some();
			tracing::debug!(
				registry = %self.label,
				package = %package,
				records = fragment.len(),
				replaced,
				"ingesting fragment"
			);
			fragments.insert(package, fragment);
			ingested += 1;
		}
		if ingested == 0 {
			return;
		}

		self.snap.store(Arc::new(Snapshot::build(fragments, self.strategy)));
	}

	/// Every record implementing `capability`, in fragment ingestion order and then
	/// emission order. Empty when nothing implements it.
	pub fn lookup(&self, capability: &str) -> Vec<ImplementorRecord> {
		self.snap.load().lookup(capability)
	}

	/// Like [`Registry::lookup`], pairing each record with the package that emitted it.
	pub fn lookup_by_package(&self, capability: &str) -> Vec<(PackageId, ImplementorRecord)> {
		self.snap.load().lookup_by_package(capability)
	}

	/// Pins the current state for several consistent reads.
	pub fn snapshot(&self) -> Arc<Snapshot> {
		self.snap.load_full()
	}

	pub fn fragment(&self, package: &str) -> Option<Fragment> {
		self.snap.load().fragment(package).cloned()
	}

	/// Package identities in ingestion order.
	pub fn packages(&self) -> Vec<PackageId> {
		self.snap.load().packages().cloned().collect()
	}

	/// Number of ingested fragments.
	pub fn len(&self) -> usize {
		self.snap.load().len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	pub fn strategy(&self) -> LookupStrategy {
		self.strategy
	}
}
