//! Immutable published registry state.
//!
//! # Role
//!
//! Pure view over ingested fragments. Contains no mutation logic; the registry builds a
//! fresh snapshot per write and publishes it atomically.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::config::LookupStrategy;
use crate::model::{Fragment, ImplementorRecord, ItemPath, PackageId};

/// Position of one record: fragment index in ingestion order, then record index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Slot {
	fragment: u32,
	record: u32,
}

/// Single source of truth for lookups at one point in time.
#[derive(Debug, Default)]
pub struct Snapshot {
	/// Fragments in ingestion order.
	fragments: IndexMap<PackageId, Fragment>,
	/// Capability index, present only under [`LookupStrategy::Indexed`].
	by_capability: Option<FxHashMap<ItemPath, Arc<[Slot]>>>,
}

impl Snapshot {
	pub(super) fn build(fragments: IndexMap<PackageId, Fragment>, strategy: LookupStrategy) -> Self {
		let by_capability = match strategy {
			LookupStrategy::Scan => None,
			LookupStrategy::Indexed => Some(index_capabilities(&fragments)),
		};
		Self { fragments, by_capability }
	}

	pub(super) fn fragments(&self) -> &IndexMap<PackageId, Fragment> {
		&self.fragments
	}

	/// Every record implementing `capability`, fragment ingestion order first.
	pub fn lookup(&self, capability: &str) -> Vec<ImplementorRecord> {
		self.matches(capability).map(|(_, record)| record.clone()).collect()
	}

	/// Like [`Snapshot::lookup`], pairing each record with its package.
	pub fn lookup_by_package(&self, capability: &str) -> Vec<(PackageId, ImplementorRecord)> {
		self.matches(capability)
			.map(|(package, record)| (package.clone(), record.clone()))
			.collect()
	}

	fn matches<'a>(&'a self, capability: &'a str) -> Box<dyn Iterator<Item = (&'a PackageId, &'a ImplementorRecord)> + 'a> {
		match &self.by_capability {
			Some(index) => {
				let slots = index.get(capability).map(|slots| &slots[..]).unwrap_or_default();
				Box::new(slots.iter().filter_map(move |slot| {
					let (package, fragment) = self.fragments.get_index(slot.fragment as usize)?;
					Some((package, fragment.records().get(slot.record as usize)?))
				}))
			}
			None => Box::new(
				self.fragments
					.iter()
					.flat_map(move |(package, fragment)| fragment.for_capability(capability).map(move |record| (package, record))),
			),
		}
	}

	pub fn fragment(&self, package: &str) -> Option<&Fragment> {
		self.fragments.get(package)
	}

	/// Package identities in ingestion order.
	pub fn packages(&self) -> impl Iterator<Item = &PackageId> {
		self.fragments.keys()
	}

	/// Number of ingested fragments.
	pub fn len(&self) -> usize {
		self.fragments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fragments.is_empty()
	}

	/// Total records across all fragments.
	pub fn record_count(&self) -> usize {
		self.fragments.values().map(Fragment::len).sum()
	}
}

fn index_capabilities(fragments: &IndexMap<PackageId, Fragment>) -> FxHashMap<ItemPath, Arc<[Slot]>> {
	let mut index: FxHashMap<ItemPath, Vec<Slot>> = FxHashMap::default();
	for (fragment_idx, fragment) in fragments.values().enumerate() {
		for (record_idx, record) in fragment.iter().enumerate() {
			index.entry(record.capability().clone()).or_default().push(Slot {
				fragment: u32_index(fragment_idx),
				record: u32_index(record_idx),
			});
		}
	}
	index.into_iter().map(|(cap, slots)| (cap, Arc::from(slots))).collect()
}

fn u32_index(idx: usize) -> u32 {
	u32::try_from(idx).unwrap_or_else(|_| panic!("implementor index position {idx} exceeds u32"))
}
