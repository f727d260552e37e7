use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use super::{ImplementorRecord, ItemPath};
use crate::error::FragmentError;

/// One package's complete implementor list, in build emission order.
///
/// A fragment is total for its package and is never merged with another fragment
/// for the same package; a newer one replaces it wholesale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fragment {
	records: Arc<[ImplementorRecord]>,
}

impl Fragment {
	/// Wraps records as-is. The producer contract (no empty paths, no repeated
	/// capability/implementor pairs) is assumed, not checked.
	pub fn new(records: Vec<ImplementorRecord>) -> Self {
		Self { records: records.into() }
	}

	/// Wraps records after verifying the producer contract.
	pub fn checked(records: Vec<ImplementorRecord>) -> Result<Self, FragmentError> {
		let mut seen: FxHashSet<(&ItemPath, &ItemPath)> = FxHashSet::default();
		for (index, record) in records.iter().enumerate() {
			record.check(index)?;
			if !seen.insert((record.capability(), record.implementor())) {
				return Err(FragmentError::DuplicatePair {
					capability: record.capability().clone(),
					implementor: record.implementor().clone(),
				});
			}
		}
		Ok(Self::new(records))
	}

	pub fn records(&self) -> &[ImplementorRecord] {
		&self.records
	}

	pub fn iter(&self) -> std::slice::Iter<'_, ImplementorRecord> {
		self.records.iter()
	}

	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Records implementing `capability`, in emission order.
	pub fn for_capability<'a>(&'a self, capability: &'a str) -> impl Iterator<Item = &'a ImplementorRecord> + 'a {
		self.records.iter().filter(move |r| r.capability().as_str() == capability)
	}

	/// Distinct capabilities in first-seen order.
	pub fn capabilities(&self) -> Vec<&ItemPath> {
		let mut seen = FxHashSet::default();
		self.records
			.iter()
			.map(ImplementorRecord::capability)
			.filter(|cap| seen.insert(*cap))
			.collect()
	}
}

impl FromIterator<ImplementorRecord> for Fragment {
	fn from_iter<I: IntoIterator<Item = ImplementorRecord>>(iter: I) -> Self {
		Self::new(iter.into_iter().collect())
	}
}

impl<'a> IntoIterator for &'a Fragment {
	type Item = &'a ImplementorRecord;
	type IntoIter = std::slice::Iter<'a, ImplementorRecord>;

	fn into_iter(self) -> Self::IntoIter {
		self.records.iter()
	}
}
