//! Transmission units: the payload one independently loaded delivery carries.
//!
//! A unit maps package identities to fragments. Decoding is tolerant per package: a
//! package whose entry is malformed is dropped and reported, its siblings are kept.
//! Only a unit whose outer shape is unusable fails as a whole.

use std::fmt;

use indexmap::IndexMap;
use indexmap::map::IntoIter;
use serde::{Deserialize, Serialize};

use crate::error::{FragmentError, UnitError};
use crate::model::{Fragment, ImplementorRecord, PackageId};

mod script;

pub use script::{SCRIPT_EPILOGUE, SCRIPT_PROLOGUE};


/// Package identity to fragment mapping, in unit order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransmissionUnit {
	fragments: IndexMap<PackageId, Fragment>,
}

impl TransmissionUnit {
	pub fn new() -> Self {
		Self::default()
	}

	/// Convenience for a single-package unit.
	pub fn single(package: impl Into<PackageId>, fragment: Fragment) -> Self {
		let mut unit = Self::new();
		unit.insert(package.into(), fragment);
		unit
	}

	/// Adds or replaces a package's fragment. A replaced package keeps its position.
	pub fn insert(&mut self, package: PackageId, fragment: Fragment) -> Option<Fragment> {
		self.fragments.insert(package, fragment)
	}

	pub fn get(&self, package: &str) -> Option<&Fragment> {
		self.fragments.get(package)
	}

	pub fn remove(&mut self, package: &str) -> Option<Fragment> {
		self.fragments.shift_remove(package)
	}

	pub fn iter(&self) -> indexmap::map::Iter<'_, PackageId, Fragment> {
		self.fragments.iter()
	}

	pub fn packages(&self) -> impl Iterator<Item = &PackageId> {
		self.fragments.keys()
	}

	pub fn len(&self) -> usize {
		self.fragments.len()
	}

	pub fn is_empty(&self) -> bool {
		self.fragments.is_empty()
	}

	/// Orders packages by identity, giving a byte-stable encoding.
	pub fn sort_packages(&mut self) {
		self.fragments.sort_unstable_keys();
	}

	/// Decodes the bare JSON form: `{"package": [record, ...], ...}`.
	pub fn from_json(content: &str) -> Result<UnitReport, UnitError> {
		let raw: IndexMap<String, serde_json::Value> = serde_json::from_str(content)?;
		let mut report = UnitReport::default();
		for (package, value) in raw {
			report.accept(PackageId::from(package), value);
		}
		Ok(report)
	}

	pub fn to_json(&self) -> Result<String, UnitError> {
		Ok(serde_json::to_string(self)?)
	}

	/// Decodes the self-executing script form written by [`TransmissionUnit::to_script`].
	pub fn from_script(content: &str) -> Result<UnitReport, UnitError> {
		script::decode(content)
	}

	pub fn to_script(&self) -> Result<String, UnitError> {
		script::encode(self)
	}
}

impl IntoIterator for TransmissionUnit {
	type Item = (PackageId, Fragment);
	type IntoIter = IntoIter<PackageId, Fragment>;

	fn into_iter(self) -> Self::IntoIter {
		self.fragments.into_iter()
	}
}

impl<'a> IntoIterator for &'a TransmissionUnit {
	type Item = (&'a PackageId, &'a Fragment);
	type IntoIter = indexmap::map::Iter<'a, PackageId, Fragment>;

	fn into_iter(self) -> Self::IntoIter {
		self.fragments.iter()
	}
}

impl FromIterator<(PackageId, Fragment)> for TransmissionUnit {
	fn from_iter<I: IntoIterator<Item = (PackageId, Fragment)>>(iter: I) -> Self {
		Self {
			fragments: iter.into_iter().collect(),
		}
	}
}

/// Why a package entry was dropped from a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
	/// The entry is not a list of well-formed records.
	Decode(String),
	/// The records decoded but break the fragment contract.
	Fragment(FragmentError),
}

impl fmt::Display for RejectReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Decode(msg) => write!(f, "undecodable records: {msg}"),
			Self::Fragment(err) => fmt::Display::fmt(err, f),
		}
	}
}

/// A package entry that was left out of a decoded unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
	pub package: PackageId,
	pub reason: RejectReason,
}

/// Outcome of decoding a unit: the usable part plus what was dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitReport {
	pub unit: TransmissionUnit,
	pub rejected: Vec<Rejection>,
}

impl UnitReport {
	fn accept(&mut self, package: PackageId, value: serde_json::Value) {
		let records = match serde_json::from_value::<Vec<ImplementorRecord>>(value) {
			Ok(records) => records,
			Err(err) => return self.reject(package, RejectReason::Decode(err.to_string())),
		};
		match Fragment::checked(records) {
			Ok(fragment) => {
				self.unit.insert(package, fragment);
			}
			Err(err) => self.reject(package, RejectReason::Fragment(err)),
		}
	}

	fn reject(&mut self, package: PackageId, reason: RejectReason) {
		tracing::warn!(package = %package, reason = %reason, "rejecting malformed fragment");
		self.rejected.push(Rejection { package, reason });
	}

	/// Drops the rejection list, keeping the usable unit.
	pub fn into_unit(self) -> TransmissionUnit {
		self.unit
	}
}

/// Encoding used for units on disk and on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UnitFormat {
	/// Self-executing script that calls the page's registration hook.
	#[default]
	Script,
	/// Bare JSON object.
	Json,
}

impl UnitFormat {
	/// File extension for units in this format.
	pub fn extension(self) -> &'static str {
		match self {
			Self::Script => "js",
			Self::Json => "json",
		}
	}

	pub fn decode(self, content: &str) -> Result<UnitReport, UnitError> {
		match self {
			Self::Script => TransmissionUnit::from_script(content),
			Self::Json => TransmissionUnit::from_json(content),
		}
	}

	pub fn encode(self, unit: &TransmissionUnit) -> Result<String, UnitError> {
		match self {
			Self::Script => unit.to_script(),
			Self::Json => unit.to_json(),
		}
	}
}
