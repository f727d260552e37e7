//! On-disk unit files.
//!
//! # Role
//!
//! One unit file exists per capability (`implementors/<module path>/trait.<Name>.<ext>`)
//! and holds an entry for every package that implements it. Writing a package's fragment
//! rewrites only that package's entries: other packages' entries are kept, entries for
//! capabilities the package no longer implements are dropped, and files left without
//! entries are deleted.
//!
//! # Invariants
//!
//! - Packages are written sorted by identity, so rebuilding with unchanged input
//!   produces byte-identical files.
//! - Files whose encoded content would not change are not rewritten.
//! - Another package's entry is never dropped: a shared file holding an entry that does
//!   not decode fails the write with [`EmitError::ForeignEntry`] and is left untouched.

use std::fs;
use std::path::{Path, PathBuf};

use implindex::{Fragment, PackageId, TransmissionUnit, UnitFormat, UnitReport};
use rustc_hash::FxHashSet;

use crate::config::EmitConfig;
use crate::error::EmitError;
use crate::links::{self, IMPLEMENTORS_DIR};

/// Counts of file operations performed by one [`UnitWriter::write`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteReport {
	pub written: usize,
	pub unchanged: usize,
	pub removed: usize,
}

/// Writes fragments into the unit files under a documentation root.
#[derive(Debug, Clone)]
pub struct UnitWriter {
	root: PathBuf,
	format: UnitFormat,
}

impl UnitWriter {
	pub fn new(root: impl Into<PathBuf>, format: UnitFormat) -> Self {
		Self {
			root: root.into(),
			format,
		}
	}

	pub fn from_config(config: &EmitConfig) -> Self {
		Self::new(config.out_dir.clone(), config.format)
	}

	/// Replaces everything `package` previously contributed with `fragment`.
	pub fn write(&self, package: &PackageId, fragment: &Fragment) -> Result<WriteReport, EmitError> {
		let mut report = WriteReport::default();
		let mut touched = FxHashSet::default();

		for capability in fragment.capabilities() {
			let path = self.root.join(links::unit_path(capability, self.format));
			let records: Fragment = fragment.for_capability(capability.as_str()).cloned().collect();

			let mut unit = claim(&path, self.decode_file(&path)?, package)?;
			unit.remove(package.as_str());
			unit.insert(package.clone(), records);
			self.store(&path, unit, &mut report)?;
			touched.insert(path);
		}

		for path in self.unit_files()? {
			if touched.contains(&path) {
				continue;
			}
			let existing = self.decode_file(&path)?;
			let owned = existing.unit.get(package.as_str()).is_some()
				|| existing.rejected.iter().any(|rejection| rejection.package == *package);
			if !owned {
				continue;
			}
			let mut unit = claim(&path, existing, package)?;
			unit.remove(package.as_str());
			if unit.is_empty() {
				fs::remove_file(&path).map_err(EmitError::io(&path))?;
				tracing::debug!(path = %path.display(), "removed empty unit");
				report.removed += 1;
			} else {
				self.store(&path, unit, &mut report)?;
			}
		}

		tracing::debug!(
			package = %package,
			written = report.written,
			unchanged = report.unchanged,
			removed = report.removed,
			"unit files updated"
		);
		Ok(report)
	}

	/// Reads a unit file, treating a missing file as an empty unit. Entries that do not
	/// decode are left out.
	pub fn read(&self, path: &Path) -> Result<TransmissionUnit, EmitError> {
		Ok(self.decode_file(path)?.into_unit())
	}

	fn decode_file(&self, path: &Path) -> Result<UnitReport, EmitError> {
		let content = match fs::read_to_string(path) {
			Ok(content) => content,
			Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(UnitReport::default()),
			Err(err) => return Err(EmitError::io(path)(err)),
		};
		self.format.decode(&content).map_err(|source| EmitError::Unit {
			path: path.to_path_buf(),
			source,
		})
	}

	fn store(&self, path: &Path, mut unit: TransmissionUnit, report: &mut WriteReport) -> Result<(), EmitError> {
		unit.sort_packages();
		let encoded = self.format.encode(&unit)?;
		if fs::read_to_string(path).is_ok_and(|existing| existing == encoded) {
			report.unchanged += 1;
			return Ok(());
		}
		if let Some(dir) = path.parent() {
			fs::create_dir_all(dir).map_err(EmitError::io(dir))?;
		}
		fs::write(path, encoded).map_err(EmitError::io(path))?;
		report.written += 1;
		Ok(())
	}

	/// Every unit file of this writer's format currently on disk.
	pub fn unit_files(&self) -> Result<Vec<PathBuf>, EmitError> {
		let mut files = Vec::new();
		let dir = self.root.join(IMPLEMENTORS_DIR);
		if dir.is_dir() {
			collect_units(&dir, self.format.extension(), &mut files)?;
		}
		files.sort();
		Ok(files)
	}

	pub fn root(&self) -> &Path {
		&self.root
	}
}

/// Takes a decoded unit that is about to be rewritten on behalf of `owner`. Only the
/// owner's own entry may have failed to decode, since it is replaced anyway.
fn claim(path: &Path, mut report: UnitReport, owner: &PackageId) -> Result<TransmissionUnit, EmitError> {
	if let Some(idx) = report.rejected.iter().position(|rejection| rejection.package != *owner) {
		let rejection = report.rejected.swap_remove(idx);
		return Err(EmitError::ForeignEntry {
			path: path.to_path_buf(),
			package: rejection.package,
			reason: rejection.reason,
		});
	}
	Ok(report.into_unit())
}

fn collect_units(dir: &Path, extension: &str, out: &mut Vec<PathBuf>) -> Result<(), EmitError> {
	for entry in fs::read_dir(dir).map_err(EmitError::io(dir))? {
		let path = entry.map_err(EmitError::io(dir))?.path();
		if path.is_dir() {
			collect_units(&path, extension, out)?;
		} else if path.extension().is_some_and(|ext| ext == extension) {
			out.push(path);
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests;
