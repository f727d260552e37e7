use implindex::{ImplementorRecord, ItemKind};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use super::*;

fn record(capability: &str, implementor: &str) -> ImplementorRecord {
	ImplementorRecord::new(capability, implementor, ItemKind::Struct)
}

fn fragment(records: &[(&str, &str)]) -> Fragment {
	records.iter().map(|(cap, imp)| record(cap, imp)).collect()
}

fn copy_path(dir: &TempDir, format: UnitFormat) -> PathBuf {
	dir.path().join(links::unit_path(&"core::marker::Copy".into(), format))
}

#[test]
fn test_packages_merge_sorted() {
	let dir = TempDir::new().unwrap();
	let writer = UnitWriter::new(dir.path(), UnitFormat::Json);

	writer
		.write(&"zeta".into(), &fragment(&[("core::marker::Copy", "zeta::Z")]))
		.unwrap();
	writer
		.write(&"alpha".into(), &fragment(&[("core::marker::Copy", "alpha::A")]))
		.unwrap();

	let unit = writer.read(&copy_path(&dir, UnitFormat::Json)).unwrap();
	let packages: Vec<&str> = unit.packages().map(PackageId::as_str).collect();
	assert_eq!(packages, ["alpha", "zeta"]);
}

#[test]
fn test_rebuild_leaves_files_unchanged() {
	let dir = TempDir::new().unwrap();
	let writer = UnitWriter::new(dir.path(), UnitFormat::Script);
	let fragment = fragment(&[("core::marker::Copy", "pkg::A"), ("core::clone::Clone", "pkg::A")]);

	let first = writer.write(&"pkg".into(), &fragment).unwrap();
	assert_eq!(first, WriteReport { written: 2, unchanged: 0, removed: 0 });
	let before = fs::read_to_string(copy_path(&dir, UnitFormat::Script)).unwrap();

	let second = writer.write(&"pkg".into(), &fragment).unwrap();
	assert_eq!(second, WriteReport { written: 0, unchanged: 2, removed: 0 });
	assert_eq!(fs::read_to_string(copy_path(&dir, UnitFormat::Script)).unwrap(), before);
}

#[test]
fn test_dropped_capability_is_cleaned_up() {
	let dir = TempDir::new().unwrap();
	let writer = UnitWriter::new(dir.path(), UnitFormat::Json);

	writer
		.write(
			&"pkg".into(),
			&fragment(&[("core::marker::Copy", "pkg::A"), ("core::clone::Clone", "pkg::A")]),
		)
		.unwrap();
	writer
		.write(&"other".into(), &fragment(&[("core::clone::Clone", "other::B")]))
		.unwrap();

	let report = writer
		.write(&"pkg".into(), &fragment(&[("core::clone::Clone", "pkg::A")]))
		.unwrap();
	assert_eq!(report.removed, 1);
	assert!(!copy_path(&dir, UnitFormat::Json).exists());

	let report = writer.write(&"pkg".into(), &Fragment::default()).unwrap();
	assert_eq!(report, WriteReport { written: 1, unchanged: 0, removed: 0 });
	let clone = dir.path().join(links::unit_path(&"core::clone::Clone".into(), UnitFormat::Json));
	let unit = writer.read(&clone).unwrap();
	let packages: Vec<&str> = unit.packages().map(PackageId::as_str).collect();
	assert_eq!(packages, ["other"]);
}

#[test]
fn test_written_script_decodes() {
	let dir = TempDir::new().unwrap();
	let writer = UnitWriter::new(dir.path(), UnitFormat::Script);
	let fragment = fragment(&[("core::marker::Copy", "pkg::A"), ("core::marker::Copy", "pkg::B")]);
	writer.write(&"pkg".into(), &fragment).unwrap();

	let content = fs::read_to_string(copy_path(&dir, UnitFormat::Script)).unwrap();
	let report = TransmissionUnit::from_script(&content).unwrap();
	assert!(report.rejected.is_empty());
	assert_eq!(report.unit.get("pkg"), Some(&fragment));
}

#[test]
fn test_corrupt_unit_file_is_an_error() {
	let dir = TempDir::new().unwrap();
	let writer = UnitWriter::new(dir.path(), UnitFormat::Json);
	let path = copy_path(&dir, UnitFormat::Json);
	fs::create_dir_all(path.parent().unwrap()).unwrap();
	fs::write(&path, "[1, 2]").unwrap();

	let err = writer
		.write(&"pkg".into(), &fragment(&[("core::marker::Copy", "pkg::A")]))
		.unwrap_err();
	assert!(matches!(err, EmitError::Unit { .. }));
}

const LEGACY_ENTRY: &str = r#"[{"text":"impl Copy for B","synthetic":false,"types":["other::B"]}]"#;

fn seed(path: &Path, content: &str) {
	fs::create_dir_all(path.parent().unwrap()).unwrap();
	fs::write(path, content).unwrap();
}

#[test]
fn test_undecodable_foreign_entry_blocks_write() {
	let dir = TempDir::new().unwrap();
	let writer = UnitWriter::new(dir.path(), UnitFormat::Json);
	let path = copy_path(&dir, UnitFormat::Json);
	let seeded = format!("{{\"other\":{LEGACY_ENTRY}}}");
	seed(&path, &seeded);

	let err = writer
		.write(&"pkg".into(), &fragment(&[("core::marker::Copy", "pkg::A")]))
		.unwrap_err();
	match err {
		EmitError::ForeignEntry { path: failed, package, .. } => {
			assert_eq!(failed, path);
			assert_eq!(package.as_str(), "other");
		}
		other => panic!("unexpected error: {other}"),
	}
	assert_eq!(fs::read_to_string(&path).unwrap(), seeded);
}

#[test]
fn test_undecodable_foreign_entry_blocks_stale_cleanup() {
	let dir = TempDir::new().unwrap();
	let writer = UnitWriter::new(dir.path(), UnitFormat::Json);
	writer
		.write(&"pkg".into(), &fragment(&[("core::marker::Copy", "pkg::A")]))
		.unwrap();

	let path = copy_path(&dir, UnitFormat::Json);
	let mut content = fs::read_to_string(&path).unwrap();
	content.pop();
	content.push_str(&format!(",\"other\":{LEGACY_ENTRY}}}"));
	fs::write(&path, &content).unwrap();

	let err = writer.write(&"pkg".into(), &Fragment::default()).unwrap_err();
	assert!(matches!(err, EmitError::ForeignEntry { .. }));
	assert_eq!(fs::read_to_string(&path).unwrap(), content);
}

#[test]
fn test_own_undecodable_entry_is_replaced() {
	let dir = TempDir::new().unwrap();
	let writer = UnitWriter::new(dir.path(), UnitFormat::Json);
	let path = copy_path(&dir, UnitFormat::Json);
	seed(&path, &format!("{{\"pkg\":{LEGACY_ENTRY}}}"));

	let fresh = fragment(&[("core::marker::Copy", "pkg::A")]);
	writer.write(&"pkg".into(), &fresh).unwrap();

	let report = TransmissionUnit::from_json(&fs::read_to_string(&path).unwrap()).unwrap();
	assert!(report.rejected.is_empty());
	assert_eq!(report.unit.get("pkg"), Some(&fresh));
}

#[test]
fn test_other_format_files_are_ignored() {
	let dir = TempDir::new().unwrap();
	let json = UnitWriter::new(dir.path(), UnitFormat::Json);
	let script = UnitWriter::new(dir.path(), UnitFormat::Script);
	let fragment = fragment(&[("core::marker::Copy", "pkg::A")]);

	json.write(&"pkg".into(), &fragment).unwrap();
	script.write(&"pkg".into(), &Fragment::default()).unwrap();

	assert_eq!(json.unit_files().unwrap(), [copy_path(&dir, UnitFormat::Json)]);
	assert!(script.unit_files().unwrap().is_empty());
}
