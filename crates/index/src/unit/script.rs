//! Self-executing script form of a transmission unit.
//!
//! ```text
//! (function() {var implementors = {};
//! implementors["pkg_a"] = [{...},{...}];
//! implementors["pkg_b"] = [{...}];
//! if (window.register_implementors) {...} else {...}})()
//! ```
//!
//! Each package occupies exactly one line, so the unit can be decoded (and merged on
//! disk) without evaluating it. Anything besides entries between the prologue and the
//! epilogue, or a missing epilogue, makes the whole unit malformed.
//!
//! The trailer calls the page's registration hook when it is bound and otherwise merges
//! into `window.pending_implementors`, never replacing what earlier units left there.

use super::{RejectReason, TransmissionUnit, UnitReport};
use crate::error::UnitError;
use crate::model::PackageId;

pub const SCRIPT_PROLOGUE: &str = "(function() {var implementors = {};";

pub const SCRIPT_EPILOGUE: &str = "if (window.register_implementors) {window.register_implementors(implementors);} \
	else {window.pending_implementors = Object.assign(window.pending_implementors || {}, implementors);}})()";

const ENTRY_PREFIX: &str = "implementors[";
const ENTRY_ASSIGN: &str = "] = ";

pub(super) fn encode(unit: &TransmissionUnit) -> Result<String, UnitError> {
	let mut out = String::with_capacity(SCRIPT_PROLOGUE.len() + SCRIPT_EPILOGUE.len() + 2);
	out.push_str(SCRIPT_PROLOGUE);
	out.push('\n');
	for (package, fragment) in unit {
		out.push_str(ENTRY_PREFIX);
		out.push_str(&serde_json::to_string(package)?);
		out.push_str(ENTRY_ASSIGN);
		out.push_str(&serde_json::to_string(fragment)?);
		out.push_str(";\n");
	}
	out.push_str(SCRIPT_EPILOGUE);
	Ok(out)
}

pub(super) fn decode(content: &str) -> Result<UnitReport, UnitError> {
	let mut lines = content.lines().enumerate().filter(|(_, line)| !line.trim().is_empty());

	let mut last = match lines.next() {
		Some((idx, first)) if first.trim() == SCRIPT_PROLOGUE => idx + 1,
		Some((idx, _)) => return Err(script_error(idx + 1, "expected unit prologue")),
		None => return Ok(UnitReport::default()),
	};

	let mut report = UnitReport::default();
	let mut closed = false;
	for (idx, line) in lines {
		last = idx + 1;
		let line = line.trim();
		if closed {
			return Err(script_error(last, "content after unit epilogue"));
		}
		if line == SCRIPT_EPILOGUE {
			closed = true;
			continue;
		}
		let rest = line
			.strip_prefix(ENTRY_PREFIX)
			.ok_or_else(|| script_error(last, "unexpected line in unit body"))?;
		let (package, value) = split_entry(rest).ok_or_else(|| script_error(last, "malformed implementors entry"))?;
		// Unparseable records are attributed to the package, not the unit.
		match serde_json::from_str::<serde_json::Value>(value) {
			Ok(value) => report.accept(package, value),
			Err(err) => report.reject(package, RejectReason::Decode(err.to_string())),
		}
	}
	if !closed {
		return Err(script_error(last, "missing unit epilogue"));
	}
	Ok(report)
}

fn script_error(line: usize, reason: &'static str) -> UnitError {
	UnitError::Script { line, reason }
}

/// Splits `"pkg"] = [...];` into the package identity and the raw record list.
fn split_entry(rest: &str) -> Option<(PackageId, &str)> {
	let mut keys = serde_json::Deserializer::from_str(rest).into_iter::<String>();
	let package = keys.next()?.ok()?;
	let after_key = &rest[keys.byte_offset()..];
	let value = after_key.strip_prefix(ENTRY_ASSIGN)?.strip_suffix(';')?;
	Some((PackageId::from(package), value))
}
