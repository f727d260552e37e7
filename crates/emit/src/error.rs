use std::path::PathBuf;

use implindex::{PackageId, RejectReason, UnitError};

/// Emission failures.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
	#[error("I/O error on {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("existing unit {path} is unreadable: {source}")]
	Unit {
		path: PathBuf,
		#[source]
		source: UnitError,
	},

	/// Another package's entry in a shared unit file does not decode. Rewriting the file
	/// would drop it, so the write is refused.
	#[error("existing unit {path} has an undecodable entry for {package}: {reason}")]
	ForeignEntry {
		path: PathBuf,
		package: PackageId,
		reason: RejectReason,
	},

	#[error("failed to encode unit: {0}")]
	Encode(#[from] UnitError),

	#[error("invalid emit config: {0}")]
	Config(#[from] toml::de::Error),
}

impl EmitError {
	pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
		let path = path.into();
		move |source| Self::Io { path, source }
	}
}
